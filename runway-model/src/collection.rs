//! Observable ordered sequences.
//!
//! Every mutator applies its change to the sequence first, then triggers
//! its events synchronously:
//!
//! | Operation                  | Events (per element)        |
//! |----------------------------|-----------------------------|
//! | `push` `add` `unshift`     | `add`, `change`             |
//! | `pop` `shift` `remove`     | `remove`, `change`          |
//! | `splice`                   | removals first, then adds   |
//! | `sort` `sort_by` `reverse` | `sort`, `change` (no args)  |
//!
//! `add`/`remove` events carry the affected element as their only argument.
//! Entity and collection elements are bridged while they occupy a slot: their
//! `change` and `sub:change` events re-trigger `sub:change` here. An element
//! that leaves the collection also receives `removed` with the collection as
//! argument, after the collection's own events.

use crate::bridge;
use crate::def::{CollectionDef, ElementType};
use crate::error::ModelResult;
use crate::snapshot::Snapshot;
use crate::value::Value;
use runway_events::{EventBus, Handler, Observable, Subscription};
use serde::{Serialize, Serializer};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::rc::{Rc, Weak};
use tracing::{debug, warn};

const ADDED: &str = "add change";
const REMOVED: &str = "remove change";
const SORTED: &str = "sort change";
const DETACHED: &str = "removed";

struct Slot {
    value: Value,
    wiring: Option<Subscription>,
}

pub(crate) struct CollectionInner {
    def: Option<CollectionDef>,
    element: Option<ElementType>,
    bus: EventBus<Collection, Value>,
    items: RefCell<Vec<Slot>>,
}

/// An ordered sequence of values with its own event bus.
///
/// `Collection` is a handle: cloning shares the sequence, equality is
/// identity. With an element type configured, every inserted value that is
/// not already an instance of it is converted by constructing one.
#[derive(Clone)]
pub struct Collection {
    inner: Rc<CollectionInner>,
}

#[derive(Clone)]
pub(crate) struct WeakCollection(Weak<CollectionInner>);

impl WeakCollection {
    pub(crate) fn upgrade(&self) -> Option<Collection> {
        self.0.upgrade().map(|inner| Collection { inner })
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl Collection {
    /// Creates an empty, untyped collection.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None, None)
    }

    /// Creates an empty collection converting its elements to `element`.
    #[must_use]
    pub fn of(element: ElementType) -> Self {
        Self::build(None, Some(element))
    }

    /// Creates an untyped collection and pushes `values` in order.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        let collection = Self::new();
        for value in values {
            collection.push(value);
        }
        collection
    }

    pub(crate) fn with_def(def: CollectionDef) -> Self {
        let element = def.element().cloned();
        Self::build(Some(def), element)
    }

    fn build(def: Option<CollectionDef>, element: Option<ElementType>) -> Self {
        Self {
            inner: Rc::new(CollectionInner {
                def,
                element,
                bus: EventBus::new(),
                items: RefCell::new(Vec::new()),
            }),
        }
    }

    // ── Insertion ────────────────────────────────────────────────

    /// Appends a value and returns the stored (possibly converted) element.
    pub fn push(&self, value: impl Into<Value>) -> Value {
        let value = self.coerce(value.into());
        self.insert_at(self.len(), &value);
        value
    }

    /// Same as [`push`](Self::push).
    pub fn add(&self, value: impl Into<Value>) -> Value {
        self.push(value)
    }

    /// Appends a default-constructed element (null when untyped).
    pub fn add_default(&self) -> Value {
        let value = match &self.inner.element {
            Some(element) => element.construct(&[]),
            None => Value::NULL,
        };
        self.insert_at(self.len(), &value);
        value
    }

    /// Prepends a value and returns the stored (possibly converted) element.
    pub fn unshift(&self, value: impl Into<Value>) -> Value {
        let value = self.coerce(value.into());
        self.insert_at(0, &value);
        value
    }

    // ── Removal ──────────────────────────────────────────────────

    /// Removes and returns the last element.
    pub fn pop(&self) -> Option<Value> {
        let last = self.len().checked_sub(1)?;
        self.take_at(last)
    }

    /// Removes and returns the first element.
    pub fn shift(&self) -> Option<Value> {
        self.take_at(0)
    }

    /// Removes every occurrence of `value` (by identity).
    ///
    /// Triggers `remove` and `change` once per occurrence. Returns the
    /// number of removed occurrences.
    pub fn remove(&self, value: &Value) -> usize {
        let mut removed = 0;
        while let Some(index) = self.index_of(value) {
            let slot = self.inner.items.borrow_mut().remove(index);
            self.release(slot);
            removed += 1;
        }
        if removed > 0 {
            self.notify_detached(value);
        }
        removed
    }

    /// Removes `delete_count` elements at `start` and inserts `items` there.
    ///
    /// `start` and `delete_count` are clamped to the sequence. The whole
    /// splice is applied before any event fires; `remove`/`change` pairs for
    /// the removed elements precede `add`/`change` pairs for the inserted
    /// ones. Returns the removed elements.
    pub fn splice(
        &self,
        start: usize,
        delete_count: usize,
        items: impl IntoIterator<Item = Value>,
    ) -> Vec<Value> {
        let inserted: Vec<Value> = items.into_iter().map(|v| self.coerce(v)).collect();
        let fresh: Vec<Slot> = inserted.iter().map(|v| self.slot(v.clone())).collect();

        let removed: Vec<Slot> = {
            let mut slots = self.inner.items.borrow_mut();
            let start = start.min(slots.len());
            let end = start + delete_count.min(slots.len() - start);
            slots.splice(start..end, fresh).collect()
        };

        let mut out = Vec::with_capacity(removed.len());
        for slot in removed {
            out.push(self.release(slot));
        }
        for value in &out {
            self.notify_detached(value);
        }
        for value in &inserted {
            self.trigger(ADDED, std::slice::from_ref(value));
        }
        out
    }

    // ── Reordering ───────────────────────────────────────────────

    /// Sorts the elements by their text form, then triggers `sort` and
    /// `change`.
    ///
    /// Strings compare as-is; every other value compares as compact JSON,
    /// so `10` orders before `9`. Use [`sort_by`](Self::sort_by) for any
    /// other order.
    pub fn sort(&self) {
        self.sort_by_key(text_form);
    }

    /// Sorts the elements with `compare` (stable), then triggers `sort` and
    /// `change`.
    ///
    /// The comparator sees a snapshot of the elements and may read the
    /// collection; the new order is applied after it has run.
    pub fn sort_by(&self, mut compare: impl FnMut(&Value, &Value) -> Ordering) {
        let values = self.to_array();
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|&a, &b| compare(&values[a], &values[b]));
        {
            let mut items = self.inner.items.borrow_mut();
            if items.len() != order.len() {
                warn!("collection resized by its comparator; sort discarded");
                return;
            }
            let mut taken: Vec<Option<Slot>> = items.drain(..).map(Some).collect();
            items.extend(order.iter().filter_map(|&idx| taken[idx].take()));
        }
        self.trigger(SORTED, &[]);
    }

    /// Sorts the elements by a key, then triggers `sort` and `change`.
    pub fn sort_by_key<K: Ord>(&self, mut key: impl FnMut(&Value) -> K) {
        self.sort_by(|a, b| key(a).cmp(&key(b)));
    }

    /// Reverses the elements, then triggers `sort` and `change`.
    pub fn reverse(&self) {
        self.inner.items.borrow_mut().reverse();
        self.trigger(SORTED, &[]);
    }

    // ── Observation ──────────────────────────────────────────────

    /// Calls `callback` for every current element, then for every element
    /// added later. Returns the `add` handler so it can be removed.
    pub fn each_and_added(
        &self,
        callback: impl Fn(&Collection, &Value) + 'static,
    ) -> Handler<Collection, Value> {
        for value in self.to_array() {
            callback(self, &value);
        }
        self.listen("add", move |this, args| {
            if let Some(value) = args.first() {
                callback(this, value);
            }
        })
    }

    // ── Access ───────────────────────────────────────────────────

    /// The elements in order.
    #[must_use]
    pub fn to_array(&self) -> Vec<Value> {
        self.inner
            .items
            .borrow()
            .iter()
            .map(|slot| slot.value.clone())
            .collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.items.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        self.inner
            .items
            .borrow()
            .get(index)
            .map(|slot| slot.value.clone())
    }

    /// Position of the first element identical to `value`.
    #[must_use]
    pub fn index_of(&self, value: &Value) -> Option<usize> {
        self.inner
            .items
            .borrow()
            .iter()
            .position(|slot| slot.value.same(value))
    }

    #[must_use]
    pub fn contains(&self, value: &Value) -> bool {
        self.index_of(value).is_some()
    }

    /// The configured element type.
    #[must_use]
    pub fn element(&self) -> Option<&ElementType> {
        self.inner.element.as_ref()
    }

    /// The definition this collection was constructed from.
    #[must_use]
    pub fn def(&self) -> Option<&CollectionDef> {
        self.inner.def.as_ref()
    }

    /// Returns true if this collection was constructed from `def`.
    #[must_use]
    pub fn is_instance_of(&self, def: &CollectionDef) -> bool {
        self.def().is_some_and(|own| own.ptr_eq(def))
    }

    /// Returns true if both handles refer to the same collection.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Deep JSON snapshot. Fails on cyclic containment.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        Snapshot::default().collection(self)
    }

    /// The listener table.
    #[must_use]
    pub fn bus(&self) -> &EventBus<Collection, Value> {
        &self.inner.bus
    }

    pub(crate) fn downgrade(&self) -> WeakCollection {
        WeakCollection(Rc::downgrade(&self.inner))
    }

    pub(crate) fn as_ptr(&self) -> *const () {
        Rc::as_ptr(&self.inner).cast()
    }

    // ── Internals ────────────────────────────────────────────────

    fn coerce(&self, value: Value) -> Value {
        match &self.inner.element {
            Some(element) if !element.is_instance(&value) => {
                debug!(element = element.name(), "converting inserted value");
                element.construct(std::slice::from_ref(&value))
            }
            _ => value,
        }
    }

    fn slot(&self, value: Value) -> Slot {
        let wiring = bridge::element(self, &value);
        Slot { value, wiring }
    }

    fn insert_at(&self, at: usize, value: &Value) {
        let slot = self.slot(value.clone());
        self.inner.items.borrow_mut().insert(at, slot);
        self.trigger(ADDED, std::slice::from_ref(value));
    }

    fn take_at(&self, index: usize) -> Option<Value> {
        let slot = {
            let mut items = self.inner.items.borrow_mut();
            if index >= items.len() {
                return None;
            }
            items.remove(index)
        };
        let value = self.release(slot);
        self.notify_detached(&value);
        Some(value)
    }

    /// Detaches a removed slot and reports it.
    fn release(&self, slot: Slot) -> Value {
        let Slot { value, wiring } = slot;
        drop(wiring);
        self.trigger(REMOVED, std::slice::from_ref(&value));
        value
    }

    fn notify_detached(&self, value: &Value) {
        let args = [Value::Collection(self.clone())];
        match value {
            Value::Entity(entity) => entity.trigger(DETACHED, &args),
            Value::Collection(collection) => collection.trigger(DETACHED, &args),
            Value::Data(_) | Value::Change(_) => {}
        }
    }
}

fn text_form(value: &Value) -> String {
    match value {
        Value::Data(serde_json::Value::String(text)) => text.clone(),
        Value::Data(data) => data.to_string(),
        // Cyclic containers have no snapshot; they order first.
        other => other.to_json().map(|json| json.to_string()).unwrap_or_default(),
    }
}

impl Observable for Collection {
    type Arg = Value;

    fn on(&self, names: &str, handler: &Handler<Self, Value>) {
        self.inner.bus.on(names, handler);
    }

    fn off(&self, names: &str, handler: &Handler<Self, Value>) {
        self.inner.bus.off(names, handler);
    }

    fn trigger(&self, names: &str, args: &[Value]) {
        self.inner.bus.trigger(self, names, args);
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Collection {}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("def", &self.def().map(CollectionDef::name))
            .field("element", &self.element().map(ElementType::name))
            .field("len", &self.len())
            .finish()
    }
}

impl Serialize for Collection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self
            .to_json()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        json.serialize(serializer)
    }
}
