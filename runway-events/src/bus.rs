//! Per-instance listener table with hierarchical dispatch.
//!
//! # Dispatch
//!
//! `trigger("a:b:c", args)` invokes, in order:
//! 1. handlers registered on `a:b:c`
//! 2. handlers registered on `a:b`
//! 3. handlers registered on `a`
//! 4. handlers registered on [`WILDCARD`]
//!
//! Within a level handlers run in registration order. A name list such as
//! `"add change"` repeats the whole walk for each name.
//!
//! # Mutation during dispatch
//!
//! Each level's handler list is an `Rc<Vec<_>>`. Dispatch clones the `Rc`
//! (a refcount bump) and releases the table borrow before calling anything,
//! so handlers may call `on`, `off` and `trigger` on the same bus. Mutation
//! goes through `Rc::make_mut`, which copies the list only while a dispatch
//! of that level is in flight. The in-flight pass keeps running against the
//! list as it was when the level started.

use crate::handler::Handler;
use crate::name::{WILDCARD, levels, split_names};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

type HandlerList<C, A> = Rc<Vec<Handler<C, A>>>;

/// A namespaced publish/subscribe table.
///
/// The bus does not know its owner: the emitting instance is passed to
/// [`trigger`](Self::trigger) and forwarded to every handler. Owners embed
/// a bus and implement [`Observable`](crate::Observable) on top of it.
pub struct EventBus<C: ?Sized, A = serde_json::Value> {
    listeners: RefCell<HashMap<String, HandlerList<C, A>>>,
}

impl<C: ?Sized, A> Default for EventBus<C, A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: ?Sized, A> EventBus<C, A> {
    /// Creates an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self {
            listeners: RefCell::new(HashMap::new()),
        }
    }

    /// Registers `handler` once for each name in the space-separated list.
    ///
    /// Registering the same handler twice under one name yields two
    /// invocations per trigger.
    pub fn on(&self, names: &str, handler: &Handler<C, A>) {
        let mut listeners = self.listeners.borrow_mut();
        for name in split_names(names) {
            let list = listeners.entry(name.to_owned()).or_default();
            Rc::make_mut(list).push(handler.clone());
        }
    }

    /// Removes every registration of `handler` under each listed name.
    ///
    /// Unknown names and unregistered handlers are ignored.
    pub fn off(&self, names: &str, handler: &Handler<C, A>) {
        let mut listeners = self.listeners.borrow_mut();
        for name in split_names(names) {
            let Some(list) = listeners.get_mut(name) else {
                continue;
            };
            if !list.iter().any(|h| h.ptr_eq(handler)) {
                continue;
            }
            Rc::make_mut(list).retain(|h| !h.ptr_eq(handler));
            if list.is_empty() {
                listeners.remove(name);
            }
        }
    }

    /// Removes every handler registered under each listed name.
    pub fn off_all(&self, names: &str) {
        let mut listeners = self.listeners.borrow_mut();
        for name in split_names(names) {
            listeners.remove(name);
        }
    }

    /// Removes every handler.
    pub fn clear(&self) {
        self.listeners.borrow_mut().clear();
    }

    /// Triggers each name in the space-separated list on behalf of `target`.
    pub fn trigger(&self, target: &C, names: &str, args: &[A]) {
        for name in split_names(names) {
            for level in levels(name) {
                self.dispatch(target, level, args);
            }
            if name != WILDCARD {
                self.dispatch(target, WILDCARD, args);
            }
        }
    }

    /// Number of handlers registered under exactly `name`.
    #[must_use]
    pub fn listener_count(&self, name: &str) -> usize {
        self.listeners.borrow().get(name).map_or(0, |list| list.len())
    }

    /// Returns true if no handler is registered under any name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.listeners.borrow().is_empty()
    }

    /// Invokes the handlers registered under exactly `name`.
    fn dispatch(&self, target: &C, name: &str, args: &[A]) {
        let Some(handlers) = self.snapshot(name) else {
            return;
        };
        trace!(event = name, handlers = handlers.len(), args = args.len(), "dispatch");
        for handler in handlers.iter() {
            handler.call(target, args);
        }
    }

    fn snapshot(&self, name: &str) -> Option<HandlerList<C, A>> {
        self.listeners.borrow().get(name).map(Rc::clone)
    }
}

impl<C: ?Sized, A> fmt::Debug for EventBus<C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        let mut names: Vec<_> = listeners.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("EventBus")
            .field("names", &names)
            .field(
                "handlers",
                &listeners.values().map(|list| list.len()).sum::<usize>(),
            )
            .finish()
    }
}
