//! Entity and collection definitions.
//!
//! A definition plays the role of a constructor: it turns constructor
//! arguments into an instance, applying an optional preprocessing step,
//! declared defaults, and an initialization hook. Instances remember their
//! definition, which is what element-type checks compare against.

use crate::collection::Collection;
use crate::entity::Entity;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;
use tracing::debug;

/// Field names and values, in installation order.
pub type Record = Vec<(String, Value)>;

type EntityPreprocess = Box<dyn Fn(&[Value]) -> Record>;
type CollectionPreprocess = Box<dyn Fn(&[Value]) -> Vec<Value>>;
type Initialize<T> = Box<dyn Fn(&T)>;

// ── EntityDef ────────────────────────────────────────────────────

struct EntityDefInner {
    name: String,
    defaults: Record,
    preprocess: Option<EntityPreprocess>,
    initialize: Option<Initialize<Entity>>,
}

/// Constructor for entities of one kind.
///
/// Cloning shares the definition; instances built by any clone are
/// instances of all of them.
#[derive(Clone)]
pub struct EntityDef {
    inner: Rc<EntityDefInner>,
}

impl EntityDef {
    /// Starts a definition.
    pub fn builder(name: impl Into<String>) -> EntityDefBuilder {
        EntityDefBuilder {
            name: name.into(),
            defaults: Vec::new(),
            preprocess: None,
            initialize: None,
        }
    }

    /// Constructs an entity from constructor arguments.
    ///
    /// The arguments are mapped to a record by the preprocessing step if
    /// one is declared; otherwise the first argument is the record (a JSON
    /// object, or an entity whose fields are copied). Record fields are
    /// installed first, then declared defaults not already present, then
    /// the initializer runs.
    #[must_use]
    pub fn construct(&self, args: &[Value]) -> Entity {
        let record = match &self.inner.preprocess {
            Some(preprocess) => preprocess(args),
            None => record_from(args.first()),
        };
        let entity = Entity::with_def(Some(self.clone()));
        for (key, value) in record {
            entity.install(&key, value);
        }
        for (key, value) in &self.inner.defaults {
            entity.install(key, value.clone());
        }
        if let Some(initialize) = &self.inner.initialize {
            initialize(&entity);
        }
        debug!(def = %self.inner.name, fields = entity.len(), "entity constructed");
        entity
    }

    /// Constructs an entity from a single record argument.
    #[must_use]
    pub fn create(&self, record: impl Into<Value>) -> Entity {
        self.construct(&[record.into()])
    }

    /// Constructs an entity from no arguments.
    #[must_use]
    pub fn new_default(&self) -> Entity {
        self.construct(&[])
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Declared default fields.
    #[must_use]
    pub fn defaults(&self) -> &[(String, Value)] {
        &self.inner.defaults
    }

    /// Returns true if both handles refer to the same definition.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for EntityDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDef")
            .field("name", &self.inner.name)
            .field(
                "defaults",
                &self.inner.defaults.iter().map(|(k, _)| k).collect::<Vec<_>>(),
            )
            .field("preprocess", &self.inner.preprocess.is_some())
            .field("initialize", &self.inner.initialize.is_some())
            .finish()
    }
}

fn record_from(arg: Option<&Value>) -> Record {
    match arg {
        Some(Value::Data(serde_json::Value::Object(map))) => map
            .iter()
            .map(|(key, value)| (key.clone(), Value::Data(value.clone())))
            .collect(),
        Some(Value::Entity(entity)) => entity.entries(),
        _ => Vec::new(),
    }
}

/// Builder for [`EntityDef`].
pub struct EntityDefBuilder {
    name: String,
    defaults: Record,
    preprocess: Option<EntityPreprocess>,
    initialize: Option<Initialize<Entity>>,
}

impl EntityDefBuilder {
    /// Declares a default field. The first declaration of a key wins.
    #[must_use]
    pub fn default(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !self.defaults.iter().any(|(k, _)| *k == key) {
            self.defaults.push((key, value.into()));
        }
        self
    }

    /// Maps constructor arguments to the record of fields to install.
    #[must_use]
    pub fn preprocess(mut self, preprocess: impl Fn(&[Value]) -> Record + 'static) -> Self {
        self.preprocess = Some(Box::new(preprocess));
        self
    }

    /// Runs once per instance after every field is installed.
    #[must_use]
    pub fn initialize(mut self, initialize: impl Fn(&Entity) + 'static) -> Self {
        self.initialize = Some(Box::new(initialize));
        self
    }

    #[must_use]
    pub fn build(self) -> EntityDef {
        EntityDef {
            inner: Rc::new(EntityDefInner {
                name: self.name,
                defaults: self.defaults,
                preprocess: self.preprocess,
                initialize: self.initialize,
            }),
        }
    }
}

// ── CollectionDef ────────────────────────────────────────────────

struct CollectionDefInner {
    name: String,
    element: Option<ElementType>,
    preprocess: Option<CollectionPreprocess>,
    initialize: Option<Initialize<Collection>>,
}

/// Constructor for collections of one kind.
#[derive(Clone)]
pub struct CollectionDef {
    inner: Rc<CollectionDefInner>,
}

impl CollectionDef {
    /// Starts a definition.
    pub fn builder(name: impl Into<String>) -> CollectionDefBuilder {
        CollectionDefBuilder {
            name: name.into(),
            element: None,
            preprocess: None,
            initialize: None,
        }
    }

    /// Constructs a collection from constructor arguments.
    ///
    /// The arguments are mapped to initial elements by the preprocessing
    /// step if one is declared; otherwise the first argument supplies them
    /// (the items of a JSON array, or the elements of a collection). The
    /// initializer runs before the elements are pushed, so listeners it
    /// registers observe their `add` events.
    #[must_use]
    pub fn construct(&self, args: &[Value]) -> Collection {
        let values = match &self.inner.preprocess {
            Some(preprocess) => preprocess(args),
            None => values_from(args.first()),
        };
        self.populate(values)
    }

    /// Constructs a collection holding `values`, bypassing preprocessing.
    pub fn create(&self, values: impl IntoIterator<Item = Value>) -> Collection {
        self.populate(values)
    }

    /// Constructs an empty collection.
    #[must_use]
    pub fn new_default(&self) -> Collection {
        self.populate(Vec::new())
    }

    fn populate(&self, values: impl IntoIterator<Item = Value>) -> Collection {
        let collection = Collection::with_def(self.clone());
        if let Some(initialize) = &self.inner.initialize {
            initialize(&collection);
        }
        for value in values {
            collection.push(value);
        }
        debug!(def = %self.inner.name, len = collection.len(), "collection constructed");
        collection
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The declared element type.
    #[must_use]
    pub fn element(&self) -> Option<&ElementType> {
        self.inner.element.as_ref()
    }

    /// Returns true if both handles refer to the same definition.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for CollectionDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionDef")
            .field("name", &self.inner.name)
            .field("element", &self.inner.element.as_ref().map(ElementType::name))
            .field("preprocess", &self.inner.preprocess.is_some())
            .field("initialize", &self.inner.initialize.is_some())
            .finish()
    }
}

fn values_from(arg: Option<&Value>) -> Vec<Value> {
    match arg {
        Some(Value::Data(serde_json::Value::Array(items))) => {
            items.iter().cloned().map(Value::Data).collect()
        }
        Some(Value::Collection(collection)) => collection.to_array(),
        _ => Vec::new(),
    }
}

/// Builder for [`CollectionDef`].
pub struct CollectionDefBuilder {
    name: String,
    element: Option<ElementType>,
    preprocess: Option<CollectionPreprocess>,
    initialize: Option<Initialize<Collection>>,
}

impl CollectionDefBuilder {
    /// Declares the element type inserted values are converted to.
    #[must_use]
    pub fn element(mut self, element: impl Into<ElementType>) -> Self {
        self.element = Some(element.into());
        self
    }

    /// Maps constructor arguments to the initial elements.
    #[must_use]
    pub fn preprocess(mut self, preprocess: impl Fn(&[Value]) -> Vec<Value> + 'static) -> Self {
        self.preprocess = Some(Box::new(preprocess));
        self
    }

    /// Runs once per instance, before the initial elements are pushed.
    #[must_use]
    pub fn initialize(mut self, initialize: impl Fn(&Collection) + 'static) -> Self {
        self.initialize = Some(Box::new(initialize));
        self
    }

    #[must_use]
    pub fn build(self) -> CollectionDef {
        CollectionDef {
            inner: Rc::new(CollectionDefInner {
                name: self.name,
                element: self.element,
                preprocess: self.preprocess,
                initialize: self.initialize,
            }),
        }
    }
}

// ── ElementType ──────────────────────────────────────────────────

/// The kind of element a collection converts inserted values to.
#[derive(Debug, Clone)]
pub enum ElementType {
    Entity(EntityDef),
    Collection(CollectionDef),
}

impl ElementType {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Entity(def) => def.name(),
            Self::Collection(def) => def.name(),
        }
    }

    /// Returns true if `value` was constructed from this element type.
    #[must_use]
    pub fn is_instance(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Entity(def), Value::Entity(entity)) => entity.is_instance_of(def),
            (Self::Collection(def), Value::Collection(collection)) => {
                collection.is_instance_of(def)
            }
            _ => false,
        }
    }

    /// Constructs an element from constructor arguments.
    #[must_use]
    pub fn construct(&self, args: &[Value]) -> Value {
        match self {
            Self::Entity(def) => Value::Entity(def.construct(args)),
            Self::Collection(def) => Value::Collection(def.construct(args)),
        }
    }
}

impl From<EntityDef> for ElementType {
    fn from(def: EntityDef) -> Self {
        Self::Entity(def)
    }
}

impl From<CollectionDef> for ElementType {
    fn from(def: CollectionDef) -> Self {
        Self::Collection(def)
    }
}
