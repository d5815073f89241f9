//! Dynamically typed slot content.
//!
//! Fields and collection slots hold a [`Value`]. The tag decides how a value
//! takes part in change propagation: `Entity` and `Collection` values are
//! bridged into their container, plain `Data` is not.

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::ModelResult;
use crate::snapshot::Snapshot;
use serde::{Serialize, Serializer};
use std::fmt;
use std::rc::Rc;

/// A field value, collection element, or event argument.
///
/// Equality is identity: entities and collections compare by pointer, plain
/// data by value. Use [`Value::to_json`] for deep structural comparison.
#[derive(Clone)]
pub enum Value {
    /// Plain data. Never bridged.
    Data(serde_json::Value),
    /// A nested entity.
    Entity(Entity),
    /// A nested collection.
    Collection(Collection),
    /// The `{old, key}` metadata passed with `change:<key>` events.
    Change(Rc<FieldChange>),
}

/// Metadata of a field assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Value held by the field before the assignment.
    pub old: Value,
    /// Name of the assigned field.
    pub key: String,
}

/// Returns true if `value` is an entity or a collection.
#[must_use]
pub fn is(value: &Value) -> bool {
    value.is_observable()
}

impl Value {
    /// The null value.
    pub const NULL: Self = Self::Data(serde_json::Value::Null);

    pub(crate) fn change(old: Value, key: &str) -> Self {
        Self::Change(Rc::new(FieldChange {
            old,
            key: key.to_owned(),
        }))
    }

    /// Identity comparison.
    #[must_use]
    pub fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Data(a), Self::Data(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => a.ptr_eq(b),
            (Self::Collection(a), Self::Collection(b)) => a.ptr_eq(b),
            (Self::Change(a), Self::Change(b)) => Rc::ptr_eq(a, b) || **a == **b,
            _ => false,
        }
    }

    /// Returns true for entities and collections.
    #[must_use]
    pub fn is_observable(&self) -> bool {
        matches!(self, Self::Entity(_) | Self::Collection(_))
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Data(serde_json::Value::Null))
    }

    #[must_use]
    pub fn as_data(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Data(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_change(&self) -> Option<&FieldChange> {
        match self {
            Self::Change(change) => Some(change),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_data().and_then(serde_json::Value::as_i64)
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_data().and_then(serde_json::Value::as_f64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_data().and_then(serde_json::Value::as_str)
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_data().and_then(serde_json::Value::as_bool)
    }

    /// Deep JSON snapshot. Fails on cyclic containment.
    pub fn to_json(&self) -> ModelResult<serde_json::Value> {
        Snapshot::default().value(self)
    }
}

impl Default for Value {
    fn default() -> Self {
        Self::NULL
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Data(data) => write!(f, "Data({data})"),
            Self::Entity(entity) => fmt::Debug::fmt(entity, f),
            Self::Collection(collection) => fmt::Debug::fmt(collection, f),
            Self::Change(change) => fmt::Debug::fmt(&**change, f),
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let json = self
            .to_json()
            .map_err(<S::Error as serde::ser::Error>::custom)?;
        json.serialize(serializer)
    }
}

impl From<serde_json::Value> for Value {
    fn from(data: serde_json::Value) -> Self {
        Self::Data(data)
    }
}

impl From<Entity> for Value {
    fn from(entity: Entity) -> Self {
        Self::Entity(entity)
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Self::Collection(collection)
    }
}

impl From<()> for Value {
    fn from((): ()) -> Self {
        Self::NULL
    }
}

macro_rules! impl_from_data {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Value {
                fn from(data: $ty) -> Self {
                    Self::Data(serde_json::Value::from(data))
                }
            }
        )*
    };
}

impl_from_data!(bool, i32, i64, u32, u64, f64, &str, String);
