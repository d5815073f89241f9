//! Declarative definitions.
//!
//! Schemas are the data form of [`EntityDef`] and [`CollectionDef`]: they
//! carry names, default field values and element types, but no code.
//! Preprocessing and initialization hooks can only be attached through the
//! builders.

use crate::def::{CollectionDef, EntityDef, ElementType};
use crate::error::{ModelError, ModelResult};
use crate::value::Value;
use runway_events::EventName;
use serde::{Deserialize, Serialize};
use serde_json::Map;
use tracing::debug;

/// Describes an entity kind: its name and default fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    pub name: String,
    /// Default field values, installed in key order.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub defaults: Map<String, serde_json::Value>,
}

impl EntitySchema {
    /// A schema without defaults.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            defaults: Map::new(),
        }
    }

    /// Adds a default field.
    #[must_use]
    pub fn with_default(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.defaults.insert(key.into(), value);
        self
    }

    fn validate(&self) -> ModelResult<()> {
        validate_name(&self.name)?;
        for key in self.defaults.keys() {
            EventName::scoped("change", key)?;
        }
        Ok(())
    }
}

/// Describes a collection kind: its name and optional element type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSchema {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<ElementSchema>,
}

impl CollectionSchema {
    /// An untyped collection schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element: None,
        }
    }

    /// Sets the element type.
    #[must_use]
    pub fn with_element(mut self, element: ElementSchema) -> Self {
        self.element = Some(element);
        self
    }
}

/// Element type of a collection schema, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementSchema {
    Entity(EntitySchema),
    Collection(Box<CollectionSchema>),
}

fn validate_name(name: &str) -> ModelResult<()> {
    if name.trim().is_empty() {
        return Err(ModelError::Schema("definition name is empty".into()));
    }
    Ok(())
}

impl EntityDef {
    /// Builds a definition from a schema.
    pub fn from_schema(schema: &EntitySchema) -> ModelResult<Self> {
        schema.validate()?;
        let mut builder = Self::builder(&schema.name);
        for (key, value) in &schema.defaults {
            builder = builder.default(key.as_str(), Value::Data(value.clone()));
        }
        debug!(def = %schema.name, defaults = schema.defaults.len(), "entity definition loaded");
        Ok(builder.build())
    }

    /// Parses an [`EntitySchema`] document and builds its definition.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let schema: EntitySchema = serde_json::from_str(json)?;
        Self::from_schema(&schema)
    }
}

impl CollectionDef {
    /// Builds a definition from a schema, including nested element types.
    pub fn from_schema(schema: &CollectionSchema) -> ModelResult<Self> {
        validate_name(&schema.name)?;
        let mut builder = Self::builder(&schema.name);
        if let Some(element) = &schema.element {
            builder = builder.element(ElementType::from_schema(element)?);
        }
        debug!(def = %schema.name, "collection definition loaded");
        Ok(builder.build())
    }

    /// Parses a [`CollectionSchema`] document and builds its definition.
    pub fn from_json_str(json: &str) -> ModelResult<Self> {
        let schema: CollectionSchema = serde_json::from_str(json)?;
        Self::from_schema(&schema)
    }
}

impl ElementType {
    /// Builds an element type from a schema.
    pub fn from_schema(schema: &ElementSchema) -> ModelResult<Self> {
        Ok(match schema {
            ElementSchema::Entity(entity) => Self::Entity(EntityDef::from_schema(entity)?),
            ElementSchema::Collection(collection) => {
                Self::Collection(CollectionDef::from_schema(collection)?)
            }
        })
    }
}
