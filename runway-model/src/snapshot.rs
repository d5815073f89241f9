//! Deep JSON snapshots of an object graph.
//!
//! Event propagation does not guard against cyclic containment, but a
//! snapshot must terminate, so the walk keeps the chain of entered
//! containers and fails with [`ModelError::Cycle`] when one repeats.

use crate::collection::Collection;
use crate::entity::Entity;
use crate::error::{ModelError, ModelResult};
use crate::value::Value;
use serde_json::{Map, Value as Json};

#[derive(Default)]
pub(crate) struct Snapshot {
    stack: Vec<*const ()>,
    path: Vec<String>,
}

impl Snapshot {
    pub(crate) fn value(&mut self, value: &Value) -> ModelResult<Json> {
        match value {
            Value::Data(data) => Ok(data.clone()),
            Value::Entity(entity) => self.entity(entity),
            Value::Collection(collection) => self.collection(collection),
            Value::Change(change) => {
                let mut map = Map::new();
                self.path.push("old".into());
                let old = self.value(&change.old)?;
                self.path.pop();
                map.insert("old".into(), old);
                map.insert("key".into(), Json::String(change.key.clone()));
                Ok(Json::Object(map))
            }
        }
    }

    pub(crate) fn entity(&mut self, entity: &Entity) -> ModelResult<Json> {
        self.enter(entity.as_ptr())?;
        let mut map = Map::new();
        for (key, value) in entity.entries() {
            self.path.push(key.clone());
            let json = self.value(&value)?;
            self.path.pop();
            map.insert(key, json);
        }
        self.stack.pop();
        Ok(Json::Object(map))
    }

    pub(crate) fn collection(&mut self, collection: &Collection) -> ModelResult<Json> {
        self.enter(collection.as_ptr())?;
        let mut items = Vec::with_capacity(collection.len());
        for (index, value) in collection.to_array().iter().enumerate() {
            self.path.push(format!("[{index}]"));
            items.push(self.value(value)?);
            self.path.pop();
        }
        self.stack.pop();
        Ok(Json::Array(items))
    }

    fn enter(&mut self, ptr: *const ()) -> ModelResult<()> {
        if self.stack.contains(&ptr) {
            return Err(ModelError::Cycle {
                path: self.render_path(),
            });
        }
        self.stack.push(ptr);
        Ok(())
    }

    fn render_path(&self) -> String {
        let mut out = String::from("$");
        for segment in &self.path {
            if !segment.starts_with('[') {
                out.push('.');
            }
            out.push_str(segment);
        }
        out
    }
}
