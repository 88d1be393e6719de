//! Serialization adapters between the Edge wire format and local entities

use serde_json::{Map, Value};
use std::sync::Arc;

/// Converts one aspect of an entity between wire and local shape.
///
/// Normalizers run in order on the way in (`denormalize`) and in reverse
/// order on the way out (`normalize`).
pub trait EntityNormalizer: Send + Sync {
    /// Local shape to wire shape.
    fn normalize(&self, value: &mut Value);

    /// Wire shape to local shape.
    fn denormalize(&self, value: &mut Value);
}

/// Edge sends custom attributes as `[{"name": .., "value": ..}]`; locally they
/// are a plain JSON object.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttributesNormalizer;

impl EntityNormalizer for AttributesNormalizer {
    fn normalize(&self, value: &mut Value) {
        let Some(attributes) = value.get_mut("attributes") else {
            return;
        };
        if let Value::Object(map) = &*attributes {
            let list = map
                .iter()
                .map(|(name, value)| {
                    let mut pair = Map::new();
                    pair.insert("name".to_string(), Value::String(name.clone()));
                    pair.insert("value".to_string(), value.clone());
                    Value::Object(pair)
                })
                .collect();
            *attributes = Value::Array(list);
        }
    }

    fn denormalize(&self, value: &mut Value) {
        let Some(attributes) = value.get_mut("attributes") else {
            return;
        };
        if let Value::Array(list) = &*attributes {
            let mut map = Map::new();
            for pair in list.iter() {
                if let Some(name) = pair.get("name").and_then(Value::as_str) {
                    let value = pair.get("value").cloned().unwrap_or(Value::Null);
                    let value = match value {
                        Value::String(_) => value,
                        Value::Null => Value::String(String::new()),
                        other => Value::String(other.to_string()),
                    };
                    map.insert(name.to_string(), value);
                }
            }
            *attributes = Value::Object(map);
        }
    }
}

/// Normalizers applied when a controller is built with an empty list.
pub fn default_normalizers() -> Vec<Arc<dyn EntityNormalizer>> {
    vec![Arc::new(AttributesNormalizer)]
}
