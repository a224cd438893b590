//! Deep merge of configuration trees.
//!
//! Mappings are merged key by key; every other value (scalars and sequences)
//! from the override replaces the base value outright. When the two sides
//! disagree on type at the same key the override wins, including a scalar
//! replacing a whole mapping.

use serde_json::{Map, Value};

/// Merge `overlay` on top of `base`, returning a new tree.
///
/// Neither input is mutated. A non-mapping `overlay` replaces `base` entirely;
/// an empty mapping leaves `base` unchanged.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            Value::Object(merge_maps(base_map, overlay_map))
        }
        _ => overlay.clone(),
    }
}

fn merge_maps(base: &Map<String, Value>, overlay: &Map<String, Value>) -> Map<String, Value> {
    let mut merged = base.clone();
    for (key, value) in overlay {
        let next = match merged.get(key) {
            Some(existing) => deep_merge(existing, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), next);
    }
    merged
}
