//! Dotted-path access into configuration trees.
//!
//! `"llm_settings.default_provider"` is split on `.` and resolved by
//! descending through nested mappings one segment at a time.

use crate::error::{LoomError, Result};
use serde_json::{Map, Value};

/// Resolve a dotted key. Returns `None` as soon as a segment is missing or a
/// non-mapping value is reached before the last segment.
pub fn lookup<'a>(document: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.')
        .try_fold(document, |node, segment| node.as_object()?.get(segment))
}

/// Set a dotted key, creating intermediate mappings as needed.
///
/// Fails if an intermediate segment already holds a non-mapping value.
pub fn assign(document: &mut Value, key: &str, value: Value) -> Result<()> {
    let segments: Vec<&str> = key.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(LoomError::UserError(format!(
            "invalid configuration key '{}'",
            key
        )));
    }

    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| LoomError::UserError("configuration key must not be empty".to_string()))?;

    let mut node = document;
    for (depth, segment) in parents.iter().enumerate() {
        let map = node.as_object_mut().ok_or_else(|| not_a_mapping(&segments[..depth]))?;
        node = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let map = node
        .as_object_mut()
        .ok_or_else(|| not_a_mapping(parents))?;
    map.insert(last.to_string(), value);
    Ok(())
}

fn not_a_mapping(segments: &[&str]) -> LoomError {
    let path = if segments.is_empty() {
        "<root>".to_string()
    } else {
        segments.join(".")
    };
    LoomError::UserError(format!(
        "cannot set nested key: '{}' is not a mapping",
        path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn lookup_descends_nested_mappings() {
        let doc = json!({ "llm_settings": { "default_provider": "gemini" } });
        assert_eq!(
            lookup(&doc, "llm_settings.default_provider"),
            Some(&json!("gemini"))
        );
        assert_eq!(
            lookup(&doc, "llm_settings"),
            Some(&json!({ "default_provider": "gemini" }))
        );
    }

    #[test]
    fn lookup_missing_segment_is_none() {
        let doc = json!({ "a": { "b": 1 } });
        assert_eq!(lookup(&doc, "a.c"), None);
        assert_eq!(lookup(&doc, "x.y.z"), None);
    }

    #[test]
    fn lookup_through_scalar_is_none() {
        let doc = json!({ "a": 1 });
        assert_eq!(lookup(&doc, "a.b"), None);
    }

    #[test]
    fn lookup_does_not_index_sequences() {
        let doc = json!({ "a": ["x", "y"] });
        assert_eq!(lookup(&doc, "a.0"), None);
    }

    #[test]
    fn assign_creates_intermediate_mappings() {
        let mut doc = json!({});
        assign(&mut doc, "project.root", json!("/tmp/p")).unwrap();
        assert_eq!(doc, json!({ "project": { "root": "/tmp/p" } }));
    }

    #[test]
    fn assign_preserves_siblings() {
        let mut doc = json!({ "project": { "name": "demo" } });
        assign(&mut doc, "project.root", json!("/tmp/p")).unwrap();
        assert_eq!(doc, json!({ "project": { "name": "demo", "root": "/tmp/p" } }));
    }

    #[test]
    fn assign_through_scalar_fails() {
        let mut doc = json!({ "project": "demo" });
        let err = assign(&mut doc, "project.root", json!("x")).unwrap_err();
        assert!(err.to_string().contains("'project' is not a mapping"));
    }

    #[test]
    fn assign_rejects_empty_segments() {
        let mut doc = json!({});
        assert!(assign(&mut doc, "a..b", json!(1)).is_err());
        assert!(assign(&mut doc, "", json!(1)).is_err());
    }
}
