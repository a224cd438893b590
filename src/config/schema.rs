//! Structural validation of configuration documents.
//!
//! Implements the subset of JSON Schema that loom configs rely on:
//! `type`, `required`, `properties`, `items`, and `enum`. Unknown keywords are
//! ignored and keys not listed under `properties` are accepted, so agent
//! sections and future settings never trip validation.

use crate::error::{LoomError, Result};
use serde_json::{Map, Value, json};
use std::fmt;
use std::path::Path;

/// A single schema violation, located by dotted key path.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaViolation {
    /// Dotted path of the offending key (`""` for the document root).
    pub path: String,
    /// Which constraint failed.
    pub kind: ViolationKind,
}

/// The constraint a document failed to satisfy.
#[derive(Debug, Clone, PartialEq)]
pub enum ViolationKind {
    /// A key listed in `required` is absent.
    Required,
    /// The value's type is not one of the declared types.
    Type {
        expected: Vec<String>,
        found: &'static str,
    },
    /// The value is not a member of the declared `enum`.
    Enum { allowed: Vec<Value> },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = if self.path.is_empty() {
            "<root>"
        } else {
            self.path.as_str()
        };
        match &self.kind {
            ViolationKind::Required => write!(f, "missing required key '{}'", key),
            ViolationKind::Type { expected, found } => write!(
                f,
                "key '{}' must be of type {} (found {})",
                key,
                expected.join(" or "),
                found
            ),
            ViolationKind::Enum { allowed } => {
                let allowed: Vec<String> = allowed.iter().map(Value::to_string).collect();
                write!(f, "key '{}' must be one of [{}]", key, allowed.join(", "))
            }
        }
    }
}

/// A loaded schema document. Read-only once constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    document: Value,
}

impl Schema {
    /// The schema shipped with loom for `dev-automation.config.json`.
    pub fn builtin() -> Self {
        Self {
            document: builtin_schema(),
        }
    }

    /// A schema that accepts any mapping.
    pub fn permissive() -> Self {
        Self {
            document: json!({ "type": "object" }),
        }
    }

    /// Wrap an in-memory schema document. The root must be a mapping.
    pub fn from_value(document: Value) -> Result<Self> {
        if !document.is_object() {
            return Err(LoomError::UserError(
                "schema document must be a JSON object".to_string(),
            ));
        }
        Ok(Self { document })
    }

    /// Load a schema from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let document = super::manager::read_document(path, None)?;
        Self::from_value(document)
    }

    /// The raw schema document.
    pub fn as_value(&self) -> &Value {
        &self.document
    }

    /// Validate `document` against this schema.
    pub fn validate(&self, document: &Value) -> std::result::Result<(), SchemaViolation> {
        validate(document, &self.document)
    }
}

/// Confirm that `document` conforms to `schema`.
///
/// Pure function: reports the first violation found and never mutates or
/// corrects its input.
pub fn validate(document: &Value, schema: &Value) -> std::result::Result<(), SchemaViolation> {
    validate_node(document, schema, "")
}

fn validate_node(
    value: &Value,
    schema: &Value,
    path: &str,
) -> std::result::Result<(), SchemaViolation> {
    let Some(schema) = schema.as_object() else {
        return Ok(());
    };

    if let Some(types) = schema.get("type") {
        let expected = declared_types(types);
        if !expected.is_empty() && !expected.iter().any(|t| type_matches(value, t)) {
            return Err(SchemaViolation {
                path: path.to_string(),
                kind: ViolationKind::Type {
                    expected,
                    found: type_name(value),
                },
            });
        }
    }

    if let Some(Value::Array(allowed)) = schema.get("enum")
        && !allowed.contains(value)
    {
        return Err(SchemaViolation {
            path: path.to_string(),
            kind: ViolationKind::Enum {
                allowed: allowed.clone(),
            },
        });
    }

    match value {
        Value::Object(map) => validate_object(map, schema, path),
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items") {
                for (i, item) in items.iter().enumerate() {
                    validate_node(item, item_schema, &format!("{}[{}]", path, i))?;
                }
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn validate_object(
    map: &Map<String, Value>,
    schema: &Map<String, Value>,
    path: &str,
) -> std::result::Result<(), SchemaViolation> {
    if let Some(Value::Array(required)) = schema.get("required") {
        for key in required.iter().filter_map(Value::as_str) {
            if !map.contains_key(key) {
                return Err(SchemaViolation {
                    path: child_path(path, key),
                    kind: ViolationKind::Required,
                });
            }
        }
    }

    if let Some(Value::Object(properties)) = schema.get("properties") {
        for (key, sub_schema) in properties {
            if let Some(sub_value) = map.get(key) {
                validate_node(sub_value, sub_schema, &child_path(path, key))?;
            }
        }
    }

    Ok(())
}

fn declared_types(types: &Value) -> Vec<String> {
    match types {
        Value::String(t) => vec![t.clone()],
        Value::Array(ts) => ts
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn type_matches(value: &Value, expected: &str) -> bool {
    match expected {
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "boolean" => value.is_boolean(),
        "null" => value.is_null(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        // Unknown type names never reject a document.
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn builtin_schema() -> Value {
    let string = json!({ "type": "string" });
    let string_list = json!({ "type": "array", "items": { "type": "string" } });

    json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "dev-automation.config.json",
        "type": "object",
        "required": ["project", "llm_settings"],
        "properties": {
            "project": {
                "type": "object",
                "properties": {
                    "name": string,
                    "context": string,
                    "tech_stack": string,
                    "architecture": string,
                    "target_users": string,
                    "constraints": string,
                    "root": string
                }
            },
            "llm_settings": {
                "type": "object",
                "properties": {
                    "default_provider": {
                        "type": "string",
                        "enum": ["gemini", "claude-code", "openai"]
                    },
                    "model": string,
                    "temperature": { "type": "number" },
                    "max_tokens": { "type": "integer" },
                    "timeout_seconds": { "type": "integer" },
                    "output_format": string,
                    "research_depth": string,
                    "providers": { "type": "object" }
                }
            },
            "github": {
                "type": "object",
                "properties": {
                    "repo_owner": string,
                    "repo_name": string,
                    "default_project": string,
                    "default_labels": string_list
                }
            },
            "automation": {
                "type": "object",
                "properties": {
                    "auto_create_issues": { "type": "boolean" },
                    "auto_assign": { "type": "boolean" }
                }
            },
            "templates": { "type": "object" },
            "agents": {
                "type": "object",
                "properties": {
                    "directory": string
                }
            },
            "agent_execution_order": string_list
        }
    })
}
