//! The global configuration document.
//!
//! `ConfigManager` owns one validated configuration tree for the lifetime of a
//! command. It is constructed explicitly and passed by reference to whatever
//! needs it; there is no process-wide instance.

use super::lookup::{assign, lookup};
use super::schema::Schema;
use crate::error::{LoomError, Result};
use crate::fs::atomic_write_file;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Conventional name of the global configuration file at the project root.
pub const DEFAULT_CONFIG_FILE: &str = "dev-automation.config.json";

/// A loaded, schema-validated configuration document.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    path: Option<PathBuf>,
    document: Value,
    schema: Schema,
}

impl ConfigManager {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// * `ConfigNotFound` - the file does not exist
    /// * `ConfigParse` - the file is not well-formed JSON (or YAML for `.yaml`/`.yml`)
    /// * `ConfigValidation` - the document does not satisfy `schema`
    pub fn load<P: AsRef<Path>>(path: P, schema: Schema) -> Result<Self> {
        let path = path.as_ref();
        let document = read_document(path, None)?;

        schema
            .validate(&document)
            .map_err(|violation| LoomError::ConfigValidation {
                source_label: format!("'{}'", path.display()),
                violation,
            })?;

        tracing::debug!(path = %path.display(), "loaded configuration");

        Ok(Self {
            path: Some(path.to_path_buf()),
            document,
            schema,
        })
    }

    /// Build a manager from an in-memory document, validating it first.
    pub fn from_document(document: Value, schema: Schema) -> Result<Self> {
        schema
            .validate(&document)
            .map_err(|violation| LoomError::ConfigValidation {
                source_label: "in-memory configuration".to_string(),
                violation,
            })?;

        Ok(Self {
            path: None,
            document,
            schema,
        })
    }

    /// Look up a dotted key such as `"llm_settings.default_provider"`.
    ///
    /// Never fails: a missing segment yields `None`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.document, key)
    }

    /// Look up a dotted key, falling back to `default` when absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// Look up a dotted key that holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up a dotted key that holds a boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Deserialize the sub-tree at `key` into `T`.
    ///
    /// Returns `Ok(None)` when the key is absent.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    LoomError::UserError(format!(
                        "configuration key '{}' has an unexpected shape: {}",
                        key, e
                    ))
                })
            })
            .transpose()
    }

    /// Set a dotted key, creating intermediate mappings.
    ///
    /// Only the `init` flow and project-root injection mutate a loaded config.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        assign(&mut self.document, key, value)
    }

    /// The whole configuration document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// The schema this document was validated against.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The file this configuration was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_pretty_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.document).map_err(|e| {
            LoomError::UserError(format!("failed to serialize configuration: {}", e))
        })
    }

    /// Write the document to `path` as pretty JSON.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut content = self.to_pretty_json()?;
        content.push('\n');
        atomic_write_file(path, &content)
    }
}

/// Read and parse a structured key-value file into a configuration tree.
///
/// Files ending in `.yaml` or `.yml` are parsed as YAML, everything else as JSON.
/// `agent` is recorded in parse errors for agent-local overrides.
pub(crate) fn read_document(path: &Path, agent: Option<&str>) -> Result<Value> {
    if !path.exists() {
        return Err(LoomError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content =
        std::fs::read_to_string(path).map_err(|e| LoomError::io("read", path, e))?;

    parse_document(&content, path).map_err(|message| LoomError::ConfigParse {
        path: path.to_path_buf(),
        agent: agent.map(str::to_string),
        message,
    })
}

fn parse_document(content: &str, path: &Path) -> std::result::Result<Value, String> {
    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

    if is_yaml {
        serde_yaml::from_str(content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(content).map_err(|e| e.to_string())
    }
}
