//! Project context resolution for loom.
//!
//! Every command works against one project root. This module resolves that
//! root and the fixed locations beneath it (configuration file, generated
//! output, run state) so commands never assemble paths on their own.

use crate::config::{ConfigManager, DEFAULT_CONFIG_FILE, Schema};
use crate::error::{LoomError, Result};
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};

/// Directory for generated issue files, relative to the project root.
pub const DEFAULT_OUTPUT_DIR: &str = "generated-issues";

/// Directory for loom's own run state, relative to the project root.
pub const DEFAULT_STATE_DIR: &str = ".loom";

/// Resolved paths for one loom invocation. All paths are absolute.
#[derive(Debug, Clone)]
pub struct ProjectContext {
    /// Absolute path to the project root.
    pub root: PathBuf,

    /// Global configuration file (default: `{root}/dev-automation.config.json`).
    pub config_path: PathBuf,

    /// Schema file replacing the built-in schema, if given.
    pub schema_path: Option<PathBuf>,

    /// Generated issues directory (default: `{root}/generated-issues/`).
    pub output_dir: PathBuf,

    /// Run state directory (default: `{root}/.loom/`).
    pub state_dir: PathBuf,
}

impl ProjectContext {
    /// Resolve the context from command-line overrides.
    ///
    /// Relative `config` and `schema` paths are taken relative to the current
    /// working directory, like any other path argument.
    pub fn resolve(
        project_dir: Option<&Path>,
        config: Option<&Path>,
        schema: Option<&Path>,
    ) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            LoomError::UserError(format!("failed to get current working directory: {}", e))
        })?;

        let root = match project_dir {
            Some(dir) => {
                let dir = cwd.join(dir);
                if !dir.is_dir() {
                    return Err(LoomError::UserError(format!(
                        "project directory '{}' does not exist",
                        dir.display()
                    )));
                }
                dir
            }
            None => cwd.clone(),
        };

        let mut ctx = Self::for_root(root);
        if let Some(config) = config {
            ctx.config_path = cwd.join(config);
        }
        ctx.schema_path = schema.map(|s| cwd.join(s));
        Ok(ctx)
    }

    /// Context with every location at its default under `root`.
    pub fn for_root<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        Self {
            config_path: root.join(DEFAULT_CONFIG_FILE),
            schema_path: None,
            output_dir: root.join(DEFAULT_OUTPUT_DIR),
            state_dir: root.join(DEFAULT_STATE_DIR),
            root,
        }
    }

    /// Path to the NDJSON run log.
    pub fn events_file(&self) -> PathBuf {
        self.state_dir.join("events.ndjson")
    }

    /// Directory holding per-run LLM stdout/stderr logs.
    pub fn logs_dir(&self) -> PathBuf {
        self.state_dir.join("logs")
    }

    /// The schema to validate configuration with.
    pub fn schema(&self) -> Result<Schema> {
        match &self.schema_path {
            Some(path) => Schema::load(path),
            None => Ok(Schema::builtin()),
        }
    }

    /// Load the global configuration.
    ///
    /// `project.root` is filled with the absolute project root only when the
    /// file leaves it unset and `project` is a mapping; a value from the file
    /// is kept as written.
    pub fn load_config(&self) -> Result<ConfigManager> {
        let mut config = ConfigManager::load(&self.config_path, self.schema()?)?;
        let project_is_mapping = config.get("project").is_some_and(Value::is_object);
        if project_is_mapping && config.get("project.root").is_none() {
            config.set(
                "project.root",
                Value::String(self.root.display().to_string()),
            )?;
        }
        Ok(config)
    }

    /// Fail with a pointer to `loom init` when there is no configuration file.
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.config_path.exists() {
            return Err(LoomError::ConfigNotFound {
                path: self.config_path.clone(),
            });
        }
        Ok(())
    }
}
