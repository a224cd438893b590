//! Per-agent configuration resolution.
//!
//! Each agent may ship a `config.json` inside `<agents dir>/<agent>/`. When it
//! exists it is deep-merged over a copy of the global configuration; when it
//! does not the global configuration is used as-is. Results are computed per
//! call and never written back to the global document.

use super::lookup::lookup;
use super::manager::{ConfigManager, read_document};
use super::merge::deep_merge;
use crate::error::{LoomError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File name of an agent-local configuration override.
pub const AGENT_CONFIG_FILE: &str = "config.json";

/// Agents directory used when `agents.directory` is not configured.
pub const DEFAULT_AGENTS_DIR: &str = "agents";

/// Resolves merged configurations for named agents.
#[derive(Debug, Clone)]
pub struct AgentConfigResolver<'a> {
    global: &'a ConfigManager,
    agents_dir: PathBuf,
}

impl<'a> AgentConfigResolver<'a> {
    /// Create a resolver whose agents directory comes from `agents.directory`
    /// (default `agents`), relative to `project_root`.
    pub fn new(global: &'a ConfigManager, project_root: &Path) -> Self {
        let dir = global
            .get_str("agents.directory")
            .unwrap_or(DEFAULT_AGENTS_DIR);
        Self::with_agents_dir(global, project_root.join(dir))
    }

    /// Create a resolver with an explicit agents directory.
    pub fn with_agents_dir(global: &'a ConfigManager, agents_dir: PathBuf) -> Self {
        Self { global, agents_dir }
    }

    /// Directory that holds one subdirectory per agent.
    pub fn agents_dir(&self) -> &Path {
        &self.agents_dir
    }

    /// Expected location of `agent`'s local configuration file.
    pub fn agent_config_path(&self, agent: &str) -> PathBuf {
        self.agents_dir.join(agent).join(AGENT_CONFIG_FILE)
    }

    /// Resolve the merged configuration for `agent`.
    ///
    /// A missing local file is the common case and yields the global document
    /// unchanged. A malformed local file is a `ConfigParse` error carrying the
    /// agent name and path; no partially merged result is returned.
    pub fn resolve(&self, agent: &str) -> Result<AgentConfig> {
        validate_agent_name(agent)?;

        let path = self.agent_config_path(agent);
        if !path.exists() {
            tracing::debug!(agent, "no agent-local config, using global configuration");
            return Ok(AgentConfig {
                name: agent.to_string(),
                document: self.global.document().clone(),
                local_path: None,
            });
        }

        let overlay = read_document(&path, Some(agent))?;
        if !overlay.is_object() {
            return Err(LoomError::ConfigParse {
                path,
                agent: Some(agent.to_string()),
                message: "agent configuration must be a JSON object".to_string(),
            });
        }

        let merged = deep_merge(self.global.document(), &overlay);
        self.global
            .schema()
            .validate(&merged)
            .map_err(|violation| LoomError::ConfigValidation {
                source_label: format!("agent '{}' ('{}')", agent, path.display()),
                violation,
            })?;

        tracing::debug!(agent, path = %path.display(), "merged agent-local config");

        Ok(AgentConfig {
            name: agent.to_string(),
            document: merged,
            local_path: Some(path),
        })
    }

    /// Names of agents that have a local `config.json`, sorted.
    ///
    /// A missing agents directory yields an empty list.
    pub fn list_agents(&self) -> Result<Vec<String>> {
        if !self.agents_dir.is_dir() {
            return Ok(Vec::new());
        }

        let entries = std::fs::read_dir(&self.agents_dir)
            .map_err(|e| LoomError::io("read agents directory", &self.agents_dir, e))?;

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().join(AGENT_CONFIG_FILE).is_file())
            .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
            .collect();
        names.sort();
        Ok(names)
    }
}

fn validate_agent_name(agent: &str) -> Result<()> {
    let invalid = agent.is_empty()
        || agent == "."
        || agent == ".."
        || agent.contains('/')
        || agent.contains('\\');
    if invalid {
        return Err(LoomError::UserError(format!(
            "invalid agent name '{}': must be a single directory name",
            agent
        )));
    }
    Ok(())
}

/// A merged configuration for one agent.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    name: String,
    document: Value,
    local_path: Option<PathBuf>,
}

impl AgentConfig {
    /// The agent this configuration was resolved for.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up a dotted key in the merged document.
    pub fn get(&self, key: &str) -> Option<&Value> {
        lookup(&self.document, key)
    }

    /// Look up a dotted key that holds a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Deserialize the sub-tree at `key` into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        self.get(key)
            .map(|value| {
                serde_json::from_value(value.clone()).map_err(|e| {
                    LoomError::UserError(format!(
                        "key '{}' in config for agent '{}' has an unexpected shape: {}",
                        key, self.name, e
                    ))
                })
            })
            .transpose()
    }

    /// The merged document.
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Path of the agent-local file that was merged, if one existed.
    pub fn local_path(&self) -> Option<&Path> {
        self.local_path.as_deref()
    }

    /// Whether an agent-local file contributed to this configuration.
    pub fn has_local_overrides(&self) -> bool {
        self.local_path.is_some()
    }
}
