//! Typed views over configuration sections.
//!
//! The configuration tree stays dynamic so unknown agent sections survive;
//! these structs deserialize the well-known sections with defaults for the
//! fields a project leaves out. Unknown fields are ignored.

use super::lookup::lookup;
use crate::error::{LoomError, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// External LLM CLI family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LlmProvider {
    /// Google Gemini CLI (default).
    #[default]
    Gemini,
    /// Anthropic Claude Code CLI.
    ClaudeCode,
    /// OpenAI CLI.
    Openai,
}

impl LlmProvider {
    /// Every supported provider, in display order.
    pub const ALL: [LlmProvider; 3] = [Self::Gemini, Self::ClaudeCode, Self::Openai];

    /// Parse a provider from its configuration name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "gemini" => Some(Self::Gemini),
            "claude-code" => Some(Self::ClaudeCode),
            "openai" => Some(Self::Openai),
            _ => None,
        }
    }

    /// The configuration name of this provider.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::ClaudeCode => "claude-code",
            Self::Openai => "openai",
        }
    }

    /// Program invoked when no explicit command is configured.
    ///
    /// npm-installed shims on Windows need the `.cmd` suffix to be spawnable.
    pub fn default_program(&self) -> String {
        if cfg!(windows) && *self == Self::Gemini {
            format!("{}.cmd", self.as_str())
        } else {
            self.as_str().to_string()
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The `project` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    pub name: Option<String>,
    pub context: Option<String>,
    pub tech_stack: Option<String>,
    pub architecture: Option<String>,
    pub target_users: Option<String>,
    pub constraints: Option<String>,
    /// Absolute project root, injected at startup.
    pub root: Option<String>,
}

/// The `llm_settings` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub default_provider: LlmProvider,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub timeout_seconds: Option<u64>,
    /// Per-provider command overrides keyed by provider name.
    pub providers: BTreeMap<String, ProviderCommand>,
}

/// Command override for one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderCommand {
    /// Shell-words command line, e.g. `"claude -p"`.
    pub command: String,
}

/// The `github` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GithubSettings {
    pub repo_owner: Option<String>,
    pub repo_name: Option<String>,
    pub default_project: Option<String>,
    pub default_labels: Vec<String>,
}

impl GithubSettings {
    /// `owner/name`, when both halves are configured and non-empty.
    pub fn repo_slug(&self) -> Option<String> {
        match (self.repo_owner.as_deref(), self.repo_name.as_deref()) {
            (Some(owner), Some(name)) if !owner.is_empty() && !name.is_empty() => {
                Some(format!("{}/{}", owner, name))
            }
            _ => None,
        }
    }
}

/// The `automation` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    pub auto_create_issues: bool,
    pub auto_assign: bool,
}

/// The `templates` section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directories searched for template files, relative to the project root.
    pub directories: Vec<String>,

    /// Feature-kind context such as `ui_feature`, plus any other keys.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TemplateSettings {
    /// Extra context text configured for a feature kind (`ui`, `api`, ...).
    pub fn feature_context(&self, kind: &str) -> Option<&str> {
        self.extra
            .get(&format!("{}_feature", kind))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

/// Deserialize the section at `key`, or `T::default()` when it is absent.
pub fn section<T: DeserializeOwned + Default>(document: &Value, key: &str) -> Result<T> {
    match lookup(document, key) {
        None | Some(Value::Null) => Ok(T::default()),
        Some(value) => serde_json::from_value(value.clone()).map_err(|e| {
            LoomError::UserError(format!("configuration section '{}' is invalid: {}", key, e))
        }),
    }
}
