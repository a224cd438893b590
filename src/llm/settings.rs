//! LLM settings resolution.
//!
//! Precedence, lowest to highest: built-in defaults, global `llm_settings`,
//! the agent's `llm` section, then command-line flags.

use crate::config::{LlmProvider, LlmSettings, section};
use crate::error::{LoomError, Result};
use crate::template::{render, vars};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Temperature used when nothing is configured.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Token limit used when nothing is configured.
pub const DEFAULT_MAX_TOKENS: u64 = 8192;

/// Seconds an LLM call may run before it is killed.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 600;

/// Per-agent `llm` overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentLlmOverrides {
    pub provider: Option<LlmProvider>,
    pub model: Option<String>,
    pub temperature: Option<f64>,
    pub max_tokens: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

/// Fully resolved settings for one LLM call.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLlm {
    pub provider: LlmProvider,
    pub model: Option<String>,
    pub temperature: f64,
    pub max_tokens: u64,
    pub timeout_seconds: u64,
    /// Program and arguments; the prompt goes to stdin.
    pub command: Vec<String>,
}

impl ResolvedLlm {
    /// The command as a single display string.
    pub fn command_line(&self) -> String {
        shell_words::join(&self.command)
    }
}

/// Resolve LLM settings from a (possibly agent-merged) configuration document.
///
/// A configured `llm_settings.providers.<name>.command` may reference
/// `{{ model }}`, `{{ temperature }}` and `{{ max_tokens }}`.
pub fn resolve_llm(document: &Value, provider_flag: Option<LlmProvider>) -> Result<ResolvedLlm> {
    let global: LlmSettings = section(document, "llm_settings")?;
    let agent: AgentLlmOverrides = section(document, "llm")?;

    let provider = provider_flag
        .or(agent.provider)
        .unwrap_or(global.default_provider);
    let model = agent.model.or(global.model);
    let temperature = agent
        .temperature
        .or(global.temperature)
        .unwrap_or(DEFAULT_TEMPERATURE);
    let max_tokens = agent
        .max_tokens
        .or(global.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);
    let timeout_seconds = agent
        .timeout_seconds
        .or(global.timeout_seconds)
        .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

    let command = match global.providers.get(provider.as_str()) {
        Some(configured) => {
            let values = vars([
                ("model", model.clone().unwrap_or_default()),
                ("temperature", temperature.to_string()),
                ("max_tokens", max_tokens.to_string()),
            ]);
            let rendered = render(&configured.command, &values);
            let args = shell_words::split(&rendered).map_err(|e| {
                LoomError::UserError(format!(
                    "failed to parse command for provider '{}': '{}': {}\n\
                     Fix: check for unmatched quotes in llm_settings.providers.{}.command",
                    provider, rendered, e, provider
                ))
            })?;
            if args.is_empty() {
                return Err(LoomError::UserError(format!(
                    "command for provider '{}' is empty",
                    provider
                )));
            }
            args
        }
        None => vec![provider.default_program()],
    };

    Ok(ResolvedLlm {
        provider,
        model,
        temperature,
        max_tokens,
        timeout_seconds,
        command,
    })
}
