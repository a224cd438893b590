//! Error types for the loom CLI.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Configuration failures come in three distinct kinds (not found, parse,
//! validation) so callers can tell a missing file from a broken one.

use crate::config::SchemaViolation;
use crate::exit_codes;
use crate::template::TemplateError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for loom operations.
#[derive(Error, Debug)]
pub enum LoomError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    /// The configuration file exists but is not well-formed structured data.
    #[error("{}", parse_message(.path, .agent.as_deref(), .message))]
    ConfigParse {
        path: PathBuf,
        /// Set when the file is an agent-local override.
        agent: Option<String>,
        message: String,
    },

    /// The configuration is well-formed but violates the schema.
    #[error("configuration validation failed for {source_label}: {violation}")]
    ConfigValidation {
        /// Where the document came from (file path or `agent '<name>'`).
        source_label: String,
        violation: SchemaViolation,
    },

    /// No template file with the given name exists in any searched directory.
    #[error("template '{name}' not found (searched: {})", format_searched(.searched))]
    TemplateNotFound { name: String, searched: Vec<PathBuf> },

    /// Rendering failed in strict mode.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// The external LLM command could not be run or failed.
    #[error("LLM invocation failed: {0}")]
    Llm(String),

    /// User provided invalid arguments or the system is in an invalid state.
    #[error("{0}")]
    UserError(String),
}

impl LoomError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoomError::ConfigNotFound { .. }
            | LoomError::ConfigParse { .. }
            | LoomError::ConfigValidation { .. } => exit_codes::CONFIG_FAILURE,
            LoomError::TemplateNotFound { .. } | LoomError::Template(_) => {
                exit_codes::TEMPLATE_FAILURE
            }
            LoomError::Llm(_) => exit_codes::LLM_FAILURE,
            LoomError::UserError(_) => exit_codes::USER_ERROR,
        }
    }

    /// Build a `UserError` for a failed filesystem operation on `path`.
    pub fn io(action: &str, path: &Path, err: std::io::Error) -> Self {
        LoomError::UserError(format!("failed to {} '{}': {}", action, path.display(), err))
    }
}

fn parse_message(path: &Path, agent: Option<&str>, message: &str) -> String {
    match agent {
        Some(agent) => format!(
            "malformed config for agent '{}' in '{}': {}",
            agent,
            path.display(),
            message
        ),
        None => format!(
            "malformed configuration file '{}': {}",
            path.display(),
            message
        ),
    }
}

fn format_searched(searched: &[PathBuf]) -> String {
    if searched.is_empty() {
        return "no directories".to_string();
    }
    searched
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for loom operations.
pub type Result<T> = std::result::Result<T, LoomError>;
