//! External LLM CLI invocation.
//!
//! - **Settings**: provider, model and limits resolved across config layers
//! - **Executor**: subprocess with stdin prompt, log capture and timeout
//! - **Extract**: turning raw model output into an issue document

mod executor;
mod extract;
mod settings;

pub use executor::{LlmRun, execute, invoke, invoke_recorded};
pub use extract::{FALLBACK_HEADING, FEATURE_MARKER, extract_issue, extract_title};
pub use settings::{
    AgentLlmOverrides, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECONDS,
    ResolvedLlm, resolve_llm,
};
