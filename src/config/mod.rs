//! Hierarchical configuration for loom.
//!
//! - **Schema**: structural validation (`required`, `type`, `enum`)
//! - **Merge**: recursive deep merge of configuration trees
//! - **Manager**: the global `dev-automation.config.json` document
//! - **Resolver**: per-agent `config.json` overrides merged over the global config
//! - **Types**: typed views of the well-known sections

mod lookup;
mod manager;
mod merge;
mod resolver;
mod schema;
pub mod types;


// Re-export public API
pub use lookup::lookup;
pub use manager::{ConfigManager, DEFAULT_CONFIG_FILE};
pub use merge::deep_merge;
pub use resolver::{AGENT_CONFIG_FILE, AgentConfig, AgentConfigResolver, DEFAULT_AGENTS_DIR};
pub use schema::{Schema, SchemaViolation, ViolationKind, validate};
pub use types::{
    AutomationSettings, GithubSettings, LlmProvider, LlmSettings, ProjectSettings,
    TemplateSettings, section,
};
