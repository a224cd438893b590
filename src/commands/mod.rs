//! Command implementations for loom.
//!
//! This module routes parsed CLI commands to their handlers. Every handler
//! receives an already-resolved [`ProjectContext`].

mod agents;
mod config_cmd;
mod doctor;
mod generate;
mod init;
mod run;

#[cfg(test)]
mod tests;

use crate::cli::{AgentsAction, Command, ConfigAction, GlobalArgs};
use crate::context::ProjectContext;
use crate::error::Result;

/// Dispatch a command to its implementation.
pub fn dispatch(global: &GlobalArgs, command: Command) -> Result<()> {
    let ctx = ProjectContext::resolve(
        global.project_dir.as_deref(),
        global.config.as_deref(),
        global.schema.as_deref(),
    )?;
    tracing::debug!(root = %ctx.root.display(), config = %ctx.config_path.display(), "resolved project");

    match command {
        Command::Init(args) => init::cmd_init(&ctx, args),
        Command::Generate(args) => generate::cmd_generate(&ctx, args),
        Command::Run(args) => run::cmd_run(&ctx, args),
        Command::Config(config_cmd) => match config_cmd.action {
            ConfigAction::Get(args) => config_cmd::cmd_config_get(&ctx, args),
            ConfigAction::Show(args) => config_cmd::cmd_config_show(&ctx, args),
            ConfigAction::Validate => config_cmd::cmd_config_validate(&ctx),
        },
        Command::Agents(agents_cmd) => match agents_cmd.action {
            AgentsAction::List => agents::cmd_agents_list(&ctx),
        },
        Command::Doctor => doctor::cmd_doctor(&ctx),
    }
}

/// Join positional feature words into one description.
fn feature_text(words: &[String]) -> Result<String> {
    let text = words.join(" ").trim().to_string();
    if text.is_empty() {
        return Err(crate::error::LoomError::UserError(
            "feature description is empty".to_string(),
        ));
    }
    Ok(text)
}
