//! Implementation of the `loom config` subcommands.

use crate::cli::{ConfigGetArgs, ConfigShowArgs};
use crate::config::{AgentConfigResolver, ConfigManager};
use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use serde_json::Value;

/// Execute `loom config get <key>`.
pub fn cmd_config_get(ctx: &ProjectContext, args: ConfigGetArgs) -> Result<()> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;
    let value = lookup_value(ctx, &config, &args.key, args.agent.as_deref())?;
    println!("{}", display_value(&value)?);
    Ok(())
}

/// Execute `loom config show`.
pub fn cmd_config_show(ctx: &ProjectContext, args: ConfigShowArgs) -> Result<()> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;
    let text = match args.agent.as_deref() {
        Some(agent) => {
            let resolved = AgentConfigResolver::new(&config, &ctx.root).resolve(agent)?;
            pretty(resolved.document())?
        }
        None => config.to_pretty_json()?,
    };
    println!("{}", text);
    Ok(())
}

/// Execute `loom config validate`.
///
/// Loading validates the global file; every agent with a local `config.json`
/// is then resolved so its merged result is validated too.
pub fn cmd_config_validate(ctx: &ProjectContext) -> Result<()> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;
    println!("{}: valid", ctx.config_path.display());

    let resolver = AgentConfigResolver::new(&config, &ctx.root);
    for agent in resolver.list_agents()? {
        let resolved = resolver.resolve(&agent)?;
        if let Some(path) = resolved.local_path() {
            println!("{}: valid (agent '{}')", path.display(), agent);
        }
    }
    Ok(())
}

pub(crate) fn lookup_value(
    ctx: &ProjectContext,
    config: &ConfigManager,
    key: &str,
    agent: Option<&str>,
) -> Result<Value> {
    let found = match agent {
        Some(agent) => AgentConfigResolver::new(config, &ctx.root)
            .resolve(agent)?
            .get(key)
            .cloned(),
        None => config.get(key).cloned(),
    };
    found.ok_or_else(|| LoomError::UserError(format!("configuration key '{}' is not set", key)))
}

/// Strings print raw; everything else as pretty JSON.
pub(crate) fn display_value(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => pretty(other),
    }
}

fn pretty(value: &Value) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| LoomError::UserError(format!("failed to serialize configuration: {}", e)))
}
