//! Implementation of the `loom agents list` command.

use crate::config::AgentConfigResolver;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::pipeline::EXECUTION_ORDER_KEY;

/// Execute `loom agents list`.
pub fn cmd_agents_list(ctx: &ProjectContext) -> Result<()> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;
    let resolver = AgentConfigResolver::new(&config, &ctx.root);

    let agents = resolver.list_agents()?;
    if agents.is_empty() {
        println!(
            "No agents with a local config in {}",
            resolver.agents_dir().display()
        );
    } else {
        println!("Agents ({}):", agents.len());
        for agent in &agents {
            println!("  {}", agent);
        }
    }

    let order: Vec<String> = config.get_as(EXECUTION_ORDER_KEY)?.unwrap_or_default();
    println!();
    if order.is_empty() {
        println!("Execution order: (not set)");
    } else {
        println!("Execution order: {}", order.join(" -> "));
    }
    Ok(())
}
