//! Implementation of the `loom run` command.
//!
//! Runs every agent in `agent_execution_order` and writes the last agent's
//! output as the issue file.

use super::feature_text;
use crate::cli::{RunArgs, parse_provider};
use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use crate::llm::extract_issue;
use crate::output::write_issue;
use crate::pipeline::{PipelineOptions, run_pipeline};
use crate::template::RenderMode;
use chrono::Local;

/// Execute the `loom run` command.
pub fn cmd_run(ctx: &ProjectContext, args: RunArgs) -> Result<()> {
    let feature = feature_text(&args.feature)?;
    let options = PipelineOptions {
        dry_run: args.dry_run,
        mode: if args.strict {
            RenderMode::Strict
        } else {
            RenderMode::Passthrough
        },
        provider: parse_provider(args.provider.as_deref()),
    };

    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;
    let outcome = run_pipeline(ctx, &config, &feature, &options)?;

    if options.dry_run {
        for step in &outcome.steps {
            println!("=== PROMPT: {} (DRY RUN) ===", step.agent);
            println!("{}", step.prompt);
            println!();
        }
        return Ok(());
    }

    for step in &outcome.steps {
        println!(
            "  {} finished in {:.1}s",
            step.agent,
            step.duration.as_secs_f64()
        );
    }

    let output = outcome
        .final_output()
        .ok_or_else(|| LoomError::UserError("pipeline produced no output".to_string()))?;
    let path = write_issue(&ctx.output_dir, &feature, &extract_issue(output), Local::now())?;
    println!("Issue written to {}", path.display());

    Ok(())
}
