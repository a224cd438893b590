//! Sequential agent pipeline.
//!
//! Agents run one after another in `agent_execution_order`. Each one gets its
//! merged configuration, renders its own template with the feature text and
//! everything earlier agents stored, and hands the prompt to its LLM.

use super::context_store::{ContextStore, result_key};
use crate::config::{AgentConfigResolver, ConfigManager, LlmProvider};
use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use crate::events::{self, Event, EventAction};
use crate::llm::{invoke_recorded, resolve_llm};
use crate::prompt::IssueContext;
use crate::template::{RenderMode, load_file, render_with, unresolved};
use chrono::Local;
use serde_json::json;
use std::time::{Duration, Instant};

/// Configuration key listing agents in run order.
pub const EXECUTION_ORDER_KEY: &str = "agent_execution_order";

/// Template file used when an agent sets no `template` key.
pub const DEFAULT_AGENT_TEMPLATE: &str = "template.md";

/// Pipeline run options.
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    /// Render prompts without calling any LLM.
    pub dry_run: bool,
    pub mode: RenderMode,
    /// Provider forced for every agent.
    pub provider: Option<LlmProvider>,
}

/// What one agent did.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub agent: String,
    pub prompt: String,
    /// `None` in dry-run mode.
    pub output: Option<String>,
    pub duration: Duration,
}

/// Result of a whole pipeline run.
#[derive(Debug, Clone, Default)]
pub struct PipelineOutcome {
    pub steps: Vec<StepOutcome>,
    pub context: ContextStore,
}

impl PipelineOutcome {
    /// Output of the last agent that produced one.
    pub fn final_output(&self) -> Option<&str> {
        self.steps.iter().rev().find_map(|s| s.output.as_deref())
    }
}

/// The configured agent order.
///
/// A missing or empty list is an error: the run order must be explicit.
pub fn execution_order(config: &ConfigManager) -> Result<Vec<String>> {
    let order: Vec<String> = config.get_as(EXECUTION_ORDER_KEY)?.ok_or_else(|| {
        LoomError::UserError(format!(
            "'{}' is not set in the configuration\n\
             Fix: list the agents to run, e.g. \"{}\": [\"issue-generator\"]",
            EXECUTION_ORDER_KEY, EXECUTION_ORDER_KEY
        ))
    })?;

    if order.is_empty() {
        return Err(LoomError::UserError(format!(
            "'{}' is empty; nothing to run",
            EXECUTION_ORDER_KEY
        )));
    }
    Ok(order)
}

/// Run every agent in order for `feature`.
///
/// Stops at the first failing agent; no partial result is returned.
pub fn run_pipeline(
    ctx: &ProjectContext,
    config: &ConfigManager,
    feature: &str,
    options: &PipelineOptions,
) -> Result<PipelineOutcome> {
    let order = execution_order(config)?;
    let resolver = AgentConfigResolver::new(config, &ctx.root);
    let run_id = Local::now().format("%Y%m%d_%H%M%S").to_string();

    tracing::info!(agents = order.len(), "starting agent pipeline");

    let mut outcome = PipelineOutcome::default();
    for (index, agent) in order.iter().enumerate() {
        tracing::info!(agent = %agent, step = index + 1, of = order.len(), "running agent");
        let start = Instant::now();

        let agent_config = resolver.resolve(agent)?;
        let template_name = agent_config
            .get_str("template")
            .unwrap_or(DEFAULT_AGENT_TEMPLATE);
        validate_template_name(agent, template_name)?;
        let template = load_file(&resolver.agents_dir().join(agent).join(template_name))?;

        let mut values =
            IssueContext::from_config_lenient(agent_config.document(), feature)?.to_variables();
        values.extend(outcome.context.to_variables());

        if options.mode == RenderMode::Passthrough {
            let missing = unresolved(&template.text, &values);
            if !missing.is_empty() {
                tracing::warn!(agent = %agent, placeholders = ?missing, "template has unresolved placeholders");
            }
        }
        let prompt = render_with(&template.text, &values, options.mode)?;

        let output = if options.dry_run {
            None
        } else {
            let llm = resolve_llm(agent_config.document(), options.provider)?;
            let run_dir = ctx
                .logs_dir()
                .join(format!("{}_{:02}_{}", run_id, index + 1, agent));
            let output = invoke_recorded(ctx, Some(agent), &llm, &prompt, &run_dir)?;
            outcome.context.set(result_key(agent), output.clone());
            Some(output)
        };

        let duration = start.elapsed();
        events::record(
            ctx,
            Event::new(EventAction::PipelineStep)
                .with_agent(agent.as_str())
                .with_details(json!({
                    "step": index + 1,
                    "template": template_name,
                    "dry_run": options.dry_run,
                    "duration_ms": duration.as_millis() as u64,
                })),
        );
        tracing::info!(agent = %agent, elapsed_ms = duration.as_millis() as u64, "agent finished");

        outcome.steps.push(StepOutcome {
            agent: agent.clone(),
            prompt,
            output,
            duration,
        });
    }

    Ok(outcome)
}

/// Agent templates must live directly inside the agent's directory.
fn validate_template_name(agent: &str, name: &str) -> Result<()> {
    let invalid = name.is_empty()
        || name == "."
        || name == ".."
        || name.contains('/')
        || name.contains('\\');
    if invalid {
        return Err(LoomError::UserError(format!(
            "invalid template '{}' for agent '{}': must be a file name inside the agent directory",
            name, agent
        )));
    }
    Ok(())
}
