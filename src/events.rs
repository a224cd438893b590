//! Run log for loom.
//!
//! Every notable step is appended to `.loom/events.ndjson` as one JSON object
//! per line:
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (init, generate, llm_invoke, ...)
//! - `actor`: `user@HOST`
//! - `agent`: the agent involved, when there is one
//! - `details`: freeform action-specific object
//!
//! The log is informational. Commands call [`record`], which downgrades a
//! failed append to a warning.

use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Project configuration created
    Init,
    /// Issue generation finished and written
    Generate,
    /// LLM process started
    LlmInvoke,
    /// LLM process finished
    LlmComplete,
    /// GitHub issue created
    IssueCreate,
    /// One agent of a pipeline run finished
    PipelineStep,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventAction::Init => "init",
            EventAction::Generate => "generate",
            EventAction::LlmInvoke => "llm_invoke",
            EventAction::LlmComplete => "llm_complete",
            EventAction::IssueCreate => "issue_create",
            EventAction::PipelineStep => "pipeline_step",
        };
        f.write_str(name)
    }
}

/// One run log record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,
    pub action: EventAction,
    pub actor: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    pub details: Value,
}

impl Event {
    /// Create an event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            agent: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| LoomError::UserError(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the run log, creating `.loom/` if needed.
pub fn append_event(ctx: &ProjectContext, event: &Event) -> Result<()> {
    let events_file = ctx.events_file();
    let json_line = event.to_ndjson_line()?;

    if !ctx.state_dir.exists() {
        fs::create_dir_all(&ctx.state_dir)
            .map_err(|e| LoomError::io("create state directory", &ctx.state_dir, e))?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| LoomError::io("open events file", &events_file, e))?;

    writeln!(file, "{}", json_line).map_err(|e| LoomError::io("write event to", &events_file, e))?;

    Ok(())
}

/// Append an event, logging a warning instead of failing.
pub fn record(ctx: &ProjectContext, event: Event) {
    if let Err(e) = append_event(ctx, &event) {
        tracing::warn!(action = %event.action, error = %e, "failed to append run log event");
    }
}

/// Read all events from the run log. A missing log is empty.
pub fn read_events(ctx: &ProjectContext) -> Result<Vec<Event>> {
    let events_file = ctx.events_file();
    if !events_file.exists() {
        return Ok(Vec::new());
    }

    let content =
        fs::read_to_string(&events_file).map_err(|e| LoomError::io("read", &events_file, e))?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                LoomError::UserError(format!(
                    "malformed event on line {} of '{}': {}",
                    i + 1,
                    events_file.display(),
                    e
                ))
            })
        })
        .collect()
}
