//! Implementation of the `loom generate` command.
//!
//! Renders the meta-prompt for one feature request, sends it to the
//! configured LLM CLI, and writes the cleaned result to `generated-issues/`.
//! When `automation.auto_create_issues` is set the file is also filed with `gh`.

use super::feature_text;
use crate::cli::{GenerateArgs, parse_provider};
use crate::config::{
    AgentConfigResolver, AutomationSettings, GithubSettings, LlmProvider, TemplateSettings,
    section,
};
use crate::context::ProjectContext;
use crate::error::Result;
use crate::events::{self, Event, EventAction};
use crate::github::{IssueRequest, manual_command};
use crate::llm::{extract_issue, extract_title, invoke_recorded, resolve_llm};
use crate::output::write_issue;
use crate::prompt::{FeatureKind, IssueContext};
use crate::template::{DEFAULT_TEMPLATE, RenderMode, TemplateStore, render_with, unresolved};
use chrono::Local;
use serde_json::{Value, json};
use std::path::PathBuf;

/// Options for one generation, independent of clap.
#[derive(Debug, Clone, Default)]
pub(crate) struct GenerateRequest {
    pub feature: String,
    pub kind: Option<FeatureKind>,
    pub provider: Option<LlmProvider>,
    pub agent: Option<String>,
    pub dry_run: bool,
    pub mode: RenderMode,
}

/// What a generation produced.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Generated {
    /// Dry run: the prompt that would have been sent.
    Prompt(String),
    Issue(IssueFile),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct IssueFile {
    pub path: PathBuf,
    pub title: String,
    /// `owner/name` when the `github` section names a repository.
    pub repo: Option<String>,
    /// URL of the issue created on GitHub, if any.
    pub url: Option<String>,
}

/// Execute the `loom generate` command.
pub fn cmd_generate(ctx: &ProjectContext, args: GenerateArgs) -> Result<()> {
    let request = GenerateRequest {
        feature: feature_text(&args.feature)?,
        kind: args.template,
        provider: parse_provider(args.provider.as_deref()),
        agent: args.agent,
        dry_run: args.dry_run,
        mode: if args.strict {
            RenderMode::Strict
        } else {
            RenderMode::Passthrough
        },
    };

    match generate(ctx, &request)? {
        Generated::Prompt(prompt) => {
            println!("=== GENERATED PROMPT (DRY RUN) ===");
            println!("{}", prompt);
        }
        Generated::Issue(issue) => {
            println!("Issue written to {}", issue.path.display());
            println!("Title: {}", issue.title);
            if let Some(repo) = &issue.repo {
                println!();
                println!("To file it on GitHub:");
                println!("  {}", manual_command(repo, &issue.path));
            }
            if let Some(url) = &issue.url {
                println!("Created GitHub issue: {}", url);
            }
        }
    }

    Ok(())
}

pub(crate) fn generate(ctx: &ProjectContext, request: &GenerateRequest) -> Result<Generated> {
    ctx.ensure_initialized()?;
    let config = ctx.load_config()?;

    let agent_config = match request.agent.as_deref() {
        Some(agent) => Some(AgentConfigResolver::new(&config, &ctx.root).resolve(agent)?),
        None => None,
    };
    let document: &Value = match &agent_config {
        Some(agent) => agent.document(),
        None => config.document(),
    };

    let templates: TemplateSettings = section(document, "templates")?;
    let template = TemplateStore::new(&ctx.root, &templates).load(DEFAULT_TEMPLATE)?;
    tracing::debug!(source = ?template.source, "loaded meta-prompt template");

    let variables =
        IssueContext::from_config(document, &request.feature, request.kind)?.to_variables();
    let missing = unresolved(&template.text, &variables);
    if !missing.is_empty() && request.mode == RenderMode::Passthrough {
        tracing::warn!(placeholders = ?missing, "template placeholders left unresolved");
    }
    let prompt = render_with(&template.text, &variables, request.mode)?;

    if request.dry_run {
        return Ok(Generated::Prompt(prompt));
    }

    let llm = resolve_llm(document, request.provider)?;
    let now = Local::now();
    let run_dir = ctx
        .logs_dir()
        .join(format!("{}_generate", now.format("%Y%m%d_%H%M%S")));
    let raw = invoke_recorded(ctx, request.agent.as_deref(), &llm, &prompt, &run_dir)?;

    let issue = extract_issue(&raw);
    let path = write_issue(&ctx.output_dir, &request.feature, &issue, now)?;
    let title = extract_title(&issue).unwrap_or_else(|| request.feature.clone());

    let github: GithubSettings = section(document, "github")?;
    let automation: AutomationSettings = section(document, "automation")?;
    let url = if automation.auto_create_issues {
        create_issue(ctx, &github, &title, &path)
    } else {
        None
    };

    let mut event = Event::new(EventAction::Generate).with_details(json!({
        "feature": request.feature,
        "provider": llm.provider.as_str(),
        "path": path.display().to_string(),
        "issue_url": url,
    }));
    if let Some(agent) = &request.agent {
        event = event.with_agent(agent.clone());
    }
    events::record(ctx, event);

    Ok(Generated::Issue(IssueFile {
        path,
        title,
        repo: github.repo_slug(),
        url,
    }))
}

/// File the issue on GitHub. Failure leaves the local file as the result.
fn create_issue(
    ctx: &ProjectContext,
    github: &GithubSettings,
    title: &str,
    path: &std::path::Path,
) -> Option<String> {
    let created = IssueRequest::from_settings(github, title, path).and_then(|r| r.create(&ctx.root));
    match created {
        Ok(created) => {
            events::record(
                ctx,
                Event::new(EventAction::IssueCreate).with_details(json!({
                    "title": title,
                    "url": created.url,
                    "body_file": path.display().to_string(),
                })),
            );
            created.url
        }
        Err(e) => {
            tracing::warn!(error = %e, "GitHub issue creation failed");
            eprintln!("Warning: could not create GitHub issue: {}", e);
            None
        }
    }
}
