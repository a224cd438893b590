//! Implementation of the `loom init` command.
//!
//! Writes a starter `dev-automation.config.json` from the flags given and a
//! copy of the built-in meta-prompt to `templates/` so it can be edited.
//! Empty `project.*` values are allowed here; `generate` asks for them later.

use crate::cli::{InitArgs, parse_provider};
use crate::config::{ConfigManager, LlmProvider};
use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use crate::events::{self, Event, EventAction};
use crate::fs::atomic_write_file;
use crate::template::{BUILTIN_META_PROMPT, DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_DIR};
use serde_json::{Value, json};

/// Execute the `loom init` command.
pub fn cmd_init(ctx: &ProjectContext, args: InitArgs) -> Result<()> {
    if ctx.config_path.exists() && !args.force {
        return Err(LoomError::UserError(format!(
            "configuration already exists at '{}'\n\
             Fix: edit it directly, or re-run with --force to overwrite.",
            ctx.config_path.display()
        )));
    }

    let document = starter_config(&args);
    let config = ConfigManager::from_document(document, ctx.schema()?)?;
    config.save(&ctx.config_path)?;

    let template_path = ctx.root.join(DEFAULT_TEMPLATE_DIR).join(DEFAULT_TEMPLATE);
    let template_created = !template_path.exists();
    if template_created {
        atomic_write_file(&template_path, BUILTIN_META_PROMPT)?;
    }

    events::record(
        ctx,
        Event::new(EventAction::Init).with_details(json!({
            "config": ctx.config_path.display().to_string(),
            "template_created": template_created,
            "overwritten": args.force,
        })),
    );

    println!("Configuration created at {}", ctx.config_path.display());
    if template_created {
        println!("Meta-prompt template created at {}", template_path.display());
    }
    println!();
    println!("Edit the configuration to describe your project, then run:");
    println!("  loom generate \"<feature description>\"");

    Ok(())
}

/// The configuration document written by `init`.
pub(crate) fn starter_config(args: &InitArgs) -> Value {
    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    let provider = parse_provider(args.provider.as_deref()).unwrap_or(LlmProvider::Gemini);

    json!({
        "project": {
            "name": text(&args.name),
            "context": text(&args.context),
            "tech_stack": text(&args.tech_stack),
            "architecture": text(&args.architecture),
            "target_users": text(&args.target_users),
            "constraints": text(&args.constraints)
        },
        "github": {
            "repo_owner": text(&args.repo_owner),
            "repo_name": text(&args.repo_name),
            "default_project": "",
            "default_labels": ["auto-generated", "needs-review"]
        },
        "llm_settings": {
            "default_provider": provider.as_str(),
            "temperature": 0.7
        },
        "templates": {
            "directories": [DEFAULT_TEMPLATE_DIR]
        },
        "automation": {
            "auto_create_issues": false,
            "auto_assign": false
        }
    })
}
