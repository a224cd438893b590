//! CLI argument parsing for loom.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::LlmProvider;
use crate::prompt::FeatureKind;
use clap::{Args, Parser, Subcommand, builder::PossibleValuesParser};
use std::path::PathBuf;

/// Loom: turn one-line feature requests into implementation-ready issues.
///
/// Loads project configuration, merges per-agent overrides, renders Markdown
/// prompt templates, runs an external LLM CLI, and writes the result to
/// `generated-issues/`, optionally filing it on GitHub.
#[derive(Parser, Debug)]
#[command(name = "loom")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Options accepted by every command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Log debug output to stderr (LOOM_LOG overrides).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root (default: current directory).
    #[arg(long, global = true, value_name = "DIR")]
    pub project_dir: Option<PathBuf>,

    /// Configuration file (default: <project>/dev-automation.config.json).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Schema file replacing the built-in configuration schema.
    #[arg(long, global = true, value_name = "PATH")]
    pub schema: Option<PathBuf>,
}

/// Available commands for loom.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a starter configuration for this project.
    ///
    /// Writes dev-automation.config.json and templates/meta-prompt-template.md.
    Init(InitArgs),

    /// Generate an issue for a feature request.
    ///
    /// Renders the meta-prompt with project context, runs the configured
    /// LLM and writes the answer to generated-issues/.
    Generate(GenerateArgs),

    /// Run every agent in `agent_execution_order` for a feature request.
    Run(RunArgs),

    /// Inspect the configuration.
    Config(ConfigCommand),

    /// Agent commands.
    Agents(AgentsCommand),

    /// Check configuration and LLM tooling.
    Doctor,
}

/// Arguments for the `init` command.
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Project name.
    #[arg(long)]
    pub name: Option<String>,

    /// What the project is and does.
    #[arg(long)]
    pub context: Option<String>,

    /// Languages, frameworks and infrastructure.
    #[arg(long)]
    pub tech_stack: Option<String>,

    /// Architecture overview.
    #[arg(long)]
    pub architecture: Option<String>,

    /// Who uses the project.
    #[arg(long)]
    pub target_users: Option<String>,

    /// Constraints every feature must respect.
    #[arg(long)]
    pub constraints: Option<String>,

    /// GitHub repository owner.
    #[arg(long)]
    pub repo_owner: Option<String>,

    /// GitHub repository name.
    #[arg(long)]
    pub repo_name: Option<String>,

    /// Default LLM provider.
    #[arg(long, value_parser = provider_parser())]
    pub provider: Option<String>,

    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the `generate` command.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Feature category adding `templates.<kind>_feature` context.
    #[arg(long, value_enum)]
    pub template: Option<FeatureKind>,

    /// LLM provider for this run.
    #[arg(long, value_parser = provider_parser())]
    pub provider: Option<String>,

    /// Resolve configuration for this agent (agents/<NAME>/config.json).
    #[arg(long, value_name = "NAME")]
    pub agent: Option<String>,

    /// Print the rendered prompt instead of calling the LLM.
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when the template has placeholders without a value.
    #[arg(long)]
    pub strict: bool,

    /// Feature description.
    #[arg(required = true, num_args = 1..)]
    pub feature: Vec<String>,
}

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// LLM provider forced for every agent.
    #[arg(long, value_parser = provider_parser())]
    pub provider: Option<String>,

    /// Print each rendered prompt instead of calling the LLM.
    #[arg(long)]
    pub dry_run: bool,

    /// Fail when a template has placeholders without a value.
    #[arg(long)]
    pub strict: bool,

    /// Feature description.
    #[arg(required = true, num_args = 1..)]
    pub feature: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the value at a dotted key (e.g. llm_settings.default_provider).
    Get(ConfigGetArgs),

    /// Print the whole configuration as JSON.
    Show(ConfigShowArgs),

    /// Validate the configuration and every agent-local override.
    Validate,
}

#[derive(Args, Debug)]
pub struct ConfigGetArgs {
    pub key: String,

    /// Read from this agent's merged configuration.
    #[arg(long, value_name = "NAME")]
    pub agent: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Show this agent's merged configuration.
    #[arg(long, value_name = "NAME")]
    pub agent: Option<String>,
}

#[derive(Args, Debug)]
pub struct AgentsCommand {
    #[command(subcommand)]
    pub action: AgentsAction,
}

#[derive(Subcommand, Debug)]
pub enum AgentsAction {
    /// List agents with a local config.json and the configured run order.
    List,
}

fn provider_parser() -> PossibleValuesParser {
    PossibleValuesParser::new(LlmProvider::ALL.map(|p| p.as_str()))
}

/// Parse a provider name already checked by clap.
pub fn parse_provider(name: Option<&str>) -> Option<LlmProvider> {
    name.and_then(LlmProvider::from_str)
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_debug_assert() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_init_minimal() {
        let cli = Cli::try_parse_from(["loom", "init"]).unwrap();
        if let Command::Init(args) = cli.command {
            assert!(args.name.is_none());
            assert!(!args.force);
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn parse_init_full() {
        let cli = Cli::try_parse_from([
            "loom",
            "init",
            "--name",
            "hub",
            "--tech-stack",
            "Rust",
            "--target-users",
            "organizers",
            "--repo-owner",
            "acme",
            "--provider",
            "claude-code",
            "--force",
        ])
        .unwrap();
        if let Command::Init(args) = cli.command {
            assert_eq!(args.name.as_deref(), Some("hub"));
            assert_eq!(args.tech_stack.as_deref(), Some("Rust"));
            assert_eq!(args.target_users.as_deref(), Some("organizers"));
            assert_eq!(args.repo_owner.as_deref(), Some("acme"));
            assert_eq!(
                parse_provider(args.provider.as_deref()),
                Some(LlmProvider::ClaudeCode)
            );
            assert!(args.force);
        } else {
            panic!("Expected Init command");
        }
    }

    #[test]
    fn parse_generate_joins_feature_words() {
        let cli = Cli::try_parse_from([
            "loom",
            "generate",
            "--template",
            "ui",
            "add",
            "real-time",
            "dashboard",
        ])
        .unwrap();
        if let Command::Generate(args) = cli.command {
            assert_eq!(args.template, Some(FeatureKind::Ui));
            assert_eq!(args.feature, vec!["add", "real-time", "dashboard"]);
            assert!(!args.dry_run);
            assert!(!args.strict);
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn parse_generate_flags() {
        let cli = Cli::try_parse_from([
            "loom",
            "generate",
            "--provider",
            "openai",
            "--agent",
            "issue-generator",
            "--dry-run",
            "--strict",
            "dark mode",
        ])
        .unwrap();
        if let Command::Generate(args) = cli.command {
            assert_eq!(args.provider.as_deref(), Some("openai"));
            assert_eq!(args.agent.as_deref(), Some("issue-generator"));
            assert!(args.dry_run);
            assert!(args.strict);
        } else {
            panic!("Expected Generate command");
        }
    }

    #[test]
    fn parse_generate_requires_feature() {
        assert!(Cli::try_parse_from(["loom", "generate"]).is_err());
    }

    #[test]
    fn parse_generate_rejects_unknown_template_and_provider() {
        assert!(Cli::try_parse_from(["loom", "generate", "--template", "mobile", "x"]).is_err());
        assert!(Cli::try_parse_from(["loom", "generate", "--provider", "mistral", "x"]).is_err());
    }

    #[test]
    fn parse_run() {
        let cli = Cli::try_parse_from(["loom", "run", "--dry-run", "dark", "mode"]).unwrap();
        if let Command::Run(args) = cli.command {
            assert!(args.dry_run);
            assert_eq!(args.feature, vec!["dark", "mode"]);
        } else {
            panic!("Expected Run command");
        }
    }

    #[test]
    fn parse_config_get_with_agent() {
        let cli = Cli::try_parse_from([
            "loom",
            "config",
            "get",
            "llm.model",
            "--agent",
            "writer",
        ])
        .unwrap();
        match cli.command {
            Command::Config(ConfigCommand {
                action: ConfigAction::Get(args),
            }) => {
                assert_eq!(args.key, "llm.model");
                assert_eq!(args.agent.as_deref(), Some("writer"));
            }
            other => panic!("Expected config get, got {:?}", other),
        }
    }

    #[test]
    fn parse_config_show_and_validate() {
        let cli = Cli::try_parse_from(["loom", "config", "show"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand {
                action: ConfigAction::Show(_)
            })
        ));

        let cli = Cli::try_parse_from(["loom", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand {
                action: ConfigAction::Validate
            })
        ));
    }

    #[test]
    fn parse_agents_list_and_doctor() {
        let cli = Cli::try_parse_from(["loom", "agents", "list"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Agents(AgentsCommand {
                action: AgentsAction::List
            })
        ));

        let cli = Cli::try_parse_from(["loom", "doctor"]).unwrap();
        assert!(matches!(cli.command, Command::Doctor));
    }

    #[test]
    fn parse_global_args_anywhere() {
        let cli = Cli::try_parse_from([
            "loom",
            "-v",
            "--project-dir",
            "/work/hub",
            "config",
            "show",
            "--config",
            "alt.yaml",
            "--schema",
            "schema.json",
        ])
        .unwrap();

        assert!(cli.global.verbose);
        assert_eq!(cli.global.project_dir, Some(PathBuf::from("/work/hub")));
        assert_eq!(cli.global.config, Some(PathBuf::from("alt.yaml")));
        assert_eq!(cli.global.schema, Some(PathBuf::from("schema.json")));
    }
}
