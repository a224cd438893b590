//! Implementation of the `loom doctor` command.
//!
//! Read-only checks of the project setup:
//! - Global configuration exists and passes the schema
//! - Every agent-local `config.json` merges into a valid configuration
//! - The meta-prompt template is found (or the built-in one is used)
//! - Each provider's program is on `PATH`; the default one must be
//! - `gh` is on `PATH` when issues are created automatically

use crate::config::{
    AgentConfigResolver, AutomationSettings, ConfigManager, LlmProvider, LlmSettings,
    TemplateSettings, section,
};
use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use crate::github::GH_PROGRAM;
use crate::llm::resolve_llm;
use crate::template::{DEFAULT_TEMPLATE, TemplateStore};
use std::fmt;
use std::path::PathBuf;

/// Severity level for issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Warning,
    Error,
}

impl fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSeverity::Warning => write!(f, "WARNING"),
            IssueSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// A detected problem with a recommended fix.
#[derive(Debug, Clone)]
pub struct Issue {
    pub severity: IssueSeverity,
    pub category: String,
    pub description: String,
    pub remediation: Option<String>,
}

impl Issue {
    pub fn new(severity: IssueSeverity, category: &str, description: &str) -> Self {
        Self {
            severity,
            category: category.to_string(),
            description: description.to_string(),
            remediation: None,
        }
    }

    pub fn with_remediation(mut self, remediation: &str) -> Self {
        self.remediation = Some(remediation.to_string());
        self
    }
}

/// Result of the doctor checks.
#[derive(Debug, Default)]
pub struct DoctorReport {
    pub issues: Vec<Issue>,
    /// `(label, detail)` lines for checks that passed.
    pub passed: Vec<(String, String)>,
}

impl DoctorReport {
    fn pass(&mut self, label: impl Into<String>, detail: impl Into<String>) {
        self.passed.push((label.into(), detail.into()));
    }

    pub fn has_errors(&self) -> bool {
        self.issues
            .iter()
            .any(|i| i.severity == IssueSeverity::Error)
    }
}

/// Execute the `loom doctor` command.
pub fn cmd_doctor(ctx: &ProjectContext) -> Result<()> {
    let report = diagnose(ctx);
    print_report(&report);

    if report.has_errors() {
        return Err(LoomError::UserError(format!(
            "Found {} issue(s). Fix the errors and re-run `loom doctor`.",
            report.issues.len()
        )));
    }
    Ok(())
}

pub(crate) fn diagnose(ctx: &ProjectContext) -> DoctorReport {
    let mut report = DoctorReport::default();

    let config = match check_config(ctx, &mut report) {
        Some(config) => config,
        None => return report,
    };
    check_agents(ctx, &config, &mut report);
    check_template(ctx, &config, &mut report);
    check_providers(&config, &mut report);
    check_github_cli(&config, &mut report);
    report
}

fn check_config(ctx: &ProjectContext, report: &mut DoctorReport) -> Option<ConfigManager> {
    if !ctx.config_path.exists() {
        report.issues.push(
            Issue::new(
                IssueSeverity::Error,
                "config",
                &format!("no configuration at {}", ctx.config_path.display()),
            )
            .with_remediation("loom init"),
        );
        return None;
    }

    match ctx.load_config() {
        Ok(config) => {
            report.pass("config", ctx.config_path.display().to_string());
            Some(config)
        }
        Err(e) => {
            report
                .issues
                .push(Issue::new(IssueSeverity::Error, "config", &e.to_string()));
            None
        }
    }
}

fn check_agents(ctx: &ProjectContext, config: &ConfigManager, report: &mut DoctorReport) {
    let resolver = AgentConfigResolver::new(config, &ctx.root);
    let agents = match resolver.list_agents() {
        Ok(agents) => agents,
        Err(e) => {
            report
                .issues
                .push(Issue::new(IssueSeverity::Error, "agents", &e.to_string()));
            return;
        }
    };

    for agent in agents {
        match resolver.resolve(&agent) {
            Ok(_) => report.pass(format!("agent {}", agent), "valid"),
            Err(e) => report
                .issues
                .push(Issue::new(IssueSeverity::Error, "agents", &e.to_string())),
        }
    }
}

fn check_template(ctx: &ProjectContext, config: &ConfigManager, report: &mut DoctorReport) {
    let settings: TemplateSettings = match section(config.document(), "templates") {
        Ok(settings) => settings,
        Err(e) => {
            report
                .issues
                .push(Issue::new(IssueSeverity::Error, "templates", &e.to_string()));
            return;
        }
    };

    match TemplateStore::new(&ctx.root, &settings).find(DEFAULT_TEMPLATE) {
        Some(path) => report.pass("template", path.display().to_string()),
        None => report.issues.push(
            Issue::new(
                IssueSeverity::Warning,
                "templates",
                &format!("{} not found, using the built-in template", DEFAULT_TEMPLATE),
            )
            .with_remediation("loom init --force"),
        ),
    }
}

fn check_providers(config: &ConfigManager, report: &mut DoctorReport) {
    let default = section::<LlmSettings>(config.document(), "llm_settings")
        .map(|s| s.default_provider)
        .unwrap_or_default();

    for provider in LlmProvider::ALL {
        let program = match resolve_llm(config.document(), Some(provider)) {
            Ok(llm) => llm.command.first().cloned().unwrap_or_default(),
            Err(e) => {
                report
                    .issues
                    .push(Issue::new(IssueSeverity::Error, "llm", &e.to_string()));
                continue;
            }
        };

        let label = if provider == default {
            format!("provider {} (default)", provider)
        } else {
            format!("provider {}", provider)
        };

        match find_program(&program) {
            Some(path) => report.pass(label, path.display().to_string()),
            None if provider == default => report.issues.push(
                Issue::new(
                    IssueSeverity::Error,
                    "llm",
                    &format!("default provider program '{}' not found on PATH", program),
                )
                .with_remediation(&format!(
                    "Install the {} CLI, or set llm_settings.default_provider",
                    provider
                )),
            ),
            None => tracing::debug!(provider = %provider, program = %program, "provider not installed"),
        }
    }
}

fn check_github_cli(config: &ConfigManager, report: &mut DoctorReport) {
    let automation: AutomationSettings =
        section(config.document(), "automation").unwrap_or_default();
    if !automation.auto_create_issues {
        return;
    }

    match find_program(GH_PROGRAM) {
        Some(path) => report.pass("gh", path.display().to_string()),
        None => report.issues.push(
            Issue::new(
                IssueSeverity::Warning,
                "github",
                "automation.auto_create_issues is set but 'gh' is not on PATH",
            )
            .with_remediation("Install the GitHub CLI and run `gh auth login`"),
        ),
    }
}

/// Locate an executable `program` the way a spawn would: paths with a
/// separator are checked as given, bare names are searched on `PATH`.
pub(crate) fn find_program(program: &str) -> Option<PathBuf> {
    which::which(program).ok()
}

fn print_report(report: &DoctorReport) {
    for (label, detail) in &report.passed {
        println!("  ok  {}: {}", label, detail);
    }

    if report.issues.is_empty() {
        println!();
        println!("Project is healthy. No issues detected.");
        return;
    }

    println!();
    println!("Issues detected ({}):", report.issues.len());
    println!();
    for (i, issue) in report.issues.iter().enumerate() {
        println!(
            "  {}. [{}] {} - {}",
            i + 1,
            issue.severity,
            issue.category,
            issue.description
        );
        if let Some(remediation) = &issue.remediation {
            println!("     Fix:  {}", remediation);
        }
        println!();
    }
}
