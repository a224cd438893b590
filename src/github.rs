//! GitHub issue publishing through the `gh` CLI.
//!
//! Provides the manual command a user can paste, and the automated
//! `gh issue create` call used when `automation.auto_create_issues` is set.

use crate::config::GithubSettings;
use crate::error::{LoomError, Result};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

/// Program used to create issues.
pub const GH_PROGRAM: &str = "gh";

static ISSUE_URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https://github\.com/[^\s/]+/[^\s/]+/issues/\d+").expect("Invalid issue URL regex")
});

/// Everything needed for one `gh issue create` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRequest {
    /// `owner/name`.
    pub repo: String,
    pub title: String,
    pub body_file: PathBuf,
    pub labels: Vec<String>,
    pub project: Option<String>,
}

/// Outcome of a successful `gh issue create`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedIssue {
    pub url: Option<String>,
    pub stdout: String,
}

impl IssueRequest {
    /// Build a request from the `github` settings.
    pub fn from_settings(settings: &GithubSettings, title: &str, body_file: &Path) -> Result<Self> {
        let repo = settings.repo_slug().ok_or_else(|| {
            LoomError::UserError(
                "github.repo_owner and github.repo_name must be set to create issues".to_string(),
            )
        })?;

        Ok(Self {
            repo,
            title: title.to_string(),
            body_file: body_file.to_path_buf(),
            labels: settings.default_labels.clone(),
            project: settings.default_project.clone().filter(|p| !p.is_empty()),
        })
    }

    /// Arguments after the program name.
    pub fn args(&self) -> Vec<String> {
        let mut args = vec![
            "issue".to_string(),
            "create".to_string(),
            "--repo".to_string(),
            self.repo.clone(),
            "--title".to_string(),
            self.title.clone(),
            "--body-file".to_string(),
            self.body_file.display().to_string(),
        ];
        if !self.labels.is_empty() {
            args.push("--label".to_string());
            args.push(self.labels.join(","));
        }
        if let Some(project) = &self.project {
            args.push("--project".to_string());
            args.push(project.clone());
        }
        args
    }

    /// Run `gh issue create` in `cwd`.
    pub fn create(&self, cwd: &Path) -> Result<CreatedIssue> {
        self.run_with(GH_PROGRAM, cwd)
    }

    fn run_with(&self, program: &str, cwd: &Path) -> Result<CreatedIssue> {
        let args = self.args();
        let shown = shell_words::join(std::iter::once(program).chain(args.iter().map(String::as_str)));
        tracing::info!(command = %shown, "creating GitHub issue");

        let output = Command::new(program)
            .current_dir(cwd)
            .args(&args)
            .output()
            .map_err(|e| {
                LoomError::UserError(format!(
                    "failed to execute '{}': {}\n\
                     Fix: ensure the GitHub CLI is installed and authenticated.",
                    program, e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(LoomError::UserError(format!(
                "failed to create GitHub issue (exit code {:?}): {}",
                output.status.code(),
                stderr
            )));
        }

        Ok(CreatedIssue {
            url: find_issue_url(&stdout).map(str::to_string),
            stdout,
        })
    }
}

/// The `gh` command a user can run by hand to file the issue.
pub fn manual_command(repo: &str, body_file: &Path) -> String {
    format!(
        "{} issue create --repo \"{}\" --body-file \"{}\"",
        GH_PROGRAM,
        repo,
        body_file.display()
    )
}

/// First GitHub issue URL in `text`.
pub fn find_issue_url(text: &str) -> Option<&str> {
    ISSUE_URL_REGEX.find(text).map(|m| m.as_str())
}
