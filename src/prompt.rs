//! Prompt variables for issue generation.
//!
//! Collects the `project.*` settings and the user's feature text into the
//! variables the meta-prompt template refers to.

use crate::config::{ProjectSettings, TemplateSettings, section};
use crate::error::{LoomError, Result};
use clap::ValueEnum;
use serde_json::Value;
use std::collections::HashMap;

/// Feature categories that add `templates.<kind>_feature` context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FeatureKind {
    /// User interface features
    Ui,
    /// Backend/API features
    Api,
    /// Data pipeline features
    Data,
    /// Performance optimization features
    Perf,
}

impl FeatureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Ui => "ui",
            FeatureKind::Api => "api",
            FeatureKind::Data => "data",
            FeatureKind::Perf => "perf",
        }
    }
}

/// Project description plus the feature request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueContext {
    pub project_name: String,
    pub project_context: String,
    pub tech_stack: String,
    pub architecture: String,
    pub target_users: String,
    pub constraints: String,
    pub feature_request: String,
}

impl IssueContext {
    /// Build the context from a configuration document.
    ///
    /// `project.context`, `project.tech_stack`, `project.architecture`,
    /// `project.target_users` and `project.constraints` must be set.
    pub fn from_config(document: &Value, feature: &str, kind: Option<FeatureKind>) -> Result<Self> {
        let project: ProjectSettings = section(document, "project")?;
        let templates: TemplateSettings = section(document, "templates")?;

        let mut constraints = required(project.constraints, "constraints")?;
        if let Some(kind) = kind
            && let Some(extra) = templates.feature_context(kind.as_str())
        {
            constraints = format!("{}\n\nTEMPLATE-SPECIFIC CONTEXT: {}", constraints, extra);
        }

        Ok(Self {
            project_name: project.name.unwrap_or_default(),
            project_context: required(project.context, "context")?,
            tech_stack: required(project.tech_stack, "tech_stack")?,
            architecture: required(project.architecture, "architecture")?,
            target_users: required(project.target_users, "target_users")?,
            constraints,
            feature_request: feature.to_string(),
        })
    }

    /// Like [`IssueContext::from_config`], but missing `project.*` keys
    /// become empty strings. Used by pipeline agents whose templates may not
    /// need the project description at all.
    pub fn from_config_lenient(document: &Value, feature: &str) -> Result<Self> {
        let project: ProjectSettings = section(document, "project")?;
        Ok(Self {
            project_name: project.name.unwrap_or_default(),
            project_context: project.context.unwrap_or_default(),
            tech_stack: project.tech_stack.unwrap_or_default(),
            architecture: project.architecture.unwrap_or_default(),
            target_users: project.target_users.unwrap_or_default(),
            constraints: project.constraints.unwrap_or_default(),
            feature_request: feature.to_string(),
        })
    }

    /// Template variables keyed by placeholder name.
    pub fn to_variables(&self) -> HashMap<String, String> {
        let mut vars = HashMap::new();
        vars.insert("project_name".to_string(), self.project_name.clone());
        vars.insert("project_context".to_string(), self.project_context.clone());
        vars.insert("tech_stack".to_string(), self.tech_stack.clone());
        vars.insert("architecture".to_string(), self.architecture.clone());
        vars.insert("target_users".to_string(), self.target_users.clone());
        vars.insert("constraints".to_string(), self.constraints.clone());
        vars.insert("feature_request".to_string(), self.feature_request.clone());
        vars
    }
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        LoomError::UserError(format!(
            "configuration key 'project.{}' is required to generate issues\n\
             Fix: set it in the configuration file or re-run `loom init`.",
            key
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_config;

    #[test]
    fn test_from_config() {
        let ctx = IssueContext::from_config(&sample_config(), "dark mode", None).unwrap();

        assert_eq!(ctx.project_name, "tournament-hub");
        assert_eq!(ctx.tech_stack, "Rust, SQLite");
        assert_eq!(ctx.constraints, "must work offline");
        assert_eq!(ctx.feature_request, "dark mode");
    }

    #[test]
    fn test_feature_kind_appends_context() {
        let mut doc = sample_config();
        doc["templates"]["ui_feature"] = Value::String("Follow the design system".into());

        let ctx = IssueContext::from_config(&doc, "x", Some(FeatureKind::Ui)).unwrap();
        assert_eq!(
            ctx.constraints,
            "must work offline\n\nTEMPLATE-SPECIFIC CONTEXT: Follow the design system"
        );

        let ctx = IssueContext::from_config(&doc, "x", Some(FeatureKind::Api)).unwrap();
        assert_eq!(ctx.constraints, "must work offline");
    }

    #[test]
    fn test_missing_project_key_names_it() {
        let mut doc = sample_config();
        doc["project"]
            .as_object_mut()
            .unwrap()
            .remove("tech_stack");

        let err = IssueContext::from_config(&doc, "x", None).unwrap_err();
        assert!(err.to_string().contains("project.tech_stack"));
    }

    #[test]
    fn test_lenient_fills_missing_with_empty() {
        let doc = serde_json::json!({ "project": { "name": "p" } });
        let ctx = IssueContext::from_config_lenient(&doc, "f").unwrap();

        assert_eq!(ctx.project_name, "p");
        assert_eq!(ctx.tech_stack, "");
        assert_eq!(ctx.feature_request, "f");
    }

    #[test]
    fn test_to_variables() {
        let ctx = IssueContext::from_config(&sample_config(), "dark mode", None).unwrap();
        let vars = ctx.to_variables();

        assert_eq!(vars.len(), 7);
        assert_eq!(vars["feature_request"], "dark mode");
        assert_eq!(vars["project_context"], "Tracks card game tournaments");
    }
}
