//! Tests for command implementations.

use super::config_cmd::{display_value, lookup_value};
use super::doctor::{IssueSeverity, diagnose, find_program};
use super::generate::{GenerateRequest, Generated, generate};
use super::init::{cmd_init, starter_config};
use super::*;
use crate::cli::InitArgs;
use crate::config::{DEFAULT_CONFIG_FILE, Schema};
use crate::events::{EventAction, read_events};
use crate::template::{DEFAULT_TEMPLATE, DEFAULT_TEMPLATE_DIR, RenderMode};
use crate::test_support::{create_project_with, create_test_project, sample_config, write_agent, write_json};
use serde_json::{Value, json};
use tempfile::TempDir;

const FEATURE_TEMPLATE: &str = "# FEATURE: {{ feature_request }}\n\nStack: {{ tech_stack }}\n";

fn init_args(name: &str) -> InitArgs {
    InitArgs {
        name: Some(name.to_string()),
        context: Some("Tracks tournaments".to_string()),
        repo_owner: Some("acme".to_string()),
        repo_name: Some(name.to_string()),
        provider: Some("claude-code".to_string()),
        ..Default::default()
    }
}

/// A project whose LLM is `cat`, so the output is the rendered prompt.
fn echo_project() -> (TempDir, ProjectContext) {
    let mut config = sample_config();
    config["llm_settings"]["providers"] = json!({ "gemini": { "command": "cat" } });
    let temp = create_project_with(config);
    let dir = temp.path().join(DEFAULT_TEMPLATE_DIR);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(DEFAULT_TEMPLATE), FEATURE_TEMPLATE).unwrap();
    let ctx = ProjectContext::for_root(temp.path());
    (temp, ctx)
}

fn request(feature: &str) -> GenerateRequest {
    GenerateRequest {
        feature: feature.to_string(),
        ..Default::default()
    }
}

// ========================================================================
// init
// ========================================================================

#[test]
fn test_starter_config_is_valid() {
    let doc = starter_config(&InitArgs::default());
    Schema::builtin().validate(&doc).unwrap();
    assert_eq!(doc["llm_settings"]["default_provider"], "gemini");
    assert_eq!(doc["automation"]["auto_create_issues"], false);
    assert_eq!(
        doc["github"]["default_labels"],
        json!(["auto-generated", "needs-review"])
    );
}

#[test]
fn test_init_writes_config_and_template() {
    let temp = TempDir::new().unwrap();
    let ctx = ProjectContext::for_root(temp.path());

    cmd_init(&ctx, init_args("hub")).unwrap();

    let config = ctx.load_config().unwrap();
    assert_eq!(config.get_str("project.name"), Some("hub"));
    assert_eq!(config.get_str("github.repo_owner"), Some("acme"));
    assert_eq!(
        config.get_str("llm_settings.default_provider"),
        Some("claude-code")
    );

    let template = temp.path().join(DEFAULT_TEMPLATE_DIR).join(DEFAULT_TEMPLATE);
    let text = std::fs::read_to_string(template).unwrap();
    assert!(text.contains("{{ feature_request }}"));

    let events = read_events(&ctx).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, EventAction::Init);
}

#[test]
fn test_init_refuses_to_overwrite_without_force() {
    let temp = create_test_project();
    let ctx = ProjectContext::for_root(temp.path());

    let err = cmd_init(&ctx, init_args("other")).unwrap_err();
    assert!(err.to_string().contains("--force"));

    let config = ctx.load_config().unwrap();
    assert_eq!(config.get_str("project.name"), Some("tournament-hub"));
}

#[test]
fn test_init_force_overwrites_but_keeps_edited_template() {
    let temp = create_test_project();
    let ctx = ProjectContext::for_root(temp.path());
    let template = temp.path().join(DEFAULT_TEMPLATE_DIR).join(DEFAULT_TEMPLATE);
    std::fs::create_dir_all(template.parent().unwrap()).unwrap();
    std::fs::write(&template, "custom {{ feature_request }}").unwrap();

    let args = InitArgs {
        force: true,
        ..init_args("renamed")
    };
    cmd_init(&ctx, args).unwrap();

    let config = ctx.load_config().unwrap();
    assert_eq!(config.get_str("project.name"), Some("renamed"));
    assert_eq!(
        std::fs::read_to_string(&template).unwrap(),
        "custom {{ feature_request }}"
    );
}

// ========================================================================
// generate
// ========================================================================

#[test]
fn test_generate_requires_config() {
    let temp = TempDir::new().unwrap();
    let ctx = ProjectContext::for_root(temp.path());

    let err = generate(&ctx, &request("anything")).unwrap_err();
    assert!(matches!(err, crate::error::LoomError::ConfigNotFound { .. }));
}

#[test]
fn test_generate_dry_run_returns_prompt() {
    let (_temp, ctx) = echo_project();
    let req = GenerateRequest {
        dry_run: true,
        ..request("bracket seeding")
    };

    let generated = generate(&ctx, &req).unwrap();
    assert_eq!(
        generated,
        Generated::Prompt("# FEATURE: bracket seeding\n\nStack: Rust, SQLite\n".to_string())
    );
    assert!(!ctx.output_dir.exists());
}

#[test]
fn test_generate_uses_builtin_template_when_none_on_disk() {
    let temp = create_test_project();
    let ctx = ProjectContext::for_root(temp.path());
    let req = GenerateRequest {
        dry_run: true,
        ..request("bracket seeding")
    };

    let Generated::Prompt(prompt) = generate(&ctx, &req).unwrap() else {
        panic!("expected a dry-run prompt");
    };
    assert!(prompt.contains("tournament-hub"));
    assert!(prompt.contains("bracket seeding"));
    assert!(!prompt.contains("{{"));
}

#[test]
fn test_generate_missing_project_field_is_error() {
    let mut config = sample_config();
    config["project"]["tech_stack"] = json!("");
    let temp = create_project_with(config);
    let ctx = ProjectContext::for_root(temp.path());

    let err = generate(&ctx, &request("x")).unwrap_err();
    assert!(err.to_string().contains("project.tech_stack"));
}

#[test]
fn test_generate_strict_rejects_unknown_placeholder() {
    let (temp, ctx) = echo_project();
    std::fs::write(
        temp.path().join(DEFAULT_TEMPLATE_DIR).join(DEFAULT_TEMPLATE),
        "{{ feature_request }} {{ reviewer }}",
    )
    .unwrap();

    let req = GenerateRequest {
        dry_run: true,
        mode: RenderMode::Strict,
        ..request("x")
    };
    let err = generate(&ctx, &req).unwrap_err();
    assert!(err.to_string().contains("reviewer"));

    let lenient = GenerateRequest {
        dry_run: true,
        ..request("x")
    };
    assert_eq!(
        generate(&ctx, &lenient).unwrap(),
        Generated::Prompt("x {{ reviewer }}".to_string())
    );
}

#[cfg(unix)]
#[test]
fn test_generate_writes_issue_file() {
    let (_temp, ctx) = echo_project();

    let Generated::Issue(issue) = generate(&ctx, &request("bracket seeding")).unwrap() else {
        panic!("expected an issue file");
    };

    assert!(issue.path.starts_with(&ctx.output_dir));
    assert!(
        issue
            .path
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .ends_with("_bracket_seeding.md")
    );
    assert_eq!(
        std::fs::read_to_string(&issue.path).unwrap(),
        "# FEATURE: bracket seeding\n\nStack: Rust, SQLite\n"
    );
    assert_eq!(issue.title, "bracket seeding");
    assert_eq!(issue.repo.as_deref(), Some("acme/tournament-hub"));
    assert_eq!(issue.url, None);

    let actions: Vec<EventAction> = read_events(&ctx)
        .unwrap()
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(
        actions,
        vec![
            EventAction::LlmInvoke,
            EventAction::LlmComplete,
            EventAction::Generate
        ]
    );
}

#[cfg(unix)]
#[test]
fn test_generate_with_agent_uses_merged_config() {
    let (temp, ctx) = echo_project();
    write_agent(
        temp.path(),
        "backend",
        Some(json!({ "project": { "tech_stack": "Rust, Postgres" } })),
        None,
    );

    let req = GenerateRequest {
        agent: Some("backend".to_string()),
        ..request("ratings")
    };
    let Generated::Issue(issue) = generate(&ctx, &req).unwrap() else {
        panic!("expected an issue file");
    };
    let text = std::fs::read_to_string(&issue.path).unwrap();
    assert!(text.contains("Stack: Rust, Postgres"));

    let events = read_events(&ctx).unwrap();
    assert!(events.iter().all(|e| e.agent.as_deref() == Some("backend")));
}

#[cfg(unix)]
#[test]
fn test_generate_llm_failure_writes_nothing() {
    let mut config = sample_config();
    config["llm_settings"]["providers"] = json!({ "gemini": { "command": "false" } });
    let temp = create_project_with(config);
    let ctx = ProjectContext::for_root(temp.path());

    let err = generate(&ctx, &request("x")).unwrap_err();
    assert!(matches!(err, crate::error::LoomError::Llm(_)));
    assert!(!ctx.output_dir.exists());
}

// ========================================================================
// config
// ========================================================================

#[test]
fn test_config_get_global_and_agent() {
    let temp = create_test_project();
    write_agent(
        temp.path(),
        "writer",
        Some(json!({ "llm_settings": { "temperature": 0.2 } })),
        None,
    );
    let ctx = ProjectContext::for_root(temp.path());
    let config = ctx.load_config().unwrap();

    let global = lookup_value(&ctx, &config, "llm_settings.temperature", None).unwrap();
    assert_eq!(global, json!(0.7));

    let agent = lookup_value(&ctx, &config, "llm_settings.temperature", Some("writer")).unwrap();
    assert_eq!(agent, json!(0.2));

    let err = lookup_value(&ctx, &config, "llm_settings.nope", None).unwrap_err();
    assert!(err.to_string().contains("llm_settings.nope"));
}

#[test]
fn test_config_get_sees_injected_root() {
    let temp = create_test_project();
    let ctx = ProjectContext::for_root(temp.path());
    let config = ctx.load_config().unwrap();

    let root = lookup_value(&ctx, &config, "project.root", None).unwrap();
    assert_eq!(root, Value::String(temp.path().display().to_string()));
}

#[test]
fn test_display_value_prints_strings_raw() {
    assert_eq!(display_value(&json!("gemini")).unwrap(), "gemini");
    assert_eq!(display_value(&json!(3)).unwrap(), "3");
    assert_eq!(
        display_value(&json!(["a"])).unwrap(),
        "[\n  \"a\"\n]"
    );
}

#[test]
fn test_config_validate_reports_bad_agent() {
    let temp = create_test_project();
    write_agent(
        temp.path(),
        "broken",
        Some(json!({ "llm_settings": { "default_provider": "llama" } })),
        None,
    );
    let ctx = ProjectContext::for_root(temp.path());

    let err = config_cmd::cmd_config_validate(&ctx).unwrap_err();
    assert!(err.to_string().contains("broken"));
}

#[test]
fn test_config_validate_passes_for_valid_project() {
    let temp = create_test_project();
    write_agent(temp.path(), "writer", Some(json!({ "llm": { "model": "m" } })), None);
    let ctx = ProjectContext::for_root(temp.path());

    config_cmd::cmd_config_validate(&ctx).unwrap();
}

// ========================================================================
// doctor
// ========================================================================

#[test]
fn test_doctor_without_config() {
    let temp = TempDir::new().unwrap();
    let report = diagnose(&ProjectContext::for_root(temp.path()));

    assert!(report.has_errors());
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].remediation.as_deref(), Some("loom init"));
}

#[test]
fn test_doctor_invalid_config_is_error() {
    let temp = TempDir::new().unwrap();
    write_json(
        &temp.path().join(DEFAULT_CONFIG_FILE),
        &json!({ "project": {} }),
    );
    let report = diagnose(&ProjectContext::for_root(temp.path()));

    assert!(report.has_errors());
    assert!(report.issues[0].description.contains("llm_settings"));
}

#[cfg(unix)]
#[test]
fn test_doctor_missing_default_provider_is_error() {
    let mut config = sample_config();
    config["llm_settings"]["providers"] =
        json!({ "gemini": { "command": "loom-test-no-such-llm --flag" } });
    let temp = create_project_with(config);
    let report = diagnose(&ProjectContext::for_root(temp.path()));

    let llm_errors: Vec<_> = report
        .issues
        .iter()
        .filter(|i| i.category == "llm" && i.severity == IssueSeverity::Error)
        .collect();
    assert_eq!(llm_errors.len(), 1);
    assert!(llm_errors[0].description.contains("loom-test-no-such-llm"));
}

#[cfg(unix)]
#[test]
fn test_doctor_healthy_project() {
    let (_temp, ctx) = echo_project();
    let report = diagnose(&ctx);

    assert!(!report.has_errors(), "{:?}", report.issues);
    assert!(report.passed.iter().any(|(label, _)| label == "template"));
    assert!(
        report
            .passed
            .iter()
            .any(|(label, _)| label == "provider gemini (default)")
    );
}

#[test]
fn test_doctor_warns_about_builtin_template() {
    let temp = create_test_project();
    let report = diagnose(&ProjectContext::for_root(temp.path()));

    assert!(
        report
            .issues
            .iter()
            .any(|i| i.category == "templates" && i.severity == IssueSeverity::Warning)
    );
}

#[cfg(unix)]
#[test]
fn test_find_program() {
    assert!(find_program("sh").is_some());
    assert!(find_program("/bin/sh").is_some());
    assert!(find_program("loom-test-no-such-program").is_none());
    assert!(find_program("").is_none());
}

#[cfg(unix)]
#[test]
fn test_find_program_skips_non_executable_file() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let fake = temp.path().join("claude");
    std::fs::write(&fake, "not a program").unwrap();
    std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o644)).unwrap();
    assert!(find_program(fake.to_str().unwrap()).is_none());

    std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();
    assert!(find_program(fake.to_str().unwrap()).is_some());
}

// ========================================================================
// helpers
// ========================================================================

#[test]
fn test_feature_text_joins_words() {
    let words = vec!["add".to_string(), "bracket".to_string(), "seeding".to_string()];
    assert_eq!(feature_text(&words).unwrap(), "add bracket seeding");
    assert!(feature_text(&["  ".to_string()]).is_err());
}
