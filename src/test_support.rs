use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};
use tempfile::TempDir;

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // Changing the process current working directory is global and not thread-safe.
        // Lock it so tests don't race even if a #[serial] annotation is missed.
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}

/// A complete, valid global configuration.
pub(crate) fn sample_config() -> Value {
    json!({
        "project": {
            "name": "tournament-hub",
            "context": "Tracks card game tournaments",
            "tech_stack": "Rust, SQLite",
            "architecture": "single binary",
            "target_users": "tournament organizers",
            "constraints": "must work offline"
        },
        "llm_settings": {
            "default_provider": "gemini",
            "temperature": 0.7,
            "max_tokens": 8192
        },
        "github": {
            "repo_owner": "acme",
            "repo_name": "tournament-hub",
            "default_labels": ["auto-generated"]
        },
        "automation": { "auto_create_issues": false },
        "templates": { "directories": ["templates"] }
    })
}

/// A temporary project directory holding `sample_config()`.
pub(crate) fn create_test_project() -> TempDir {
    create_project_with(sample_config())
}

/// A temporary project directory holding `config` as its global configuration.
pub(crate) fn create_project_with(config: Value) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_json(
        &temp_dir.path().join("dev-automation.config.json"),
        &config,
    );
    temp_dir
}

/// Write an agent directory with an optional `config.json` and template.
pub(crate) fn write_agent(
    project: &Path,
    agent: &str,
    config: Option<Value>,
    template: Option<&str>,
) -> PathBuf {
    let dir = project.join("agents").join(agent);
    std::fs::create_dir_all(&dir).unwrap();
    if let Some(config) = config {
        write_json(&dir.join("config.json"), &config);
    }
    if let Some(template) = template {
        std::fs::write(dir.join("template.md"), template).unwrap();
    }
    dir
}

pub(crate) fn write_json(path: &Path, value: &Value) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, serde_json::to_string_pretty(value).unwrap()).unwrap();
}
