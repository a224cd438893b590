//! Template lookup on disk.

use crate::config::TemplateSettings;
use crate::error::{LoomError, Result};
use std::path::{Path, PathBuf};

/// File name of the issue-generation meta-prompt.
pub const DEFAULT_TEMPLATE: &str = "meta-prompt-template.md";

/// Directory searched when `templates.directories` is not configured.
pub const DEFAULT_TEMPLATE_DIR: &str = "templates";

/// Meta-prompt used when no `meta-prompt-template.md` exists on disk.
pub const BUILTIN_META_PROMPT: &str = r#"# Feature Issue Generator

You are a senior engineer turning a short feature request into a complete,
implementation-ready GitHub issue for {{ project_name }}.

## Project Context

{{ project_context }}

## Technology Stack

{{ tech_stack }}

## Architecture

{{ architecture }}

## Target Users

{{ target_users }}

## Constraints

{{ constraints }}

## Feature Request

{{ feature_request }}

## Output Format

Respond with Markdown only. Begin your answer with a single line of the form
`# FEATURE: <short title>` and then include these sections:

- `## Summary` - what the feature does and why it matters to the target users
- `## Requirements` - functional requirements as a checklist
- `## Technical Approach` - how it fits the architecture and stack above
- `## Acceptance Criteria` - testable conditions for completion
- `## Risks and Open Questions`

Do not include any text before the `# FEATURE:` line.
"#;

/// Where a loaded template came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    File(PathBuf),
    Builtin,
}

/// A template's text, read fresh for each use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub source: TemplateSource,
    pub text: String,
}

/// Searches the configured template directories, in order.
#[derive(Debug, Clone)]
pub struct TemplateStore {
    directories: Vec<PathBuf>,
}

impl TemplateStore {
    /// Build a store from `templates.directories`, relative to `project_root`.
    pub fn new(project_root: &Path, settings: &TemplateSettings) -> Self {
        let directories = if settings.directories.is_empty() {
            vec![project_root.join(DEFAULT_TEMPLATE_DIR)]
        } else {
            settings
                .directories
                .iter()
                .map(|dir| project_root.join(dir))
                .collect()
        };
        Self { directories }
    }

    /// Directories searched, in priority order.
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }

    /// First existing file for `name` (`.md` appended when missing).
    pub fn find(&self, name: &str) -> Option<PathBuf> {
        let file_name = with_md_extension(name);
        self.directories
            .iter()
            .map(|dir| dir.join(&file_name))
            .find(|path| path.is_file())
    }

    /// Load a template by name.
    ///
    /// The default meta-prompt falls back to the built-in text when no file
    /// exists. Any other missing name is `TemplateNotFound`.
    pub fn load(&self, name: &str) -> Result<Template> {
        if let Some(path) = self.find(name) {
            return load_file(&path);
        }

        if with_md_extension(name) == DEFAULT_TEMPLATE {
            tracing::debug!("no meta-prompt template on disk, using built-in");
            return Ok(Template {
                name: DEFAULT_TEMPLATE.to_string(),
                source: TemplateSource::Builtin,
                text: BUILTIN_META_PROMPT.to_string(),
            });
        }

        Err(LoomError::TemplateNotFound {
            name: name.to_string(),
            searched: self.directories.clone(),
        })
    }
}

/// Load a template from an explicit path.
pub fn load_file(path: &Path) -> Result<Template> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if !path.is_file() {
        return Err(LoomError::TemplateNotFound {
            name,
            searched: vec![path.to_path_buf()],
        });
    }

    let text = std::fs::read_to_string(path).map_err(|e| LoomError::io("read", path, e))?;
    tracing::debug!(path = %path.display(), "loaded template");

    Ok(Template {
        name,
        source: TemplateSource::File(path.to_path_buf()),
        text,
    })
}

fn with_md_extension(name: &str) -> String {
    if name.ends_with(".md") {
        name.to_string()
    } else {
        format!("{}.md", name)
    }
}
