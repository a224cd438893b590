//! Placeholder substitution for Markdown prompt templates.
//!
//! # Syntax
//!
//! - `{{ name }}` - replaced by the value of `name`; whitespace inside the
//!   braces is optional and names may contain dots (`{{ context.research }}`)
//! - Anything else, including single braces, is copied through unchanged
//!
//! There are no loops, conditionals or filters. A token without a value is
//! left verbatim in passthrough mode and reported in strict mode.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use thiserror::Error;

static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}\s]+(?:\s+[^{}\s]+)*)\s*\}\}").expect("Invalid placeholder regex")
});

/// How tokens without a supplied value are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Leave unresolved tokens verbatim.
    #[default]
    Passthrough,
    /// Fail when any token has no value.
    Strict,
}

/// Error type for template rendering failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// Strict rendering found tokens with no supplied value.
    #[error("template has unresolved placeholders: {}", .names.join(", "))]
    Unresolved {
        /// Distinct token names, in order of first appearance.
        names: Vec<String>,
    },
}

/// Render a template in passthrough mode.
///
/// ```
/// use std::collections::HashMap;
/// use loom::template::render;
///
/// let mut values = HashMap::new();
/// values.insert("name".to_string(), "World".to_string());
///
/// assert_eq!(render("Hello {{ name }}", &values), "Hello World");
/// assert_eq!(render("Hello {{ name }}", &HashMap::new()), "Hello {{ name }}");
/// ```
pub fn render(template: &str, values: &HashMap<String, String>) -> String {
    substitute(template, values)
}

/// Render a template with an explicit [`RenderMode`].
pub fn render_with(
    template: &str,
    values: &HashMap<String, String>,
    mode: RenderMode,
) -> Result<String, TemplateError> {
    if mode == RenderMode::Strict {
        let names = unresolved(template, values);
        if !names.is_empty() {
            return Err(TemplateError::Unresolved { names });
        }
    }
    Ok(substitute(template, values))
}

/// Distinct placeholder names in `template`, in order of first appearance.
pub fn placeholders(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER_REGEX.captures_iter(template) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Placeholder names in `template` that have no entry in `values`.
pub fn unresolved(template: &str, values: &HashMap<String, String>) -> Vec<String> {
    placeholders(template)
        .into_iter()
        .filter(|name| !values.contains_key(name))
        .collect()
}

/// Build a value map from key-value pairs.
pub fn vars<I, K, V>(pairs: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

// Single pass over the original text: substituted values are never rescanned,
// so a value that itself contains `{{ x }}` is inserted literally.
fn substitute(template: &str, values: &HashMap<String, String>) -> String {
    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| match values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
}
