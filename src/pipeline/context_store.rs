//! Shared state passed between pipeline agents.

use std::collections::{BTreeMap, HashMap};

/// Prefix under which stored values are exposed to templates.
pub const CONTEXT_PREFIX: &str = "context.";

/// Keyed values with history. Each key holds every value added to it; reads
/// see the most recent one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStore {
    entries: BTreeMap<String, Vec<String>>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(key)
            .and_then(|values| values.last())
            .map(String::as_str)
    }

    /// Replace the whole history of `key` with one value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// Append a value to `key`'s history.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Set several keys at once.
    pub fn update<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in pairs {
            self.set(key, value);
        }
    }

    /// Every value recorded for `key`, oldest first.
    pub fn history(&self, key: &str) -> &[String] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Latest values as `context.<key>` template variables.
    pub fn to_variables(&self) -> HashMap<String, String> {
        self.entries
            .iter()
            .filter_map(|(key, values)| {
                values
                    .last()
                    .map(|v| (format!("{}{}", CONTEXT_PREFIX, key), v.clone()))
            })
            .collect()
    }
}

/// Context key holding an agent's output: `issue-generator` → `issue_generator_result`.
pub fn result_key(agent: &str) -> String {
    format!("{}_result", agent.replace('-', "_"))
}
