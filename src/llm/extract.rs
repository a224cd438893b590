//! Cleaning up raw LLM output into an issue document.

/// Marker the meta-prompt asks the model to start its answer with.
pub const FEATURE_MARKER: &str = "# FEATURE:";

/// Heading used when no structure at all can be found.
pub const FALLBACK_HEADING: &str = "# EXTRACTED OUTPUT";

const TITLE_KEYWORDS: [&str; 3] = ["feature", "spec", "implementation"];

/// Pull the issue document out of raw model output.
///
/// Tried in order: text from the `# FEATURE:` marker on, a top-level heading
/// mentioning feature/spec/implementation, the first fenced code block, the
/// first `## ` section. Failing all of those the raw text is returned under
/// an `# EXTRACTED OUTPUT` heading.
pub fn extract_issue(raw: &str) -> String {
    if let Some(pos) = raw.find(FEATURE_MARKER) {
        return raw[pos..].to_string();
    }

    let lines: Vec<&str> = raw.lines().collect();

    if let Some(i) = lines.iter().position(|line| {
        let line = line.trim();
        let lower = line.to_lowercase();
        line.starts_with("# ") && TITLE_KEYWORDS.iter().any(|k| lower.contains(k))
    }) {
        return lines[i..].join("\n");
    }

    if let Some(block) = first_fenced_block(raw) {
        return block.trim().to_string();
    }

    if let Some(i) = lines.iter().position(|line| line.trim().starts_with("## ")) {
        return lines[i..].join("\n");
    }

    format!("{}\n\n{}", FALLBACK_HEADING, raw)
}

/// The title after `# FEATURE:` on its own line, if any.
pub fn extract_title(document: &str) -> Option<String> {
    document
        .lines()
        .find_map(|line| line.trim_start().strip_prefix(FEATURE_MARKER))
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

fn first_fenced_block(raw: &str) -> Option<&str> {
    let open = raw.find("```")?;
    // Skip the info string (e.g. ```markdown) on the opening line.
    let content_start = open + raw[open..].find('\n')? + 1;
    let len = raw[content_start..].find("```")?;
    Some(&raw[content_start..content_start + len])
}
