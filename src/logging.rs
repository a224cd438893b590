//! Diagnostic logging setup and log sanitization.

use regex::Regex;
use std::sync::LazyLock;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive string.
pub const LOG_ENV_VAR: &str = "LOOM_LOG";

/// Longest excerpt of user or model text written to a log line.
pub const MAX_LOGGED_LEN: usize = 200;

const REDACTED: &str = "[REDACTED]";

static SECRET_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r#"(?i)(api[_-]?key|token|password|secret)["']?\s*[:=]\s*["']?[\w-]+"#,
        r"(?i)Bearer\s+[\w-]+",
        r"[A-Za-z0-9+/]{32,}={0,2}",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("Invalid redaction regex"))
    .collect()
});

/// Install the stderr subscriber.
///
/// `LOOM_LOG` wins when set; otherwise the level is `warn`, or `debug` with
/// `--verbose`. Calling this twice is harmless.
pub fn init(verbose: bool) {
    let default_level = if verbose { "loom=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Make user or model text safe to log.
///
/// Credentials, bearer tokens and long base64-like runs are replaced with
/// `[REDACTED]`, then the result is cut to [`MAX_LOGGED_LEN`] characters.
pub fn sanitize_for_log(text: &str) -> String {
    let mut sanitized = text.to_string();
    for pattern in SECRET_PATTERNS.iter() {
        sanitized = pattern.replace_all(&sanitized, REDACTED).into_owned();
    }

    if sanitized.chars().count() > MAX_LOGGED_LEN {
        let cut: String = sanitized.chars().take(MAX_LOGGED_LEN).collect();
        sanitized = format!("{}... [truncated]", cut);
    }
    sanitized
}
