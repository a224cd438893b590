//! Exit code constants for the loom CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid state, I/O)
//! - 2: Configuration failure (missing, malformed, or schema-invalid config)
//! - 3: Template failure (template not found, strict-mode unresolved tokens)
//! - 4: LLM invocation failure (missing binary, non-zero exit, timeout)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid state, or filesystem trouble.
pub const USER_ERROR: i32 = 1;

/// Configuration could not be found, parsed, or validated.
pub const CONFIG_FAILURE: i32 = 2;

/// Template lookup or rendering failed.
pub const TEMPLATE_FAILURE: i32 = 3;

/// The external LLM command failed.
pub const LLM_FAILURE: i32 = 4;
