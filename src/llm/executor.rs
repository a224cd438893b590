//! LLM subprocess executor.
//!
//! Runs the provider CLI with the prompt on stdin, captures stdout and stderr
//! to log files, and kills the process when the timeout expires.

use super::settings::ResolvedLlm;
use crate::config::LlmProvider;
use crate::context::ProjectContext;
use crate::error::{LoomError, Result};
use crate::events::{self, Event, EventAction};
use crate::logging::sanitize_for_log;
use serde_json::json;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

/// Result of one LLM process run.
#[derive(Debug, Clone)]
pub struct LlmRun {
    /// Exit code of the process (None if killed or didn't exit normally).
    pub exit_code: Option<i32>,
    /// Copy of the prompt that was sent.
    pub prompt_path: PathBuf,
    /// Path to the stdout log file.
    pub stdout_path: PathBuf,
    /// Path to the stderr log file.
    pub stderr_path: PathBuf,
    pub duration: Duration,
    /// Whether the process was killed due to timeout.
    pub timed_out: bool,
    /// The command that was executed (for logging).
    pub command: String,
}

impl LlmRun {
    pub fn is_success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// Run the LLM command and record its output under `run_dir`.
///
/// A process that starts but fails is not an error here; inspect the
/// returned [`LlmRun`]. Failing to start it is.
pub fn execute(llm: &ResolvedLlm, prompt: &str, run_dir: &Path, cwd: &Path) -> Result<LlmRun> {
    let Some((program, args)) = llm.command.split_first() else {
        return Err(LoomError::UserError(format!(
            "no command configured for provider '{}'",
            llm.provider
        )));
    };

    std::fs::create_dir_all(run_dir)
        .map_err(|e| LoomError::io("create log directory", run_dir, e))?;

    let prompt_path = run_dir.join("prompt.md");
    let stdout_path = run_dir.join("stdout.log");
    let stderr_path = run_dir.join("stderr.log");

    std::fs::write(&prompt_path, prompt).map_err(|e| LoomError::io("write", &prompt_path, e))?;
    let stdout_file =
        std::fs::File::create(&stdout_path).map_err(|e| LoomError::io("create", &stdout_path, e))?;
    let stderr_file =
        std::fs::File::create(&stderr_path).map_err(|e| LoomError::io("create", &stderr_path, e))?;

    let command_line = llm.command_line();
    tracing::info!(provider = %llm.provider, command = %command_line, "invoking LLM");

    let start_time = Instant::now();
    let mut child = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::piped())
        .stdout(Stdio::from(stdout_file))
        .stderr(Stdio::from(stderr_file))
        .spawn()
        .map_err(|e| spawn_error(llm.provider, program, e))?;

    // Feed stdin from a separate thread so a child that never reads cannot
    // block the timeout loop.
    let writer = child.stdin.take().map(|mut stdin| {
        let prompt = prompt.to_string();
        std::thread::spawn(move || match stdin.write_all(prompt.as_bytes()) {
            Err(e) if e.kind() != ErrorKind::BrokenPipe => Err(e),
            _ => Ok(()),
        })
    });

    let timeout = Duration::from_secs(llm.timeout_seconds);
    let (exit_code, timed_out) = wait_with_timeout(&mut child, timeout)?;
    let duration = start_time.elapsed();

    if let Some(writer) = writer
        && let Ok(Err(e)) = writer.join()
    {
        tracing::warn!(error = %e, "failed to write prompt to LLM stdin");
    }

    tracing::debug!(?exit_code, timed_out, elapsed_ms = duration.as_millis() as u64, "LLM finished");

    Ok(LlmRun {
        exit_code,
        prompt_path,
        stdout_path,
        stderr_path,
        duration,
        timed_out,
        command: command_line,
    })
}

/// Run the LLM and return its stdout, mapping any failure to `LoomError::Llm`.
pub fn invoke(llm: &ResolvedLlm, prompt: &str, run_dir: &Path, cwd: &Path) -> Result<String> {
    let run = execute(llm, prompt, run_dir, cwd)?;

    if run.timed_out {
        return Err(LoomError::Llm(format!(
            "'{}' timed out after {}s (stderr: {})",
            run.command,
            llm.timeout_seconds,
            run.stderr_path.display()
        )));
    }

    if !run.is_success() {
        let stderr = std::fs::read_to_string(&run.stderr_path).unwrap_or_default();
        let code = run
            .exit_code
            .map(|c| c.to_string())
            .unwrap_or_else(|| "signal".to_string());
        return Err(LoomError::Llm(format!(
            "'{}' exited with {}: {}\nFull stderr: {}",
            run.command,
            code,
            last_lines(&stderr, 5),
            run.stderr_path.display()
        )));
    }

    std::fs::read_to_string(&run.stdout_path).map_err(|e| LoomError::io("read", &run.stdout_path, e))
}

/// [`invoke`] in the project root, with `llm_invoke`/`llm_complete` run log events.
pub fn invoke_recorded(
    ctx: &ProjectContext,
    agent: Option<&str>,
    llm: &ResolvedLlm,
    prompt: &str,
    run_dir: &Path,
) -> Result<String> {
    let tag = |event: Event| match agent {
        Some(agent) => event.with_agent(agent),
        None => event,
    };

    tracing::debug!(prompt = %sanitize_for_log(prompt), "sending prompt");
    events::record(
        ctx,
        tag(Event::new(EventAction::LlmInvoke)).with_details(json!({
            "provider": llm.provider.as_str(),
            "model": llm.model,
            "temperature": llm.temperature,
            "max_tokens": llm.max_tokens,
            "command": llm.command_line(),
            "log_dir": run_dir.display().to_string(),
        })),
    );

    let start = Instant::now();
    let result = invoke(llm, prompt, run_dir, &ctx.root);

    events::record(
        ctx,
        tag(Event::new(EventAction::LlmComplete)).with_details(json!({
            "provider": llm.provider.as_str(),
            "success": result.is_ok(),
            "duration_ms": start.elapsed().as_millis() as u64,
        })),
    );

    if let Ok(output) = &result {
        tracing::debug!(output = %sanitize_for_log(output), "received LLM output");
    }
    result
}

fn spawn_error(provider: LlmProvider, program: &str, err: std::io::Error) -> LoomError {
    if err.kind() == ErrorKind::NotFound {
        let supported: Vec<&str> = LlmProvider::ALL.iter().map(LlmProvider::as_str).collect();
        LoomError::Llm(format!(
            "provider '{}' command '{}' not found. Make sure it is installed and in your PATH.\n\
             Supported providers: {}",
            provider,
            program,
            supported.join(", ")
        ))
    } else {
        LoomError::Llm(format!("failed to execute '{}': {}", program, err))
    }
}

/// Wait for a child process with timeout.
///
/// Returns (exit_code, timed_out).
fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<(Option<i32>, bool)> {
    let start = Instant::now();
    let poll_interval = Duration::from_millis(100);

    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok((status.code(), false)),
            Ok(None) => {
                if start.elapsed() >= timeout {
                    // SIGKILL on Unix, TerminateProcess on Windows.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok((None, true));
                }
                std::thread::sleep(poll_interval);
            }
            Err(e) => {
                return Err(LoomError::Llm(format!(
                    "failed to check process status: {}",
                    e
                )));
            }
        }
    }
}

fn last_lines(text: &str, count: usize) -> String {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let start = lines.len().saturating_sub(count);
    lines[start..].join("\n")
}
