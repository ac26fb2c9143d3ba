//! External command execution with JSON output classification.
//!
//! Runs one child process per call and classifies the result: exit code
//! zero with parseable JSON stdout is a success, anything else is a
//! negative outcome carrying the raw output for diagnosis. Retrying,
//! where it happens at all, belongs to callers.

use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::error::{PackagingError, Result};

/// A fully-formed CLI invocation (first element of `args` excluded;
/// the executable lives in `program`).
#[derive(Debug, Clone)]
pub struct CliCommand {
    /// Executable name or path.
    pub program: String,

    /// Arguments, one per element. Callers must request JSON output
    /// themselves (`--json`).
    pub args: Vec<String>,
}

impl CliCommand {
    /// Build an invocation of `program` with the given arguments.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Render the full command line for logging.
    pub fn display(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Outcome of a single CLI invocation.
///
/// A non-zero exit is a normal negative result, not an error: the
/// raw output is preserved verbatim in `error` so callers can surface
/// the provider's own diagnostics.
#[derive(Debug, Clone)]
pub struct CliOutcome {
    /// Whether the process exited zero with parseable JSON stdout.
    pub ok: bool,

    /// Parsed JSON stdout (present when `ok`).
    pub payload: Option<serde_json::Value>,

    /// Raw stdout + stderr, verbatim (present when not `ok`).
    pub error: Option<String>,
}

/// Execute a command and classify its output.
///
/// Spawns exactly one child process. Only a failure to launch the
/// process at all maps to `Err`; a process that ran and exited
/// non-zero (or printed something other than JSON) comes back as
/// `ok = false`.
pub async fn execute(cmd: &CliCommand) -> Result<CliOutcome> {
    debug!(command = %cmd.display(), "Executing CLI command");

    let output = Command::new(&cmd.program)
        .args(&cmd.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|source| PackagingError::Spawn {
            program: cmd.program.clone(),
            source,
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();

    if output.status.success() {
        match serde_json::from_str::<serde_json::Value>(&stdout) {
            Ok(payload) => {
                return Ok(CliOutcome {
                    ok: true,
                    payload: Some(payload),
                    error: None,
                });
            }
            Err(parse_err) => {
                debug!(error = %parse_err, "CLI exited zero but stdout is not JSON");
            }
        }
    }

    // Keep the provider's own words intact for upstream surfacing.
    let mut raw = stdout;
    if !stderr.is_empty() {
        if !raw.is_empty() {
            raw.push('\n');
        }
        raw.push_str(&stderr);
    }

    Ok(CliOutcome {
        ok: false,
        payload: None,
        error: Some(raw),
    })
}
