//! CI output channel.
//!
//! Follows the GitHub runner convention: when `GITHUB_OUTPUT` names a
//! writable file, outputs are appended as `name=value` lines, with
//! multi-line values wrapped in a heredoc-style delimiter. Without the
//! variable, outputs go to stdout in the same format.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Delimiter wrapping multi-line output values.
const MULTILINE_DELIMITER: &str = "SFPACK_OUTPUT";

/// Where CI outputs are recorded: the `GITHUB_OUTPUT` file, or stdout.
#[derive(Debug, Clone)]
pub struct OutputSink {
    path: Option<PathBuf>,
}

impl OutputSink {
    /// Resolve the sink from the environment.
    pub fn from_env() -> Self {
        let path = std::env::var_os("GITHUB_OUTPUT")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self { path }
    }

    /// Append outputs to a specific file.
    pub fn to_file(path: impl AsRef<Path>) -> Self {
        Self {
            path: Some(path.as_ref().to_path_buf()),
        }
    }

    /// Record one output value.
    pub fn set(&self, name: &str, value: &str) -> std::io::Result<()> {
        match &self.path {
            Some(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                write!(file, "{}", render(name, value))?;
            }
            None => print!("{}", render(name, value)),
        }
        Ok(())
    }
}

fn render(name: &str, value: &str) -> String {
    if value.contains('\n') {
        format!("{name}<<{MULTILINE_DELIMITER}\n{value}\n{MULTILINE_DELIMITER}\n")
    } else {
        format!("{name}={value}\n")
    }
}
