//! Locating agent CLI executables.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::process::ProcessExecutor;
use crate::error::{AgentError, Result};

/// How long a `--version` probe may take.
pub const VERSION_CHECK_TIMEOUT: Duration = Duration::from_secs(10);

/// Resolve the executable for `name`.
///
/// An explicit override is used as-is when it points at an existing file, and
/// is otherwise looked up on `PATH` like a bare name.
pub fn find_executable(name: &str, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return which::which(path).map_err(|_| AgentError::ExecutableNotFound {
            command: path.display().to_string(),
            source: None,
        });
    }

    match which::which(name) {
        Ok(path) => {
            debug!("Found {} at {}", name, path.display());
            Ok(path)
        }
        Err(_) => Err(AgentError::ExecutableNotFound {
            command: name.to_string(),
            source: None,
        }),
    }
}

/// Outcome of probing an agent CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliAvailability {
    Available { path: PathBuf, version: String },
    Unavailable { reason: String },
}

impl CliAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, CliAvailability::Available { .. })
    }

    /// Locate the executable and run `<exe> --version`.
    pub fn check(name: &str, explicit: Option<&Path>) -> Self {
        let path = match find_executable(name, explicit) {
            Ok(path) => path,
            Err(e) => {
                return CliAvailability::Unavailable {
                    reason: e.to_string(),
                };
            }
        };

        let command = vec![path.display().to_string(), "--version".to_string()];
        let cwd = std::env::temp_dir();
        match ProcessExecutor::new().execute(&command, &cwd, VERSION_CHECK_TIMEOUT) {
            Ok(output) => CliAvailability::Available {
                path,
                version: output.stdout.trim().to_string(),
            },
            Err(e) => CliAvailability::Unavailable {
                reason: format!("{} --version failed: {}", name, e),
            },
        }
    }
}
