//! Bounded subprocess execution.
//!
//! One attempt per call: the child is spawned in the working directory, its
//! stdout and stderr are captured, and it is killed if the timeout elapses.
//! On unix the child leads its own process group so a timeout also reaches
//! anything it spawned.

use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

#[cfg(unix)]
use nix::sys::signal::{self, Signal};
#[cfg(unix)]
use nix::unistd::Pid;

use crate::error::{AgentError, Result};

/// Captured result of a successful (exit code 0) process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl ProcessOutput {
    /// Stdout followed by stderr.
    pub fn combined(&self) -> String {
        let mut combined = self.stdout.clone();
        combined.push_str(&self.stderr);
        combined
    }
}

/// Runs a command vector with a working directory and a timeout.
#[derive(Debug, Clone, Default)]
pub struct ProcessExecutor {
    env: BTreeMap<String, String>,
}

impl ProcessExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra environment variables for the child, on top of the inherited ones.
    pub fn with_env<I, K, V>(mut self, env: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env
            .extend(env.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Blocking execution on a private current-thread runtime.
    ///
    /// Inside a tokio runtime this returns `InvalidArgument`; use
    /// [`execute_async`](Self::execute_async) there.
    pub fn execute(
        &self,
        command: &[String],
        working_directory: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(AgentError::InvalidArgument(
                "blocking execute called inside a tokio runtime; use execute_async".to_string(),
            ));
        }
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AgentError::io("Failed to create tokio runtime", e))?;
        runtime.block_on(self.execute_async(command, working_directory, timeout))
    }

    pub async fn execute_async(
        &self,
        command: &[String],
        working_directory: &Path,
        timeout: Duration,
    ) -> Result<ProcessOutput> {
        let (program, args) = command.split_first().ok_or_else(|| {
            AgentError::InvalidArgument("command must not be empty".to_string())
        })?;

        debug!(
            "Executing {} with {} argument(s) in {}",
            program,
            args.len(),
            working_directory.display()
        );

        let mut cmd = Command::new(program);
        #[cfg(unix)]
        cmd.process_group(0);
        let mut child = cmd
            .args(args)
            .current_dir(working_directory)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                    AgentError::ExecutableNotFound {
                        command: program.clone(),
                        source: Some(e),
                    }
                }
                _ => AgentError::io(format!("Failed to start {}", program), e),
            })?;

        let pid = child.id();
        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let start = Instant::now();

        let run = tokio::time::timeout(timeout, async {
            tokio::join!(child.wait(), read_stream(stdout), read_stream(stderr))
        })
        .await;

        let (status, stdout, stderr) = match run {
            Ok(results) => results,
            Err(_) => {
                warn!(
                    "{} timed out after {:?}, killing process",
                    program, timeout
                );
                kill_process_group(pid);
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill timed out process {}: {}", program, e);
                }
                return Err(AgentError::Timeout { duration: timeout });
            }
        };

        let status = status.map_err(|e| AgentError::io(format!("Failed to wait for {}", program), e))?;
        let stdout = stdout.map_err(|e| AgentError::io("Failed to read process stdout", e))?;
        let stderr = stderr.map_err(|e| AgentError::io("Failed to read process stderr", e))?;

        let exit_code = status.code().unwrap_or(-1);
        let output = ProcessOutput {
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration: start.elapsed(),
        };
        debug!(
            "{} exited with {} after {:?} ({} bytes of output)",
            program,
            exit_code,
            output.duration,
            output.stdout.len()
        );

        if !status.success() {
            return Err(AgentError::ProcessExecution {
                exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}

/// SIGKILL the whole group led by `pid`; the direct child is reaped separately.
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    let Some(pid) = pid else { return };
    match signal::killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
        Ok(()) | Err(nix::errno::Errno::ESRCH) => {}
        Err(e) => warn!("Failed to kill process group {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}

async fn read_stream<R: AsyncRead + Unpin>(reader: Option<R>) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader {
        reader.read_to_end(&mut buf).await?;
    }
    Ok(buf)
}
