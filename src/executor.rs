// file: src/executor.rs
// version: 1.0.0
// guid: 43322df6-3ffb-4b15-aa49-505a6768a427

//! Process execution substrate for the installation pipeline.
//!
//! Every privileged operation the installer performs goes through
//! [`CommandRunner`], which gives the pipeline one place for argv logging,
//! output capture, and timeout enforcement, and gives tests a seam to
//! substitute scripted outcomes for real processes.

use crate::error::{InstallError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error, warn};

/// Default timeout applied to pipeline commands
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// A single external command to execute.
///
/// Commands are always argv vectors handed directly to exec; no shell is
/// involved anywhere in the pipeline. Secret material travels through the
/// optional stdin payload, never through the argv and never into the logs.
#[derive(Clone)]
pub struct CommandRequest {
    pub argv: Vec<String>,
    pub timeout: Duration,
    pub must_succeed: bool,
    pub stdin: Option<String>,
}

impl CommandRequest {
    /// Build a request with the default timeout that must exit zero
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            must_succeed: true,
            stdin: None,
        }
    }

    /// Build a request that runs `argv` inside a chroot of `root`
    pub fn chroot<I, S>(root: &std::path::Path, argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut full = vec!["chroot".to_string(), root.display().to_string()];
        full.extend(argv.into_iter().map(Into::into));
        Self::new(full)
    }

    /// Override the execution timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Mark the command as inspect-only: a non-zero exit is returned to the
    /// caller instead of raised as an error. Timeouts still raise.
    pub fn tolerate_failure(mut self) -> Self {
        self.must_succeed = false;
        self
    }

    /// Attach a payload to feed to the child's stdin
    pub fn with_stdin(mut self, payload: impl Into<String>) -> Self {
        self.stdin = Some(payload.into());
        self
    }

    /// Space-joined argv for logs and error messages
    pub fn display_command(&self) -> String {
        self.argv.join(" ")
    }
}

impl std::fmt::Debug for CommandRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRequest")
            .field("argv", &self.argv)
            .field("timeout", &self.timeout)
            .field("must_succeed", &self.must_succeed)
            .field("stdin", &self.stdin.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Captured outcome of a completed command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub command: String,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandResult {
    /// True when the process exited with status zero
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Execution seam between the pipeline and the operating system
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run one command to completion, capturing its output
    async fn run(&self, request: &CommandRequest) -> Result<CommandResult>;
}

/// [`CommandRunner`] that spawns real processes on the host
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemCommandRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&self, request: &CommandRequest) -> Result<CommandResult> {
        if request.argv.is_empty() {
            return Err(InstallError::validation("empty command vector"));
        }

        debug!("Running command: {}", request.display_command());

        let mut cmd = Command::new(&request.argv[0]);
        cmd.args(&request.argv[1..])
            .stdin(if request.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // The wait future owns the child; dropping it on timeout must
            // also reap the process.
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| InstallError::CommandSpawn {
            command: request.argv[0].clone(),
            source,
        })?;

        if let Some(payload) = &request.stdin {
            let mut stdin = child
                .stdin
                .take()
                .ok_or_else(|| InstallError::validation("child stdin unavailable"))?;
            stdin.write_all(payload.as_bytes()).await?;
            // Dropping the handle closes the pipe so line readers terminate.
            drop(stdin);
        }

        let output = match tokio::time::timeout(request.timeout, child.wait_with_output()).await {
            Ok(done) => done?,
            Err(_) => {
                warn!(
                    "Command timed out after {}s: {}",
                    request.timeout.as_secs(),
                    request.display_command()
                );
                return Err(InstallError::command_timeout(
                    &request.argv,
                    request.timeout.as_secs(),
                ));
            }
        };

        let result = CommandResult {
            command: request.display_command(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            elapsed: start.elapsed(),
        };

        if !result.success() {
            if request.must_succeed {
                error!(
                    "Command failed with status {:?}: {}",
                    result.exit_code, result.command
                );
                return Err(InstallError::command_failed(&request.argv, result.stderr));
            }
            debug!(
                "Command exited with status {:?} (tolerated): {}",
                result.exit_code, result.command
            );
        } else if !result.stderr.trim().is_empty() {
            warn!("Command stderr: {}", result.stderr.trim());
        }

        Ok(result)
    }
}
