//! External Tool Integration
//!
//! Process plumbing for the scanners the gate is allowed to launch: locating
//! the executable, spawning it with a discrete argument vector and enforcing
//! a wall-clock bound on its lifetime.

pub mod sqlmap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;

pub use sqlmap::Sqlmap;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {0}")]
    ExecutionFailed(String),

    #[error("Tool timeout after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ToolResult<T> = Result<T, ToolError>;

/// Trait for external tool integrations
#[async_trait]
pub trait ExternalTool: Send + Sync {
    /// Invocation name, used as argv[0] when describing a command
    fn name(&self) -> &str;

    /// Check if tool is available
    async fn is_available(&self) -> bool;

    /// Get tool executable path
    fn executable_path(&self) -> Option<&Path>;

    /// Run the tool with `args` (argv without the program) under the
    /// configured timeout.
    async fn execute(&self, args: &[String]) -> ToolResult<ToolOutput>;
}

/// Captured result of a process that exited on its own
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
    pub duration_ms: u64,
}

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Custom tool paths (if not in PATH)
    pub tool_paths: HashMap<String, PathBuf>,

    /// Wall-clock bound for each invocation (seconds)
    pub timeout_secs: u64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            tool_paths: HashMap::new(),
            timeout_secs: 60,
        }
    }
}

/// Run a command with timeout.
///
/// Arguments are handed to the OS one by one; nothing goes through a shell.
/// When the bound expires the child is killed and reaped before returning.
pub async fn run_command<S: AsRef<OsStr>>(
    cmd: &Path,
    args: &[S],
    timeout_secs: u64,
) -> ToolResult<ToolOutput> {
    use tokio::io::AsyncReadExt;
    use tokio::process::Command;
    use tokio::time::{timeout, Duration};

    let start = std::time::Instant::now();

    let mut child = Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ToolError::NotFound(cmd.display().to_string()),
            _ => ToolError::Io(e),
        })?;

    let mut stdout_pipe = child
        .stdout
        .take()
        .ok_or_else(|| ToolError::ExecutionFailed("stdout was not captured".to_string()))?;
    let mut stderr_pipe = child
        .stderr
        .take()
        .ok_or_else(|| ToolError::ExecutionFailed("stderr was not captured".to_string()))?;

    let mut stdout = Vec::new();
    let mut stderr = Vec::new();

    let result = timeout(Duration::from_secs(timeout_secs), async {
        let (status, out, err) = tokio::join!(
            child.wait(),
            stdout_pipe.read_to_end(&mut stdout),
            stderr_pipe.read_to_end(&mut stderr),
        );
        out?;
        err?;
        status
    })
    .await;

    match result {
        Ok(Ok(status)) => Ok(ToolOutput {
            stdout: String::from_utf8_lossy(&stdout).to_string(),
            stderr: String::from_utf8_lossy(&stderr).to_string(),
            exit_code: status.code(),
            duration_ms: start.elapsed().as_millis() as u64,
        }),
        Ok(Err(e)) => Err(ToolError::ExecutionFailed(e.to_string())),
        Err(_) => {
            // kill() also waits, so no zombie is left behind
            if let Err(e) = child.kill().await {
                tracing::warn!("Failed to kill {} after timeout: {}", cmd.display(), e);
            }
            Err(ToolError::Timeout(timeout_secs))
        }
    }
}

/// Get command path
pub fn get_command_path(cmd: &str) -> Option<PathBuf> {
    which::which(cmd).ok()
}
