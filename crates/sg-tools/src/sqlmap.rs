//! sqlmap integration
//!
//! sqlmap is an open source SQL injection detection and exploitation tool.
//! Only process launching lives here; which arguments are acceptable is the
//! gate's decision.

use crate::{run_command, ExternalTool, ToolConfig, ToolError, ToolOutput, ToolResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Default invocation name
pub const SQLMAP: &str = "sqlmap";

/// sqlmap wrapper
pub struct Sqlmap {
    name: String,
    config: ToolConfig,
    executable: Option<PathBuf>,
}

impl Sqlmap {
    pub fn new(config: ToolConfig) -> ToolResult<Self> {
        Self::with_name(SQLMAP, config)
    }

    /// Wrap a differently named build of the tool (e.g. `sqlmap.py`)
    pub fn with_name(name: &str, config: ToolConfig) -> ToolResult<Self> {
        if name.trim().is_empty() {
            return Err(ToolError::NotFound("empty tool name".to_string()));
        }

        let executable = config
            .tool_paths
            .get(name)
            .cloned()
            .or_else(|| crate::get_command_path(name));

        if executable.is_none() {
            tracing::warn!("{} not found in PATH yet; it is looked up again on each scan", name);
        }

        Ok(Self {
            name: name.to_string(),
            config,
            executable,
        })
    }

    /// Path found at construction, or a fresh PATH lookup if there was none
    fn resolve(&self) -> Option<PathBuf> {
        self.executable
            .clone()
            .or_else(|| crate::get_command_path(&self.name))
    }
}

#[async_trait]
impl ExternalTool for Sqlmap {
    fn name(&self) -> &str {
        &self.name
    }

    async fn is_available(&self) -> bool {
        self.resolve().is_some()
    }

    fn executable_path(&self) -> Option<&Path> {
        self.executable.as_deref()
    }

    async fn execute(&self, args: &[String]) -> ToolResult<ToolOutput> {
        let exe = self
            .resolve()
            .ok_or_else(|| ToolError::NotFound(self.name.clone()))?;

        tracing::debug!("Spawning {} with {} arguments", exe.display(), args.len());

        run_command(&exe, args, self.config.timeout_secs).await
    }
}
