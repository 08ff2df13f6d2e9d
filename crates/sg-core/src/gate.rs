//! Scan request gate
//!
//! Each request runs the same linear pipeline:
//!
//! ```text
//! Received -> TargetValidated -> FlagsTokenized -> FlagsPolicyChecked
//!          -> CommandBuilt -> Executed -> ResponseSent
//! ```
//!
//! Every validation step can end the request with a rejection, and nothing is
//! spawned until all of them have passed. The gate keeps no state between
//! requests beyond the immutable registry and deny list.

use crate::audit::{self, AuditEvent};
use crate::command::ScanCommand;
use crate::config::GateConfig;
use crate::policy::{tokenize_flags, FlagPolicy};
use crate::registry::TargetRegistry;
use crate::{CoreError, CoreResult};
use sg_tools::{ExternalTool, Sqlmap, ToolConfig, ToolError};
use std::sync::Arc;
use thiserror::Error;

/// Separates stdout from stderr in the combined output
pub const STDERR_MARKER: &str = "\n[STDERR]\n";

#[derive(Error, Debug)]
pub enum GateError {
    #[error("Malformed flags: {0}")]
    MalformedFlags(String),

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Forbidden flag '{token}' (matches {pattern})")]
    ForbiddenFlag { token: String, pattern: String },

    #[error("Scan timed out after {0} seconds")]
    Timeout(u64),

    #[error("Tool not installed: {0}")]
    ToolUnavailable(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Caller-facing classification of a [`GateError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidRequest,
    Unauthorized,
    ExecutionTimeout,
    ToolUnavailable,
    InternalError,
}

impl ErrorKind {
    pub fn status_code(self) -> u16 {
        match self {
            ErrorKind::InvalidRequest => 400,
            ErrorKind::Unauthorized => 403,
            ErrorKind::ExecutionTimeout => 504,
            ErrorKind::ToolUnavailable | ErrorKind::InternalError => 500,
        }
    }
}

impl GateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GateError::MalformedFlags(_) => ErrorKind::InvalidRequest,
            GateError::UnknownTarget(_) | GateError::ForbiddenFlag { .. } => ErrorKind::Unauthorized,
            GateError::Timeout(_) => ErrorKind::ExecutionTimeout,
            GateError::ToolUnavailable(_) => ErrorKind::ToolUnavailable,
            GateError::Internal(_) => ErrorKind::InternalError,
        }
    }
}

impl From<ToolError> for GateError {
    fn from(err: ToolError) -> Self {
        match err {
            ToolError::NotFound(name) => GateError::ToolUnavailable(name),
            ToolError::Timeout(secs) => GateError::Timeout(secs),
            ToolError::ExecutionFailed(msg) => GateError::Internal(msg),
            ToolError::Io(e) => GateError::Internal(e.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanRequest {
    pub target_id: String,
    pub flags: String,
}

impl ScanRequest {
    pub fn new(target_id: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            flags: flags.into(),
        }
    }
}

/// Result of a scan that finished inside the time bound
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub command: ScanCommand,
    /// Exit status is reported but does not make the scan fail
    pub exit_code: Option<i32>,
    /// stdout, followed by [`STDERR_MARKER`] and stderr when stderr is non-empty
    pub output: String,
    pub duration_ms: u64,
}

pub struct ScanGate {
    registry: TargetRegistry,
    policy: FlagPolicy,
    tool: Arc<dyn ExternalTool>,
}

impl ScanGate {
    pub fn new(registry: TargetRegistry, policy: FlagPolicy, tool: Arc<dyn ExternalTool>) -> Self {
        Self {
            registry,
            policy,
            tool,
        }
    }

    /// Build a gate around the real scanner
    pub fn from_config(config: &GateConfig) -> CoreResult<Self> {
        config.validate()?;

        let tool_config = ToolConfig {
            timeout_secs: config.timeout_secs,
            ..Default::default()
        };
        let tool = Sqlmap::with_name(&config.tool, tool_config)
            .map_err(|e| CoreError::Config(e.to_string()))?;

        Ok(Self::new(
            TargetRegistry::new(config.targets.clone()),
            FlagPolicy::new(&config.forbidden_flags),
            Arc::new(tool),
        ))
    }

    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &FlagPolicy {
        &self.policy
    }

    pub fn tool(&self) -> &dyn ExternalTool {
        self.tool.as_ref()
    }

    /// Validate a request and assemble its command. Pure; spawns nothing.
    pub fn prepare(&self, request: &ScanRequest) -> Result<ScanCommand, GateError> {
        let target_url = self
            .registry
            .resolve(&request.target_id)
            .ok_or_else(|| GateError::UnknownTarget(request.target_id.clone()))?;

        let tokens = tokenize_flags(&request.flags)?;

        if let Some(violation) = self.policy.first_violation(&tokens) {
            return Err(GateError::ForbiddenFlag {
                token: violation.token.to_string(),
                pattern: violation.pattern.to_string(),
            });
        }

        Ok(ScanCommand::build(self.tool.name(), target_url, tokens))
    }

    /// Run a prepared command under the tool's time bound
    pub async fn execute(&self, command: ScanCommand) -> Result<ScanOutcome, GateError> {
        let output = self.tool.execute(command.args()).await?;

        let mut combined = output.stdout;
        if !output.stderr.is_empty() {
            combined.push_str(STDERR_MARKER);
            combined.push_str(&output.stderr);
        }

        Ok(ScanOutcome {
            command,
            exit_code: output.exit_code,
            output: combined,
            duration_ms: output.duration_ms,
        })
    }

    /// Full pipeline with audit logging on behalf of `client`
    pub async fn run(&self, client: &str, request: &ScanRequest) -> Result<ScanOutcome, GateError> {
        let command = match self.prepare(request) {
            Ok(command) => command,
            Err(err) => {
                match &err {
                    GateError::UnknownTarget(id) => {
                        audit::record(client, AuditEvent::InvalidTarget { target_id: id.as_str() })
                    }
                    GateError::ForbiddenFlag { token, .. } => {
                        audit::record(client, AuditEvent::ForbiddenFlag { token: token.as_str() })
                    }
                    _ => tracing::debug!("Rejected request from {}: {}", client, err),
                }
                return Err(err);
            }
        };

        audit::record(
            client,
            AuditEvent::Executing {
                target_id: &request.target_id,
                flags: &request.flags,
            },
        );

        match self.execute(command).await {
            Ok(outcome) => {
                tracing::info!(
                    "Scan of {} finished in {}ms (exit code {:?})",
                    request.target_id,
                    outcome.duration_ms,
                    outcome.exit_code
                );
                Ok(outcome)
            }
            Err(err) => {
                match &err {
                    GateError::Timeout(_) => audit::record(
                        client,
                        AuditEvent::Timeout {
                            target_id: &request.target_id,
                        },
                    ),
                    other => audit::record(
                        client,
                        AuditEvent::Error {
                            detail: other.to_string(),
                        },
                    ),
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{TargetEntry, DEFAULT_FORBIDDEN_FLAGS};
    use async_trait::async_trait;
    use sg_tools::{ToolOutput, ToolResult};
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Behavior {
        Output { stdout: &'static str, stderr: &'static str, code: i32 },
        Missing,
        Timeout,
        Broken,
    }

    struct FakeTool {
        behavior: Behavior,
        calls: AtomicUsize,
        last_args: Mutex<Vec<String>>,
    }

    impl FakeTool {
        fn new(behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                behavior,
                calls: AtomicUsize::new(0),
                last_args: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ExternalTool for FakeTool {
        fn name(&self) -> &str {
            "sqlmap"
        }

        async fn is_available(&self) -> bool {
            !matches!(self.behavior, Behavior::Missing)
        }

        fn executable_path(&self) -> Option<&Path> {
            None
        }

        async fn execute(&self, args: &[String]) -> ToolResult<ToolOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = args.to_vec();
            match &self.behavior {
                Behavior::Output { stdout, stderr, code } => Ok(ToolOutput {
                    stdout: stdout.to_string(),
                    stderr: stderr.to_string(),
                    exit_code: Some(*code),
                    duration_ms: 1,
                }),
                Behavior::Missing => Err(ToolError::NotFound("sqlmap".to_string())),
                Behavior::Timeout => Err(ToolError::Timeout(60)),
                Behavior::Broken => Err(ToolError::Io(std::io::Error::new(
                    std::io::ErrorKind::PermissionDenied,
                    "permission denied",
                ))),
            }
        }
    }

    const URL: &str = "http://testphp.vulnweb.com/listproducts.php?cat=1";

    fn gate(tool: Arc<FakeTool>) -> ScanGate {
        ScanGate::new(
            TargetRegistry::new(vec![TargetEntry::new("lab", URL)]),
            FlagPolicy::new(DEFAULT_FORBIDDEN_FLAGS),
            tool,
        )
    }

    fn ok_tool() -> Arc<FakeTool> {
        FakeTool::new(Behavior::Output {
            stdout: "done",
            stderr: "",
            code: 0,
        })
    }

    #[tokio::test]
    async fn test_unknown_target_never_spawns() {
        let tool = ok_tool();
        let gate = gate(tool.clone());

        for id in ["bad", "", "LAB", URL] {
            let err = gate.run("127.0.0.1", &ScanRequest::new(id, "")).await.unwrap_err();
            assert!(matches!(err, GateError::UnknownTarget(_)));
            assert_eq!(err.kind().status_code(), 403);
        }
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_rejection_does_not_echo_url() {
        let gate = gate(ok_tool());
        let err = gate.run("127.0.0.1", &ScanRequest::new("nope", "")).await.unwrap_err();
        assert!(!err.to_string().contains("vulnweb"));
    }

    #[tokio::test]
    async fn test_unbalanced_quotes_never_spawn() {
        let tool = ok_tool();
        let gate = gate(tool.clone());

        let err = gate
            .run("127.0.0.1", &ScanRequest::new("lab", "--data \"id=1"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_forbidden_flag_after_safe_tokens() {
        let tool = ok_tool();
        let gate = gate(tool.clone());

        let err = gate
            .run("127.0.0.1", &ScanRequest::new("lab", "--threads 5 --level 2 --Os-Shell"))
            .await
            .unwrap_err();

        match &err {
            GateError::ForbiddenFlag { token, .. } => assert_eq!(token, "--Os-Shell"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.kind().status_code(), 403);
        assert_eq!(tool.calls(), 0);
    }

    #[tokio::test]
    async fn test_forbidden_substring_inside_quoted_token() {
        let tool = ok_tool();
        let gate = gate(tool.clone());

        let err = gate
            .run("127.0.0.1", &ScanRequest::new("lab", "--data 'x=1 --file-read=/etc/passwd'"))
            .await
            .unwrap_err();

        assert!(matches!(err, GateError::ForbiddenFlag { .. }));
        assert_eq!(tool.calls(), 0);
    }

    #[test]
    fn test_prepare_builds_exact_argv() {
        let gate = gate(ok_tool());

        let command = gate.prepare(&ScanRequest::new("lab", "")).unwrap();
        assert_eq!(
            command.argv(),
            vec!["sqlmap", "--target", URL, "--batch", "--disable-coloring"]
        );

        let command = gate.prepare(&ScanRequest::new("lab", "--threads 5 --tamper='space2comment'")).unwrap();
        assert_eq!(
            command.argv(),
            vec![
                "sqlmap",
                "--target",
                URL,
                "--batch",
                "--disable-coloring",
                "--threads",
                "5",
                "--tamper=space2comment"
            ]
        );
    }

    #[tokio::test]
    async fn test_success_passes_args_and_keeps_stdout() {
        let tool = ok_tool();
        let gate = gate(tool.clone());

        let outcome = gate
            .run("127.0.0.1", &ScanRequest::new("lab", "--threads 5"))
            .await
            .unwrap();

        assert_eq!(outcome.output, "done");
        assert_eq!(tool.calls(), 1);
        assert_eq!(
            *tool.last_args.lock().unwrap(),
            vec!["--target", URL, "--batch", "--disable-coloring", "--threads", "5"]
        );
    }

    #[tokio::test]
    async fn test_stderr_appended_after_marker() {
        let tool = FakeTool::new(Behavior::Output {
            stdout: "stdout text",
            stderr: "warning text",
            code: 1,
        });
        let gate = gate(tool);

        let outcome = gate.run("127.0.0.1", &ScanRequest::new("lab", "")).await.unwrap();

        assert_eq!(outcome.output, "stdout text\n[STDERR]\nwarning text");
        assert_eq!(outcome.exit_code, Some(1));
    }

    #[tokio::test]
    async fn test_tool_failures_map_to_taxonomy() {
        let err = gate(FakeTool::new(Behavior::Missing))
            .run("127.0.0.1", &ScanRequest::new("lab", "--threads 5"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ToolUnavailable);
        assert_eq!(err.kind().status_code(), 500);

        let err = gate(FakeTool::new(Behavior::Timeout))
            .run("127.0.0.1", &ScanRequest::new("lab", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExecutionTimeout);
        assert_eq!(err.kind().status_code(), 504);

        let err = gate(FakeTool::new(Behavior::Broken))
            .run("127.0.0.1", &ScanRequest::new("lab", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
    }

    #[test]
    fn test_from_config_with_missing_tool() {
        let config = GateConfig {
            tool: "sqlmap-not-installed-anywhere".to_string(),
            ..Default::default()
        };
        let gate = ScanGate::from_config(&config).unwrap();

        assert_eq!(gate.tool().name(), "sqlmap-not-installed-anywhere");
        assert_eq!(gate.registry().len(), 2);
        assert_eq!(gate.policy().patterns().len(), 17);
    }
}
