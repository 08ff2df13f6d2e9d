//! Security audit trail
//!
//! Every blocked, executed, timed-out or failed scan produces one line of the
//! form `<client ip> - <message>` under the `audit` tracing target.

use std::fmt;

pub const AUDIT_TARGET: &str = "audit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent<'a> {
    InvalidTarget { target_id: &'a str },
    ForbiddenFlag { token: &'a str },
    Executing { target_id: &'a str, flags: &'a str },
    Timeout { target_id: &'a str },
    Error { detail: String },
}

impl fmt::Display for AuditEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditEvent::InvalidTarget { target_id } => {
                write!(f, "BLOCKED: Invalid target_id '{}'", target_id)
            }
            AuditEvent::ForbiddenFlag { token } => {
                write!(f, "BLOCKED: User attempted forbidden flag '{}'", token)
            }
            AuditEvent::Executing { target_id, flags } => {
                write!(f, "EXECUTING: Target={} Flags={}", target_id, flags)
            }
            AuditEvent::Timeout { target_id } => write!(f, "TIMEOUT: Target={}", target_id),
            AuditEvent::Error { detail } => write!(f, "ERROR: {}", detail),
        }
    }
}

/// Format a line without emitting it
pub fn audit_line(client: &str, event: &AuditEvent<'_>) -> String {
    format!("{} - {}", client, event)
}

pub fn record(client: &str, event: AuditEvent<'_>) {
    match event {
        AuditEvent::Error { .. } => tracing::error!(target: AUDIT_TARGET, "{}", audit_line(client, &event)),
        AuditEvent::Executing { .. } => tracing::info!(target: AUDIT_TARGET, "{}", audit_line(client, &event)),
        _ => tracing::warn!(target: AUDIT_TARGET, "{}", audit_line(client, &event)),
    }
}
