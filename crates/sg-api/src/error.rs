//! Error types and their HTTP rendering
//!
//! Response bodies only ever carry the fixed messages below; details stay in
//! the server log.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use sg_core::{CoreError, ErrorKind, GateError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid JSON body")]
    InvalidJson,

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error("rate limit of {per_minute}/min exceeded")]
    RateLimited { per_minute: u32, retry_after_secs: u64 },
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: Some(message.into()),
            output: None,
        }
    }

    fn output(output: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: None,
            output: Some(output.into()),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidJson => StatusCode::BAD_REQUEST,
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Gate(err) => match err.kind() {
                ErrorKind::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorKind::Unauthorized => StatusCode::FORBIDDEN,
                ErrorKind::ExecutionTimeout => StatusCode::GATEWAY_TIMEOUT,
                ErrorKind::ToolUnavailable | ErrorKind::InternalError => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::InvalidJson => ErrorBody::message("Invalid JSON"),
            ApiError::RateLimited { per_minute, .. } => {
                ErrorBody::message(format!("Rate limit exceeded: {} per 1 minute", per_minute))
            }
            ApiError::Gate(err) => match err {
                GateError::MalformedFlags(_) => {
                    ErrorBody::message("Invalid flags format (unbalanced quotes).")
                }
                GateError::UnknownTarget(_) => ErrorBody::message(
                    "Target ID is not valid or not registered in the whitelist.",
                ),
                GateError::ForbiddenFlag { token, .. } => ErrorBody::message(format!(
                    "Security Alert: Flag '{}' is not allowed in this educational environment.",
                    token
                )),
                GateError::Timeout(secs) => ErrorBody::output(format!(
                    "Process forcibly stopped (timeout {} seconds). The query is too heavy for this demo.",
                    secs
                )),
                GateError::ToolUnavailable(_) => {
                    ErrorBody::message("SQLMap is not installed on the server (tool not installed).")
                }
                GateError::Internal(_) => ErrorBody::message("Internal Server Error"),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self.body());

        match self {
            ApiError::RateLimited { retry_after_secs, .. } => (
                status,
                [(header::RETRY_AFTER, retry_after_secs.to_string())],
                body,
            )
                .into_response(),
            _ => (status, body).into_response(),
        }
    }
}
