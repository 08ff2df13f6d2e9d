//! Scan execution route

use crate::client_ip::ClientIp;
use crate::error::ApiError;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sg_core::ScanRequest;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct RunScanBody {
    #[serde(default)]
    pub target_id: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
}

impl From<RunScanBody> for ScanRequest {
    fn from(body: RunScanBody) -> Self {
        ScanRequest::new(body.target_id.unwrap_or_default(), body.flags.unwrap_or_default())
    }
}

#[derive(Serialize)]
pub struct ScanResponse {
    pub status: &'static str,
    pub output: String,
}

/// Missing, unparsable, non-object and empty-object bodies are all rejected
fn parse_body(payload: Result<Json<Value>, JsonRejection>) -> Result<RunScanBody, ApiError> {
    let Json(value) = payload.map_err(|rejection| {
        tracing::debug!("Rejected scan body: {}", rejection);
        ApiError::InvalidJson
    })?;

    match value {
        Value::Object(map) if !map.is_empty() => {
            serde_json::from_value::<RunScanBody>(Value::Object(map)).map_err(|e| {
                tracing::debug!("Scan body has wrong shape: {}", e);
                ApiError::InvalidJson
            })
        }
        _ => Err(ApiError::InvalidJson),
    }
}

pub async fn run_sqlmap(
    State(state): State<Arc<AppState>>,
    ClientIp(client): ClientIp,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let request: ScanRequest = parse_body(payload)?.into();

    let outcome = state.gate.run(&client, &request).await?;

    Ok(Json(ScanResponse {
        status: "success",
        output: outcome.output,
    }))
}
