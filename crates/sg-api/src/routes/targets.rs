//! Target listing

use crate::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct TargetsResponse {
    pub targets: Vec<String>,
}

/// Identifiers only; resolved URLs stay server-side
pub async fn list_targets(State(state): State<Arc<AppState>>) -> Json<TargetsResponse> {
    Json(TargetsResponse {
        targets: state.gate.registry().ids().map(str::to_string).collect(),
    })
}
