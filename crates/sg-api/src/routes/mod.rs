//! API routes

pub mod scans;
pub mod targets;

use crate::AppState;
use axum::{extract::State, response::Html, Json};
use serde::Serialize;
use std::sync::Arc;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub tool_available: bool,
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        tool_available: state.gate.tool().is_available().await,
    })
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
