//! プローブ結果の診断用API

use crate::common::error::ProbeError;
use crate::types::probe::ProbeBatch;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
struct ProbesResponse<'a> {
    mode: &'static str,
    up: usize,
    total: usize,
    #[serde(flatten)]
    batch: &'a ProbeBatch,
}

/// GET /api/probes - 現在公開中のバッチをJSONで返す
pub async fn get_probes(State(state): State<AppState>) -> Result<Json<Value>, ProbeError> {
    let batch = state.bridge.current().await;
    let body = ProbesResponse {
        mode: state.bridge.mode().as_str(),
        up: batch.up_count(),
        total: batch.results.len(),
        batch: &batch,
    };
    Ok(Json(serde_json::to_value(&body)?))
}

/// GET /health - エクスポーター自身の生存確認
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") })),
    )
}
