//! Prometheusスクレイプハンドラー

use crate::common::error::ProbeError;
use crate::AppState;
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

/// GET /metrics - 現在のプローブ結果をテキスト形式で返す
///
/// 全エンドポイントが落ちていても200で全系列（success=0）を返す。
pub async fn get_metrics(State(state): State<AppState>) -> Result<Response, ProbeError> {
    let body = state.bridge.scrape().await?;
    Ok((
        [(header::CONTENT_TYPE, crate::metrics::content_type())],
        body,
    )
        .into_response())
}
