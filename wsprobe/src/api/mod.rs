//! HTTP APIハンドラー
//!
//! メトリクス公開（`/metrics`）と診断用エンドポイント

pub mod metrics;
pub mod probes;

use crate::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

/// アプリケーションルーターを作成
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/metrics", get(metrics::get_metrics))
        .route("/health", get(probes::health))
        .route("/api/probes", get(probes::get_probes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
