//! wsprobe
//!
//! WebSocketエンドポイントの死活・接続レイテンシを定期的に計測し、
//! Prometheus形式のメトリクスとして公開するエクスポーター

#![warn(missing_docs)]

/// 共通型定義（エラー型）
pub mod common;

/// HTTP APIハンドラー
pub mod api;

/// 起動時の初期化ロジック
pub mod bootstrap;

/// CLIインターフェース
pub mod cli;

/// 設定管理（CLI・環境変数・設定ファイル）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// メトリクスブリッジ（最新スナップショットとPrometheus変換）
pub mod metrics;

/// プローブ（接続試行・計測・定期実行）
pub mod probe;

/// プローブ対象エンドポイントの登録管理
pub mod registry;

/// axumサーバー起動・シャットダウン
pub mod server;

/// 型定義
pub mod types;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// メトリクスブリッジ
    pub bridge: metrics::MetricsBridge,
}
