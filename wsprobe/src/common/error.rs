//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! プローブ個々の失敗はエラーではなく`ProbeResult`のデータとして扱うため、
//! ここに並ぶのは起動時の設定不備とメトリクス公開基盤の障害のみ。

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// wsprobe error type
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Endpoint URI could not be parsed or uses an unsupported scheme
    #[error("Invalid endpoint '{uri}': {reason}")]
    InvalidEndpoint {
        /// 設定値そのまま
        uri: String,
        /// 不正理由
        reason: String,
    },

    /// The same endpoint was configured twice
    #[error("Duplicate endpoint: {0}")]
    DuplicateEndpoint(String),

    /// No endpoints configured
    #[error("No endpoints configured")]
    NoEndpoints,

    /// Config file could not be read
    #[error("Failed to read config file {path}: {source}")]
    ConfigFile {
        /// ファイルパス
        path: String,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Failed to parse config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Metrics listener could not be bound
    #[error("Failed to bind metrics endpoint on {addr}: {source}")]
    Bind {
        /// バインド先アドレス
        addr: String,
        /// 元のI/Oエラー
        #[source]
        source: std::io::Error,
    },

    /// Metrics server terminated with an error
    #[error("Metrics server error: {0}")]
    Server(#[source] std::io::Error),

    /// Prometheus registry / encoder error
    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ProbeError {
    /// Returns a safe error message for scrape clients.
    ///
    /// The `Display` implementation carries full details and is only written
    /// to server logs.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Config(_)
            | Self::InvalidEndpoint { .. }
            | Self::DuplicateEndpoint(_)
            | Self::NoEndpoints
            | Self::ConfigFile { .. }
            | Self::ConfigParse(_) => "Configuration error",
            Self::Bind { .. } | Self::Server(_) => "Server error",
            Self::Metrics(_) => "Metrics encoding failed",
            Self::Serialization(_) => "Serialization failed",
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Request failed");
        (self.status_code(), self.external_message()).into_response()
    }
}
