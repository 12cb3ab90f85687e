//! 接続試行（トランスポート層）
//!
//! `Connector`は1回の接続確立だけを担当し、結果を明示的な型で返す。
//! タイムアウトと計時は`Prober`側で行う。

use async_trait::async_trait;
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Error as WsError;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::debug;

use crate::types::endpoint::Endpoint;

/// 接続確立に失敗した理由
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConnectError {
    /// 相手側が能動的に拒否した
    #[error("refused: {0}")]
    Refused(String),
    /// それ以外の失敗
    #[error("failed: {0}")]
    Failed(String),
}

/// 確立済み接続
///
/// プローブは到達性だけを測るので、確立後すぐに`close`される。
#[async_trait]
pub trait ProbeConnection: Send {
    /// 接続を閉じる（失敗は無視してよい）
    async fn close(self: Box<Self>);
}

/// エンドポイントへの接続を試行する
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// 接続を1回だけ試行する
    async fn connect(&self, endpoint: &Endpoint)
        -> Result<Box<dyn ProbeConnection>, ConnectError>;
}

/// WebSocketハンドシェイクまでを行うコネクタ
///
/// `ws://`は平文TCP、`wss://`はrustls（webpkiルート）でTLS接続する。
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

impl WebSocketConnector {
    /// 新しいコネクタを作成
    pub fn new() -> Self {
        Self
    }
}

struct WebSocketConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl ProbeConnection for WebSocketConnection {
    async fn close(self: Box<Self>) {
        let mut stream = self.stream;
        if let Err(e) = stream.close(None).await {
            debug!(error = %e, "WebSocket close failed");
        }
    }
}

#[async_trait]
impl Connector for WebSocketConnector {
    async fn connect(
        &self,
        endpoint: &Endpoint,
    ) -> Result<Box<dyn ProbeConnection>, ConnectError> {
        match connect_async(endpoint.address()).await {
            Ok((stream, _response)) => Ok(Box::new(WebSocketConnection { stream })),
            Err(e) => Err(classify_ws_error(e)),
        }
    }
}

/// tungsteniteのエラーを拒否/その他に分類する
pub fn classify_ws_error(error: WsError) -> ConnectError {
    match error {
        WsError::Io(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
            ConnectError::Refused(e.to_string())
        }
        // アップグレードを101以外で拒否された
        WsError::Http(response) => ConnectError::Refused(format!(
            "handshake rejected with HTTP {}",
            response.status()
        )),
        other => ConnectError::Failed(other.to_string()),
    }
}
