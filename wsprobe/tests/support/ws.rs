//! 実ソケットでプローブ対象を用意するユーティリティ

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// テスト用WebSocketサーバー
///
/// dropするとアクセプトループを止める。
#[allow(dead_code)]
pub struct WsServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

#[allow(dead_code)]
impl WsServer {
    /// `ws://`形式のURI
    pub fn uri(&self) -> String {
        format!("ws://{}", self.addr)
    }
}

impl Drop for WsServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// ハンドシェイク前に`delay`だけ待ってから接続を受け入れるサーバーを起動する
#[allow(dead_code)]
pub async fn spawn_ws_server(delay: Duration) -> WsServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await {
                    // クライアントのクローズを待つ
                    use futures::StreamExt;
                    while let Some(Ok(_)) = ws.next().await {}
                }
            });
        }
    });
    WsServer { addr, handle }
}

/// TCP接続は受け付けるがハンドシェイクに応答しないサーバーを起動する
#[allow(dead_code)]
pub async fn spawn_silent_server() -> WsServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    WsServer { addr, handle }
}

/// 何もリッスンしていないアドレス（接続拒否される）
#[allow(dead_code)]
pub async fn refused_uri() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("ws://{}", addr)
}
