//! エクスポーターを実ポートで起動するユーティリティ

use std::net::SocketAddr;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use wsprobe::common::error::ProbeError;
use wsprobe::AppState;

/// テスト用エクスポーター
#[allow(dead_code)]
pub struct TestServer {
    addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<Result<(), ProbeError>>,
}

#[allow(dead_code)]
impl TestServer {
    /// サーバーのベースURL
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// サーバーを停止し、終了を待つ
    pub async fn stop(self) -> Result<(), ProbeError> {
        self.cancel.cancel();
        self.handle.await.unwrap()
    }
}

/// 空きポートでエクスポーターを起動する
#[allow(dead_code)]
pub async fn spawn_exporter(state: AppState) -> TestServer {
    let listener = wsprobe::server::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(wsprobe::server::serve(listener, state, cancel.clone()));
    TestServer {
        addr,
        cancel,
        handle,
    }
}
