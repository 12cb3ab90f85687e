//! axumサーバー起動・シャットダウンハンドリング

use crate::common::error::ProbeError;
use crate::AppState;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// メトリクス公開用のリスナーをバインドする
///
/// バインドに失敗した場合は公開先がないので起動を中止させる。
pub async fn bind(bind_addr: &str) -> Result<TcpListener, ProbeError> {
    TcpListener::bind(bind_addr)
        .await
        .map_err(|source| ProbeError::Bind {
            addr: bind_addr.to_string(),
            source,
        })
}

/// バインド済みリスナーでサーバーを起動し、シャットダウンまで待機する
///
/// 終了時は`cancel`もキャンセルされ、スケジューラーが止まる。
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    cancel: CancellationToken,
) -> Result<(), ProbeError> {
    let app = crate::api::create_app(state);

    if let Ok(addr) = listener.local_addr() {
        info!("wsprobe metrics endpoint listening on http://{}/metrics", addr);
    }

    let result = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel.clone()))
        .await
        .map_err(ProbeError::Server);

    cancel.cancel();
    info!("Server shutdown complete");
    result
}

/// アドレスをバインドしてサーバーを起動する
pub async fn run(
    state: AppState,
    bind_addr: &str,
    cancel: CancellationToken,
) -> Result<(), ProbeError> {
    let listener = bind(bind_addr).await?;
    serve(listener, state, cancel).await
}

/// シャットダウンシグナルを待機
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = cancel.cancelled() => {
            info!("Shutdown requested, shutting down...");
        }
    }
}
