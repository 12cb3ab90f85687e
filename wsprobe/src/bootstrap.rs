//! 起動時の初期化ロジック
//!
//! 設定からレジストリ・プローバー・ブリッジを組み立て、
//! 収集モードに応じてスケジューラーを起動する。

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::common::error::ProbeError;
use crate::config::{ProbeConfig, ServerConfig};
use crate::metrics::{CollectMode, MetricsBridge};
use crate::probe::{Connector, ProbeScheduler, Prober, WebSocketConnector};
use crate::registry::EndpointRegistry;
use crate::AppState;

/// 初期化結果
pub struct InitContext {
    /// アプリケーション状態
    pub state: AppState,
    /// バックグラウンドスケジューラー（`sync`モードでは`None`）
    pub scheduler: Option<JoinHandle<()>>,
}

/// 設定からプローバーを組み立てる
pub fn build_prober(
    config: &ProbeConfig,
    connector: Arc<dyn Connector>,
) -> Result<Prober, ProbeError> {
    let registry = EndpointRegistry::from_uris(&config.endpoints)?;
    Ok(Prober::new(registry, connector)
        .with_timeout(config.timeout)
        .with_parallel(config.parallel))
}

/// コンポーネントを初期化する
///
/// `cached`モードではここでスケジューラーを起動し、初回スイープが即座に始まる。
pub fn initialize(
    config: &ProbeConfig,
    connector: Arc<dyn Connector>,
    cancel: CancellationToken,
) -> Result<InitContext, ProbeError> {
    let prober = build_prober(config, connector)?;
    let bridge = MetricsBridge::new(prober.clone(), config.mode)?;

    info!(
        endpoints = prober.registry().len(),
        mode = %config.mode,
        interval_secs = config.interval.as_secs(),
        timeout_ms = config.timeout.as_millis() as u64,
        parallel = config.parallel,
        "Probe configuration loaded"
    );

    let scheduler = match config.mode {
        CollectMode::Cached => Some(
            ProbeScheduler::new(prober, bridge.clone())
                .with_delay(config.interval)
                .start(cancel),
        ),
        CollectMode::Synchronous => {
            warn!(
                "Synchronous collect mode: every scrape probes all endpoints; \
                 keep the total probe time below the scrape timeout"
            );
            None
        }
    };

    Ok(InitContext {
        state: AppState { bridge },
        scheduler,
    })
}

/// サーバーを起動し、シャットダウンまで待機する
pub async fn run(server: ServerConfig, config: ProbeConfig) -> Result<(), ProbeError> {
    info!("wsprobe v{}", env!("CARGO_PKG_VERSION"));

    // バインド失敗時はスケジューラーを起動せずに終了する
    let listener = crate::server::bind(&server.bind_addr()).await?;

    let cancel = CancellationToken::new();
    let ctx = initialize(&config, Arc::new(WebSocketConnector::new()), cancel.clone())?;

    let result = crate::server::serve(listener, ctx.state, cancel.clone()).await;
    cancel.cancel();

    if let Some(handle) = ctx.scheduler {
        if let Err(e) = handle.await {
            warn!("Probe scheduler task ended abnormally: {}", e);
        }
    }
    result
}
