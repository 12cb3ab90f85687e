//! エンドポイントプローバー
//!
//! 1スイープでレジストリの全エンドポイントに1回ずつ接続を試行し、
//! レジストリ順に1エンドポイント1結果の`ProbeBatch`を作る。
//! 個々の失敗は`ProbeResult`のデータとして記録し、スイープは中断しない。

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{timeout, Instant};
use tracing::{debug, error, info, warn};

use super::connector::{ConnectError, Connector};
use crate::registry::endpoints::EndpointRegistry;
use crate::types::endpoint::Endpoint;
use crate::types::probe::{ProbeBatch, ProbeOutcome, ProbeResult};

/// 接続試行のデフォルトタイムアウト（秒）
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// 確立済み接続のクローズに許す時間（ミリ秒）
const CLOSE_GRACE_MS: u64 = 1_000;

/// エンドポイントプローバー
///
/// クローンは同じコネクタとスイープ番号カウンタを共有する。
#[derive(Clone)]
pub struct Prober {
    /// プローブ対象
    registry: EndpointRegistry,
    /// 接続試行の実装
    connector: Arc<dyn Connector>,
    /// エンドポイントごとのタイムアウト
    connect_timeout: Duration,
    /// スイープ内で並列にプローブするか
    parallel: bool,
    /// 最後に払い出したスイープ番号
    cycle: Arc<AtomicU64>,
}

impl Prober {
    /// 新しいプローバーを作成
    pub fn new(registry: EndpointRegistry, connector: Arc<dyn Connector>) -> Self {
        Self {
            registry,
            connector,
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS),
            parallel: false,
            cycle: Arc::new(AtomicU64::new(0)),
        }
    }

    /// タイムアウトを設定
    pub fn with_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// 並列プローブを設定
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// プローブ対象
    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// エンドポイントごとのタイムアウト
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// 全エンドポイントを1回ずつプローブする
    pub async fn sweep(&self) -> ProbeBatch {
        let cycle = self.cycle.fetch_add(1, Ordering::SeqCst) + 1;
        let started_at = Utc::now();
        let endpoints = self.registry.list();

        debug!(
            cycle,
            count = endpoints.len(),
            parallel = self.parallel,
            "Starting probe sweep"
        );

        let mut results = Vec::with_capacity(endpoints.len());
        if self.parallel {
            // 先に全タスクを起動し、登録順にjoinする
            let handles: Vec<_> = endpoints
                .iter()
                .map(|endpoint| (endpoint, self.spawn_probe(endpoint)))
                .collect();
            for (endpoint, handle) in handles {
                results.push(join_probe(endpoint, handle).await);
            }
        } else {
            for endpoint in endpoints {
                let handle = self.spawn_probe(endpoint);
                results.push(join_probe(endpoint, handle).await);
            }
        }

        ProbeBatch {
            cycle,
            started_at,
            completed_at: Utc::now(),
            results,
        }
    }

    /// 単一エンドポイントのプローブ
    pub async fn probe_endpoint(&self, endpoint: &Endpoint) -> ProbeResult {
        let start = Instant::now();

        let result = match timeout(self.connect_timeout, self.connector.connect(endpoint)).await {
            Ok(Ok(connection)) => {
                let elapsed = start.elapsed();
                if timeout(Duration::from_millis(CLOSE_GRACE_MS), connection.close())
                    .await
                    .is_err()
                {
                    debug!(endpoint = %endpoint, "Close did not finish in time; dropping connection");
                }
                ProbeResult::connected(endpoint, elapsed)
            }
            Ok(Err(ConnectError::Refused(reason))) => {
                ProbeResult::failed(endpoint, ProbeOutcome::Refused, start.elapsed(), reason)
            }
            Ok(Err(ConnectError::Failed(reason))) => {
                ProbeResult::failed(endpoint, ProbeOutcome::Error, start.elapsed(), reason)
            }
            Err(_) => ProbeResult::failed(
                endpoint,
                ProbeOutcome::TimedOut,
                start.elapsed().min(self.connect_timeout),
                format!(
                    "no response within {} ms",
                    self.connect_timeout.as_millis()
                ),
            ),
        };

        log_result(&result);
        result
    }

    fn spawn_probe(&self, endpoint: &Endpoint) -> tokio::task::JoinHandle<ProbeResult> {
        let prober = self.clone();
        let endpoint = endpoint.clone();
        tokio::spawn(async move { prober.probe_endpoint(&endpoint).await })
    }
}

/// プローブタスクの完了を待つ
///
/// タスクがpanicした場合もそのエンドポイントの失敗として記録する。
async fn join_probe(
    endpoint: &Endpoint,
    handle: tokio::task::JoinHandle<ProbeResult>,
) -> ProbeResult {
    match handle.await {
        Ok(result) => result,
        Err(e) => {
            error!(endpoint = %endpoint, error = %e, "Probe task join error");
            ProbeResult::failed(
                endpoint,
                ProbeOutcome::Error,
                Duration::ZERO,
                format!("probe task failed: {e}"),
            )
        }
    }
}

fn log_result(result: &ProbeResult) {
    if result.success {
        info!(
            endpoint = %result.endpoint,
            latency_ms = result.latency_ms,
            "Endpoint up"
        );
    } else {
        warn!(
            endpoint = %result.endpoint,
            latency_ms = result.latency_ms,
            outcome = %result.outcome,
            reason = ?result.reason,
            "Endpoint down"
        );
    }
}
