//! プローブスケジューラー
//!
//! 起動直後に1回、その後はスイープ完了から一定時間休んで次のスイープを行う。
//! 固定レートではないので、スイープが休止時間より長くても追い付き処理はしない。

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::prober::Prober;
use crate::metrics::MetricsBridge;

/// デフォルトの休止時間（秒）
pub const DEFAULT_PROBE_INTERVAL_SECS: u64 = 10;

/// プローブスケジューラー
pub struct ProbeScheduler {
    /// プローバー
    prober: Prober,
    /// 結果の公開先
    bridge: MetricsBridge,
    /// スイープ間の休止時間
    delay: Duration,
}

impl ProbeScheduler {
    /// 新しいスケジューラーを作成
    pub fn new(prober: Prober, bridge: MetricsBridge) -> Self {
        Self {
            prober,
            bridge,
            delay: Duration::from_secs(DEFAULT_PROBE_INTERVAL_SECS),
        }
    }

    /// 休止時間を設定
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// バックグラウンドで開始
    pub fn start(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(self.run(cancel))
    }

    /// キャンセルされるまでスイープを繰り返す
    pub async fn run(self, cancel: CancellationToken) {
        info!(
            delay_secs = self.delay.as_secs_f64(),
            endpoints = self.prober.registry().len(),
            "Probe scheduler started"
        );

        loop {
            // RUNNING
            let batch = tokio::select! {
                _ = cancel.cancelled() => break,
                batch = self.prober.sweep() => batch,
            };

            info!(
                cycle = batch.cycle,
                up = batch.up_count(),
                total = batch.results.len(),
                "Probe sweep completed"
            );
            self.bridge.publish(batch);

            // WAITING
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.delay) => {
                    debug!("Probe delay elapsed");
                }
            }
        }

        info!("Probe scheduler stopped");
    }
}
