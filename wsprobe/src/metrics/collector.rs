//! Prometheusコレクター
//!
//! `collect()`のたびに最新バッチを1回だけ読み出し、そこから新しいゲージを組み立てる。
//! 共有ゲージを書き換えないので、同時スクレイプでも1つのスイープの値だけが返る。

use arc_swap::ArcSwap;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, GaugeVec, Opts};
use std::sync::Arc;
use tracing::warn;

use crate::types::probe::ProbeBatch;

/// 接続成否ゲージ名
pub const SUCCESS_METRIC: &str = "websocket_probe_success";
/// 接続レイテンシゲージ名（ミリ秒）
pub const LATENCY_METRIC: &str = "websocket_probe_latency";
/// 公開中バッチのスイープ番号ゲージ名
pub const CYCLE_METRIC: &str = "websocket_probe_cycle";
/// エンドポイントラベル名
pub const ENDPOINT_LABEL: &str = "endpoint";

fn success_vec() -> prometheus::Result<GaugeVec> {
    GaugeVec::new(
        Opts::new(SUCCESS_METRIC, "1 if websocket is up, 0 otherwise"),
        &[ENDPOINT_LABEL],
    )
}

fn latency_vec() -> prometheus::Result<GaugeVec> {
    GaugeVec::new(
        Opts::new(LATENCY_METRIC, "latency in connection (milliseconds)"),
        &[ENDPOINT_LABEL],
    )
}

fn cycle_gauge() -> prometheus::Result<Gauge> {
    Gauge::with_opts(Opts::new(
        CYCLE_METRIC,
        "probe sweep number of the exposed results (0 before the first sweep)",
    ))
}

/// レイテンシを小数点以下2桁に丸める
pub fn round_latency(latency_ms: f64) -> f64 {
    (latency_ms * 100.0).round() / 100.0
}

/// バッチからメトリクスファミリーを組み立てる
pub fn families_for(batch: &ProbeBatch) -> prometheus::Result<Vec<MetricFamily>> {
    let success = success_vec()?;
    let latency = latency_vec()?;
    let cycle = cycle_gauge()?;

    for result in &batch.results {
        let labels = [result.endpoint.as_str()];
        success
            .with_label_values(&labels)
            .set(if result.success { 1.0 } else { 0.0 });
        latency
            .with_label_values(&labels)
            .set(round_latency(result.latency_ms));
    }
    cycle.set(batch.cycle as f64);

    let mut families = Vec::with_capacity(3);
    // 子を持たないファミリーはエンコーダが拒否する
    if !batch.results.is_empty() {
        families.extend(success.collect());
        families.extend(latency.collect());
    }
    families.extend(cycle.collect());
    Ok(families)
}

/// 最新バッチを公開するコレクター
pub struct ProbeCollector {
    latest: Arc<ArcSwap<ProbeBatch>>,
    descs: Vec<Desc>,
}

impl ProbeCollector {
    /// 新しいコレクターを作成
    pub fn new(latest: Arc<ArcSwap<ProbeBatch>>) -> prometheus::Result<Self> {
        let mut descs = Vec::new();
        descs.extend(success_vec()?.desc().into_iter().cloned());
        descs.extend(latency_vec()?.desc().into_iter().cloned());
        descs.extend(cycle_gauge()?.desc().into_iter().cloned());
        Ok(Self { latest, descs })
    }
}

impl Collector for ProbeCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let batch = self.latest.load_full();
        match families_for(&batch) {
            Ok(families) => families,
            Err(e) => {
                warn!(cycle = batch.cycle, error = %e, "Failed to build probe metrics");
                Vec::new()
            }
        }
    }
}
