//! メトリクスブリッジ
//!
//! 最新の`ProbeBatch`を1スロットのスナップショットとして保持し、
//! スクレイプ時にゲージへ変換する。
//!
//! # 収集モード
//!
//! - `cached`: スケジューラーが独自のタイマーでプローブし、スクレイプは
//!   その時点のスナップショットを即座に返す（デフォルト）。
//! - `sync`: スクレイプごとに全エンドポイントを同期的にプローブする。
//!   スクレイプのレイテンシがスイープ全体の所要時間になるため、
//!   Prometheusのscrape_timeoutを超えないよう注意すること。

pub mod collector;

use arc_swap::ArcSwap;
use prometheus::{Registry, TextEncoder};
use serde::Deserialize;
use std::sync::Arc;
use tracing::debug;

use crate::common::error::ProbeError;
use crate::probe::prober::Prober;
use crate::types::probe::ProbeBatch;
use collector::ProbeCollector;

/// スクレイプ時の収集モード
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    /// バックグラウンドスケジューラーの最新結果を返す
    #[default]
    Cached,
    /// スクレイプのたびにスイープする
    #[serde(rename = "sync")]
    #[value(name = "sync")]
    Synchronous,
}

impl CollectMode {
    /// CollectModeを文字列に変換
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Synchronous => "sync",
        }
    }
}

impl std::str::FromStr for CollectMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "cached" => Ok(Self::Cached),
            "sync" | "synchronous" => Ok(Self::Synchronous),
            other => Err(format!("unknown collect mode '{other}' (expected cached or sync)")),
        }
    }
}

impl std::fmt::Display for CollectMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// メトリクスブリッジ
///
/// クローンは同じスナップショットとレジストリを共有する。
#[derive(Clone)]
pub struct MetricsBridge {
    /// 現在公開中のバッチ（丸ごと差し替える）
    latest: Arc<ArcSwap<ProbeBatch>>,
    /// 同期モードで使うプローバー
    prober: Prober,
    /// 収集モード
    mode: CollectMode,
    /// Prometheusレジストリ
    registry: Registry,
}

impl MetricsBridge {
    /// 新しいブリッジを作成
    ///
    /// 初回スイープまでは全エンドポイント`success=0`のプレースホルダを公開する。
    pub fn new(prober: Prober, mode: CollectMode) -> Result<Self, ProbeError> {
        let latest = Arc::new(ArcSwap::from_pointee(ProbeBatch::pending(
            prober.registry().list(),
        )));

        let registry = Registry::new();
        registry.register(Box::new(ProbeCollector::new(latest.clone())?))?;

        Ok(Self {
            latest,
            prober,
            mode,
            registry,
        })
    }

    /// 収集モード
    pub fn mode(&self) -> CollectMode {
        self.mode
    }

    /// Prometheusレジストリ
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 新しいバッチを公開する
    ///
    /// 現在より古いスイープ番号のバッチは捨てる（同期モードの同時スクレイプ対策）。
    pub fn publish(&self, batch: ProbeBatch) {
        let batch = Arc::new(batch);
        let previous = self.latest.rcu(|current| {
            if current.cycle < batch.cycle {
                Arc::clone(&batch)
            } else {
                Arc::clone(current)
            }
        });
        if previous.cycle >= batch.cycle {
            debug!(
                cycle = batch.cycle,
                current = previous.cycle,
                "Discarded stale probe batch"
            );
        }
    }

    /// 現在公開中のバッチ
    pub fn snapshot(&self) -> Arc<ProbeBatch> {
        self.latest.load_full()
    }

    /// スクレイプ時点のバッチ
    ///
    /// `sync`モードではここでスイープを実行し、その結果を公開してから返す。
    pub async fn current(&self) -> Arc<ProbeBatch> {
        match self.mode {
            CollectMode::Cached => self.snapshot(),
            CollectMode::Synchronous => {
                let batch = self.prober.sweep().await;
                let cycle = batch.cycle;
                self.publish(batch);
                let snapshot = self.snapshot();
                debug!(cycle, exposed = snapshot.cycle, "Synchronous probe sweep completed");
                snapshot
            }
        }
    }

    /// 現在のスナップショットをテキスト形式でエンコードする
    pub fn encode(&self) -> Result<String, ProbeError> {
        let families = self.registry.gather();
        Ok(TextEncoder::new().encode_to_string(&families)?)
    }

    /// スクレイプ1回分の応答本文
    pub async fn scrape(&self) -> Result<String, ProbeError> {
        if self.mode == CollectMode::Synchronous {
            self.current().await;
        }
        self.encode()
    }
}

/// テキスト形式のContent-Type
pub fn content_type() -> &'static str {
    prometheus::TEXT_FORMAT
}
