//! probe サブコマンド
//!
//! 1回だけスイープを実行し、結果をJSONで標準出力に書き出す。

use clap::Args;
use serde::Serialize;
use std::sync::Arc;

use super::ProbeArgs;
use crate::bootstrap::build_prober;
use crate::config::ProbeConfig;
use crate::probe::WebSocketConnector;
use crate::types::probe::ProbeBatch;

/// probe サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ProbeOnceArgs {
    /// Pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pub pretty: bool,

    /// Probe settings
    #[command(flatten)]
    pub probe: ProbeArgs,
}

#[derive(Debug, Serialize)]
struct SweepReport<'a> {
    up: usize,
    total: usize,
    #[serde(flatten)]
    batch: &'a ProbeBatch,
}

/// バッチをJSON文字列に変換する
pub fn render(batch: &ProbeBatch, pretty: bool) -> Result<String, serde_json::Error> {
    let report = SweepReport {
        up: batch.up_count(),
        total: batch.results.len(),
        batch,
    };
    if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
}

/// Execute the probe command
///
/// 全エンドポイントが接続できた場合に`true`を返す。
pub async fn execute(args: ProbeOnceArgs) -> Result<bool, anyhow::Error> {
    let config = ProbeConfig::resolve(args.probe.into_overrides()?)?;
    let prober = build_prober(&config, Arc::new(WebSocketConnector::new()))?;

    let batch = prober.sweep().await;
    println!("{}", render(&batch, args.pretty)?);
    Ok(batch.all_up())
}
