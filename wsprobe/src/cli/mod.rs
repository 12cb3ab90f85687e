//! CLI module for wsprobe
//!
//! Provides the `serve` (default) and one-shot `probe` subcommands.

pub mod probe;
pub mod serve;

use clap::{Args, Parser, Subcommand};

use crate::common::error::ProbeError;
use crate::config::ProbeOverrides;
use crate::metrics::CollectMode;

/// WebSocket liveness and latency prober with a Prometheus exporter
#[derive(Parser, Debug)]
#[command(name = "wsprobe")]
#[command(version, about, long_about = None)]
#[command(after_help = r#"ENVIRONMENT VARIABLES:
    WSPROBE_HOST            Bind address (default: 127.0.0.1, legacy: PROMETHEUS_ADDR)
    WSPROBE_PORT            Listen port (default: 9000, legacy: PROMETHEUS_PORT)
    WSPROBE_ENDPOINTS       Comma separated ws:// or wss:// URIs (legacy: URI_LIST)
    WSPROBE_CONFIG          Path to a YAML config file
    WSPROBE_INTERVAL_SECS   Rest period between sweeps (default: 10, legacy: SLEEP_DELAY)
    WSPROBE_TIMEOUT_MS      Per-endpoint connect timeout (default: 5000)
    WSPROBE_PARALLEL        Probe endpoints concurrently within a sweep (default: false)
    WSPROBE_MODE            Collect mode: cached or sync (default: cached)
    WSPROBE_LOG_LEVEL       Log level (default: info, legacy: RUST_LOG)
    WSPROBE_LOG_DIR         Also write daily rotated log files to this directory
"#)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the metrics exporter (default)
    Serve(serve::ServeArgs),
    /// Run a single sweep, print the results as JSON and exit
    Probe(probe::ProbeOnceArgs),
}

/// プローブ設定の共通引数
///
/// 未指定の値は環境変数（旧名を含む）・設定ファイル・デフォルトの順に解決される。
#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Endpoint URI to probe (repeatable or comma separated)
    #[arg(short, long = "endpoint", value_delimiter = ',')]
    pub endpoints: Vec<String>,

    /// YAML config file
    #[arg(short, long)]
    pub config: Option<std::path::PathBuf>,

    /// Rest period between sweeps in seconds
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Connect timeout per endpoint in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Probe all endpoints of a sweep concurrently
    #[arg(long, default_value_t = false)]
    pub parallel: bool,

    /// Collect mode
    #[arg(long, value_enum)]
    pub mode: Option<CollectMode>,
}

impl ProbeArgs {
    /// 環境変数の値にCLI引数を重ねた上書き値を作る
    pub fn into_overrides(self) -> Result<ProbeOverrides, ProbeError> {
        let env = ProbeOverrides::from_env()?;
        Ok(self.apply_to(env))
    }

    fn apply_to(self, mut overrides: ProbeOverrides) -> ProbeOverrides {
        if !self.endpoints.is_empty() {
            overrides.endpoints = self.endpoints;
        }
        if self.config.is_some() {
            overrides.config_path = self.config;
        }
        if self.interval_secs.is_some() {
            overrides.interval_secs = self.interval_secs;
        }
        if self.timeout_ms.is_some() {
            overrides.timeout_ms = self.timeout_ms;
        }
        if self.parallel {
            overrides.parallel = Some(true);
        }
        if self.mode.is_some() {
            overrides.mode = self.mode;
        }
        overrides
    }
}
