//! Configuration management
//!
//! Settings come from three layers, highest priority first:
//! CLI arguments / environment variables, an optional YAML config file,
//! then built-in defaults. Environment helpers fall back to the deprecated
//! variable names used by earlier deployments (`PROMETHEUS_ADDR`,
//! `PROMETHEUS_PORT`, `SLEEP_DELAY`) with a warning log.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::common::error::ProbeError;
use crate::metrics::CollectMode;
use crate::probe::prober::DEFAULT_CONNECT_TIMEOUT_SECS;
use crate::probe::scheduler::DEFAULT_PROBE_INTERVAL_SECS;

/// Default bind address of the metrics endpoint
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port of the metrics endpoint
pub const DEFAULT_PORT: u16 = 9000;

/// Get an environment variable with fallback to a deprecated name
///
/// If the new variable name is set, returns its value.
/// If only the old (deprecated) variable name is set, returns its value
/// and logs a deprecation warning.
///
/// # Example
/// ```
/// use wsprobe::config::get_env_with_fallback;
///
/// let port = get_env_with_fallback("WSPROBE_PORT", "PROMETHEUS_PORT");
/// ```
pub fn get_env_with_fallback(new_name: &str, old_name: &str) -> Option<String> {
    if let Ok(val) = std::env::var(new_name) {
        return Some(val);
    }
    if let Ok(val) = std::env::var(old_name) {
        tracing::warn!(
            "Environment variable '{}' is deprecated, use '{}' instead",
            old_name,
            new_name
        );
        return Some(val);
    }
    None
}

/// Get an environment variable with fallback and default value
pub fn get_env_with_fallback_or(new_name: &str, old_name: &str, default: &str) -> String {
    get_env_with_fallback(new_name, old_name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable with fallback, parsing to a specific type
///
/// Returns `None` when neither variable is set or the value does not parse.
pub fn get_env_with_fallback_parse<T: std::str::FromStr>(
    new_name: &str,
    old_name: &str,
) -> Option<T> {
    get_env_with_fallback(new_name, old_name).and_then(|s| s.trim().parse().ok())
}

/// `true/1/yes/on` を真とみなす
fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// カンマ区切りのエンドポイント一覧を分解する
fn split_endpoints(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Metrics endpoint bind settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Listen port
    pub port: u16,
}

impl ServerConfig {
    /// Load from `WSPROBE_HOST` / `WSPROBE_PORT` (legacy: `PROMETHEUS_ADDR` / `PROMETHEUS_PORT`)
    pub fn from_env() -> Self {
        let host = get_env_with_fallback_or("WSPROBE_HOST", "PROMETHEUS_ADDR", DEFAULT_HOST);
        let port =
            get_env_with_fallback_parse("WSPROBE_PORT", "PROMETHEUS_PORT").unwrap_or(DEFAULT_PORT);
        Self { host, port }
    }

    /// Build from parsed CLI arguments
    pub fn from_args(host: String, port: u16) -> Self {
        Self { host, port }
    }

    /// `host:port` for binding
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// YAML設定ファイルの内容
///
/// ```yaml
/// endpoints:
///   - ws://127.0.0.1:8080/feed
///   - wss://stream.example.com/v1
/// interval_secs: 10
/// timeout_ms: 5000
/// parallel: false
/// mode: cached
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// プローブ対象URI（順序はそのままレジストリ順になる）
    #[serde(default)]
    pub endpoints: Vec<String>,
    /// スイープ間の休止時間（秒）
    pub interval_secs: Option<u64>,
    /// 接続試行のタイムアウト（ミリ秒）
    pub timeout_ms: Option<u64>,
    /// スイープ内で並列にプローブするか
    pub parallel: Option<bool>,
    /// 収集モード
    pub mode: Option<CollectMode>,
}

impl FileConfig {
    /// ファイルから読み込む
    pub fn load(path: &Path) -> Result<Self, ProbeError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProbeError::ConfigFile {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    /// YAML文字列から読み込む
    pub fn parse(content: &str) -> Result<Self, ProbeError> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// CLI引数や環境変数による上書き値
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProbeOverrides {
    /// エンドポイント（空ならファイルの値を使う）
    pub endpoints: Vec<String>,
    /// 設定ファイルのパス
    pub config_path: Option<PathBuf>,
    /// 休止時間（秒）
    pub interval_secs: Option<u64>,
    /// タイムアウト（ミリ秒）
    pub timeout_ms: Option<u64>,
    /// 並列プローブ
    pub parallel: Option<bool>,
    /// 収集モード
    pub mode: Option<CollectMode>,
}

impl ProbeOverrides {
    /// 環境変数から読み込む
    pub fn from_env() -> Result<Self, ProbeError> {
        let mode = match get_env_with_fallback("WSPROBE_MODE", "WSPROBE_COLLECT_MODE") {
            Some(value) => Some(value.parse().map_err(ProbeError::Config)?),
            None => None,
        };

        Ok(Self {
            endpoints: get_env_with_fallback("WSPROBE_ENDPOINTS", "URI_LIST")
                .map(|value| split_endpoints(&value))
                .unwrap_or_default(),
            config_path: std::env::var_os("WSPROBE_CONFIG").map(PathBuf::from),
            interval_secs: get_env_with_fallback_parse("WSPROBE_INTERVAL_SECS", "SLEEP_DELAY"),
            timeout_ms: get_env_with_fallback_parse("WSPROBE_TIMEOUT_MS", "WSPROBE_TIMEOUT"),
            parallel: std::env::var("WSPROBE_PARALLEL")
                .ok()
                .map(|value| parse_flag(&value)),
            mode,
        })
    }
}

/// 解決済みのプローブ設定
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeConfig {
    /// プローブ対象URI（レジストリ順）
    pub endpoints: Vec<String>,
    /// スイープ間の休止時間
    pub interval: Duration,
    /// 接続試行のタイムアウト
    pub timeout: Duration,
    /// スイープ内で並列にプローブするか
    pub parallel: bool,
    /// 収集モード
    pub mode: CollectMode,
}

impl ProbeConfig {
    /// 上書き値・設定ファイル・デフォルトを合成する
    pub fn resolve(overrides: ProbeOverrides) -> Result<Self, ProbeError> {
        let file = match &overrides.config_path {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(overrides, file)
    }

    /// 上書き値を優先して設定ファイルの値と合成する
    pub fn merge(overrides: ProbeOverrides, file: FileConfig) -> Result<Self, ProbeError> {
        let endpoints = if overrides.endpoints.is_empty() {
            file.endpoints
        } else {
            overrides.endpoints
        };
        if endpoints.is_empty() {
            return Err(ProbeError::NoEndpoints);
        }

        let interval_secs = overrides
            .interval_secs
            .or(file.interval_secs)
            .unwrap_or(DEFAULT_PROBE_INTERVAL_SECS);
        if interval_secs == 0 {
            return Err(ProbeError::Config(
                "interval must be greater than zero".to_string(),
            ));
        }
        let timeout_ms = overrides
            .timeout_ms
            .or(file.timeout_ms)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS * 1_000);
        if timeout_ms == 0 {
            return Err(ProbeError::Config(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            endpoints,
            interval: Duration::from_secs(interval_secs),
            timeout: Duration::from_millis(timeout_ms),
            parallel: overrides.parallel.or(file.parallel).unwrap_or(false),
            mode: overrides.mode.or(file.mode).unwrap_or_default(),
        })
    }
}
