//! ロギング初期化
//!
//! - `WSPROBE_LOG_LEVEL`（旧: `RUST_LOG`）: EnvFilter形式のレベル指定。未設定なら`info`
//! - `WSPROBE_LOG_DIR`: 設定時は標準出力に加えて日次ローテーションのファイルにも出力

use anyhow::Context;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::{get_env_with_fallback, get_env_with_fallback_or};

/// ログファイル名のプレフィックス
const LOG_FILE_PREFIX: &str = "wsprobe.log";

/// ファイル出力のバックグラウンドライターを保持するガード
///
/// dropされると未書き込みのログがフラッシュされるため、`main`の終了まで保持すること。
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// ログレベル指定を解決する
fn log_filter() -> String {
    get_env_with_fallback_or("WSPROBE_LOG_LEVEL", "RUST_LOG", "info")
}

/// ログ出力先ディレクトリを解決する
fn log_dir() -> Option<PathBuf> {
    get_env_with_fallback("WSPROBE_LOG_DIR", "WSPROBE_LOG_PATH").map(PathBuf::from)
}

/// グローバルsubscriberを初期化する
pub fn init() -> anyhow::Result<LoggingGuard> {
    let filter_spec = log_filter();
    let filter = EnvFilter::try_new(&filter_spec)
        .with_context(|| format!("invalid log filter '{filter_spec}'"))?;

    let stdout_layer = fmt::layer().with_target(false);

    let (file_layer, file_guard) = match log_dir() {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(LoggingGuard { _file: file_guard })
}
