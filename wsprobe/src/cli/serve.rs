//! serve サブコマンド
//!
//! メトリクスエクスポーターを起動します。

use clap::Args;

use super::ProbeArgs;
use crate::config::{ProbeConfig, ServerConfig};

/// serve サブコマンドの引数
#[derive(Args, Debug, Clone, Default)]
pub struct ServeArgs {
    /// Listen port [default: 9000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Bind address [default: 127.0.0.1]
    #[arg(short = 'H', long)]
    pub host: Option<String>,

    /// Probe settings
    #[command(flatten)]
    pub probe: ProbeArgs,
}

impl ServeArgs {
    /// 環境変数の値にCLI引数を重ねたサーバー設定
    pub fn server_config(&self) -> ServerConfig {
        let env = ServerConfig::from_env();
        ServerConfig::from_args(
            self.host.clone().unwrap_or(env.host),
            self.port.unwrap_or(env.port),
        )
    }
}

/// Execute the serve command
pub async fn execute(args: ServeArgs) -> Result<(), anyhow::Error> {
    let server = args.server_config();
    let config = ProbeConfig::resolve(args.probe.into_overrides()?)?;
    crate::bootstrap::run(server, config).await?;
    Ok(())
}
