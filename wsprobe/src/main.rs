//! wsprobe Server Entry Point

use clap::Parser;
use tracing::error;
use wsprobe::cli::{serve::ServeArgs, Cli, Commands};
use wsprobe::logging;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let guard = match logging::init() {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    let code = match cli.command {
        Some(Commands::Probe(args)) => match wsprobe::cli::probe::execute(args).await {
            Ok(true) => 0,
            Ok(false) => 1,
            Err(e) => {
                error!("Probe failed: {:#}", e);
                1
            }
        },
        Some(Commands::Serve(args)) => run_server(args).await,
        None => run_server(ServeArgs::default()).await,
    };

    // process::exit はデストラクタを実行しないため先にログをフラッシュする
    drop(guard);
    std::process::exit(code);
}

async fn run_server(args: ServeArgs) -> i32 {
    match wsprobe::cli::serve::execute(args).await {
        Ok(()) => 0,
        Err(e) => {
            error!("Server failed: {:#}", e);
            1
        }
    }
}
