mod cli;
mod display;
mod error;
mod output;
mod session;
mod tui;

use std::fs::File;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use cli::Command;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use vantage::{Vantage, VantageConfig};

#[tokio::main]
async fn main() {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("failed to install rustls crypto provider");

    let _ = dotenvy::dotenv(); // load .env if present

    let cli = cli::Cli::parse();
    init_tracing(&cli);

    // Shared cancellation token + signal handlers.
    let cancel = setup_signal_handlers();

    let client = Vantage::new(VantageConfig::from_env(&cli.base_url));

    match cli.command {
        Command::Watch(args) => {
            info!(
                symbol = ?args.symbol,
                market = %args.book.market,
                source = %args.book.source,
                auto_refresh = args.auto_refresh,
                "viewer starting"
            );
            let session = session::SearchSession::new(
                &args.book.market,
                args.book.source,
                args.book.precision,
            );
            let options = tui::WatchOptions {
                initial_symbol: args.symbol,
                refresh: args
                    .auto_refresh
                    .then(|| Duration::from_secs(args.refresh_secs.max(1))),
            };
            if let Err(e) = tui::run_viewer(client, session, options, cancel).await {
                tracing::error!(error = %e, "viewer error");
                std::process::exit(1);
            }
        }

        Command::Snapshot(args) => {
            info!(symbol = %args.symbol, source = %args.book.source, "snapshot");
            let mut stdout = std::io::stdout().lock();
            tokio::select! {
                result = output::run_snapshot(&client, &args, &mut stdout) => {
                    if let Err(e) = result {
                        tracing::error!(error = %e, "snapshot failed");
                        std::process::exit(1);
                    }
                }
                _ = cancel.cancelled() => {
                    info!("snapshot cancelled");
                }
            }
        }
    }
}

/// Install the fmt subscriber.
///
/// The viewer owns the terminal, so it only logs when `--log-file` is given.
fn init_tracing(cli: &cli::Cli) {
    let mut filter = cli
        .log_level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);

    let log_file = match &cli.log_file {
        Some(path) => match File::create(path) {
            Ok(f) => Some(f),
            Err(e) => {
                eprintln!("cannot open log file {path}: {e}");
                None
            }
        },
        None => None,
    };

    if log_file.is_none() && matches!(cli.command, Command::Watch(_)) {
        filter = LevelFilter::OFF;
    }

    let builder = tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false);

    match log_file {
        Some(f) => builder.with_ansi(false).with_writer(Mutex::new(f)).init(),
        None => builder.with_writer(std::io::stderr).init(),
    }
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            let mut sig = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("failed to register SIGTERM handler");
            sig.recv().await;
            info!("received SIGTERM, shutting down");
            cancel_clone.cancel();
        });
    }

    cancel
}
