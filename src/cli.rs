use clap::{Args, Parser, Subcommand};
use vantage::BookSource;

/// obview: terminal order book viewer backed by a market-data HTTP API.
#[derive(Parser, Debug)]
#[command(name = "obview", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<String>,

    /// Market-data provider base URL
    #[arg(long, default_value = vantage::config::DEFAULT_BASE_URL, global = true)]
    pub base_url: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive order book viewer
    Watch(WatchArgs),

    /// Fetch one order book and print it to stdout
    Snapshot(SnapshotArgs),
}

/// Arguments shared by both subcommands.
#[derive(Args, Debug, Clone)]
pub struct BookArgs {
    /// Quote market (e.g. USD, EUR)
    #[arg(long, default_value = "USD")]
    pub market: String,

    /// Data source: direct, synthetic or sample
    #[arg(long, default_value_t = BookSource::Synthetic)]
    pub source: BookSource,

    /// Fractional digits shown for prices, sizes and totals (0-28)
    #[arg(long, default_value = "2", value_parser = clap::value_parser!(u32).range(0..=28))]
    pub precision: u32,
}

/// Arguments for the `watch` subcommand.
#[derive(Parser, Debug)]
pub struct WatchArgs {
    /// Symbol to load on start (e.g. BTC, ETH); type one in the viewer otherwise
    pub symbol: Option<String>,

    #[command(flatten)]
    pub book: BookArgs,

    /// Re-fetch the current symbol periodically
    #[arg(long)]
    pub auto_refresh: bool,

    /// Refresh period in seconds
    #[arg(long, default_value = "3600")]
    pub refresh_secs: u64,
}

/// Arguments for the `snapshot` subcommand.
#[derive(Parser, Debug)]
pub struct SnapshotArgs {
    /// Symbol to fetch (e.g. BTC, ETH)
    pub symbol: String,

    #[command(flatten)]
    pub book: BookArgs,

    /// Output as JSON instead of TSV
    #[arg(long)]
    pub json: bool,
}
