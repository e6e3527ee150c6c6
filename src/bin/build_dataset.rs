//! Stage 1: fetch hourly klines + 24h ticker for one pair and save the
//! engineered volatility feature table as a timestamped CSV.
//!
//! # Usage
//! ```sh
//! cargo run --bin build_dataset -- --symbol BTCUSDT --limit 1000
//! ```

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use volcast::application::feature_pipeline::build_feature_table;
use volcast::config::Config;
use volcast::domain::ports::MarketDataSource;
use volcast::infrastructure::binance::BinanceClient;
use volcast::infrastructure::csv_store::write_feature_table;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Trading pair in exchange notation
    #[arg(short, long, default_value = "BTCUSDT")]
    symbol: String,

    /// Kline interval (exchange notation, e.g. 1h)
    #[arg(long, default_value = "1h")]
    interval: String,

    /// Number of klines to request (exchange caps at 1000)
    #[arg(long, default_value_t = 1000)]
    limit: u32,

    /// Directory for the output CSV
    #[arg(long, default_value = "data")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();
    let config = Config::from_env()?;

    info!(
        "Building volatility feature dataset for {} ({} x {})",
        args.symbol, args.interval, args.limit
    );

    let client = BinanceClient::builder()
        .base_url(config.base_url)
        .api_key(config.api_key)
        .build();

    let candles = client
        .fetch_klines(&args.symbol, &args.interval, args.limit)
        .await?;
    let ticker = client.fetch_ticker_24h(&args.symbol).await?;

    let rows = build_feature_table(&candles, &ticker);
    let path = write_feature_table(&rows, &args.output_dir, &args.symbol)?;

    info!("Done. Feature table written to {}", path.display());
    Ok(())
}
