//! Interface definitions (ports) between the application layer and
//! infrastructure adapters.

use crate::domain::candle::{HourlyCandle, Ticker24h};
use anyhow::Result;
use async_trait::async_trait;

/// Source of raw market data for the dataset-building stage.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch up to `limit` historical klines for `symbol` at `interval`
    /// (exchange notation, e.g. "1h"), oldest first.
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<HourlyCandle>>;

    /// Fetch the rolling 24-hour ticker statistics for `symbol`.
    async fn fetch_ticker_24h(&self, symbol: &str) -> Result<Ticker24h>;
}
