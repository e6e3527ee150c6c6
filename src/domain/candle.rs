use chrono::{DateTime, Utc};

/// One hourly kline as returned by the exchange.
///
/// Prices are plain `f64`: every downstream consumer is a numeric
/// feature/model pipeline, not an accounting path.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCandle {
    pub open_time: DateTime<Utc>,
    pub close_time: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_asset_volume: f64,
    pub trade_count: u64,
}

impl HourlyCandle {
    /// Numeric consistency: High >= Low >= 0, finite prices, non-negative volume.
    /// Rows failing this are skipped upstream instead of aborting the run.
    pub fn is_consistent(&self) -> bool {
        self.low >= 0.0
            && self.high >= self.low
            && self.volume >= 0.0
            && [self.open, self.high, self.low, self.close, self.volume]
                .iter()
                .all(|v| v.is_finite())
    }
}

/// 24-hour rolling ticker statistics for the pair, repeated onto every
/// feature row the way the source dataset lays them out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ticker24h {
    pub price_change: f64,
    pub price_change_percent: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub weighted_avg_price: f64,
}
