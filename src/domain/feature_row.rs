use serde::Serialize;

/// One row of the engineered feature table, written through `csv`.
///
/// Raw candle columns come first, then the 24h ticker snapshot (identical on
/// every row of a run), then the derived indicators. Indicator columns are
/// `Option<f64>` so that warm-up rows serialize as empty cells; the modeling
/// loader drops rows with empty cells.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureRow {
    pub open_time: String,
    pub close_time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub quote_asset_volume: f64,
    pub trade_count: u64,

    pub price_change_24h: f64,
    pub price_change_percent_24h: f64,
    pub high_price_24h: f64,
    pub low_price_24h: f64,
    pub weighted_avg_price_24h: f64,

    pub hourly_return: Option<f64>,
    pub hourly_range: f64,
    pub range_pct: f64,

    pub volatility_4h: Option<f64>,
    pub volatility_8h: Option<f64>,
    pub volatility_24h: Option<f64>,

    pub atr_4h: Option<f64>,
    pub atr_8h: Option<f64>,
    pub atr_24h: Option<f64>,

    pub bb_upper_4h: Option<f64>,
    pub bb_lower_4h: Option<f64>,
    pub bb_width_4h: Option<f64>,
    pub bb_upper_8h: Option<f64>,
    pub bb_lower_8h: Option<f64>,
    pub bb_width_8h: Option<f64>,
    pub bb_upper_24h: Option<f64>,
    pub bb_lower_24h: Option<f64>,
    pub bb_width_24h: Option<f64>,

    pub ema_4h: Option<f64>,
    pub ema_8h: Option<f64>,
    pub ema_24h: Option<f64>,

    pub rsi_6h: Option<f64>,
    pub rsi_14h: Option<f64>,
    pub rsi_24h: Option<f64>,

    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_diff: Option<f64>,

    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,

    pub volume_ma_4h: Option<f64>,
    pub volume_ma_8h: Option<f64>,
    pub volume_ma_24h: Option<f64>,
    pub volume_ratio: Option<f64>,

    pub vwap: Option<f64>,
    pub vwap_distance: Option<f64>,
}
