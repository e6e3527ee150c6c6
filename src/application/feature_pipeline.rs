//! Hourly volatility feature engineering
//!
//! Single pass over the candle series, oldest first. Standard indicators come
//! from the `ta` crate; rolling return deviation, true-range averages, volume
//! averages and VWAP use the windows in [`crate::application::rolling`]
//! because their pandas-style semantics (sample deviation, plain rolling
//! mean, hard warm-up cutoff) differ from `ta`.
//!
//! Every indicator reports `None` until its window is filled, so the emitted
//! table keeps the warm-up prefix visible instead of backfilling it.

use crate::application::rolling::{RollingVwap, RollingWindow};
use crate::domain::candle::{HourlyCandle, Ticker24h};
use crate::domain::feature_row::FeatureRow;
use ta::indicators::{
    BollingerBands, ExponentialMovingAverage, FastStochastic,
    MovingAverageConvergenceDivergence, RelativeStrengthIndex, SimpleMovingAverage,
};
use ta::{DataItem, Next};
use tracing::warn;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Volatility windows, in hours.
pub const WINDOWS: [usize; 3] = [4, 8, 24];
/// RSI lookback periods, in hours.
pub const RSI_PERIODS: [usize; 3] = [6, 14, 24];

const MACD_FAST: usize = 12;
const MACD_SLOW: usize = 26;
const MACD_SIGNAL: usize = 9;
const STOCH_PERIOD: usize = 14;
const STOCH_SMOOTH: usize = 3;
const VWAP_WINDOW: usize = 24;

fn gate(ready: bool, value: f64) -> Option<f64> {
    if ready { Some(value) } else { None }
}

/// Per-window indicator group (volatility, ATR, Bollinger, EMA, volume MA).
struct WindowBank {
    window: usize,
    ret_std: RollingWindow,
    tr_ma: RollingWindow,
    bb: BollingerBands,
    ema: ExponentialMovingAverage,
    volume_ma: RollingWindow,
}

struct WindowOutput {
    volatility: Option<f64>,
    atr: Option<f64>,
    bb_upper: Option<f64>,
    bb_lower: Option<f64>,
    bb_width: Option<f64>,
    ema: Option<f64>,
    volume_ma: Option<f64>,
}

impl WindowBank {
    fn new(window: usize) -> Self {
        Self {
            window,
            ret_std: RollingWindow::new(window),
            tr_ma: RollingWindow::new(window),
            bb: BollingerBands::new(window, 2.0).expect("window must be > 0"),
            ema: ExponentialMovingAverage::new(window).expect("window must be > 0"),
            volume_ma: RollingWindow::new(window),
        }
    }

    fn update(&mut self, close: f64, ret: Option<f64>, tr: Option<f64>, volume: f64, rows: usize) -> WindowOutput {
        if let Some(r) = ret {
            self.ret_std.push(r);
        }
        // The first true range needs a previous close, so this window fills
        // one row after the price windows.
        if let Some(t) = tr {
            self.tr_ma.push(t);
        }
        self.volume_ma.push(volume);

        let bb = self.bb.next(close);
        let ema = self.ema.next(close);

        let seeded = rows >= self.window;
        WindowOutput {
            volatility: self.ret_std.sample_std(),
            atr: self.tr_ma.mean(),
            bb_upper: gate(seeded, bb.upper),
            bb_lower: gate(seeded, bb.lower),
            bb_width: gate(seeded && close > 0.0, (bb.upper - bb.lower) / close),
            ema: gate(seeded, ema),
            volume_ma: self.volume_ma.mean(),
        }
    }
}

/// Stateful engineering pipeline; feed candles oldest first.
pub struct FeaturePipeline {
    bank_4h: WindowBank,
    bank_8h: WindowBank,
    bank_24h: WindowBank,
    rsi_6h: RelativeStrengthIndex,
    rsi_14h: RelativeStrengthIndex,
    rsi_24h: RelativeStrengthIndex,
    macd: MovingAverageConvergenceDivergence,
    stoch_k: FastStochastic,
    stoch_d: SimpleMovingAverage,
    vwap: RollingVwap,
    prev_close: Option<f64>,
    rows: usize,
}

impl FeaturePipeline {
    pub fn new() -> Self {
        Self {
            bank_4h: WindowBank::new(WINDOWS[0]),
            bank_8h: WindowBank::new(WINDOWS[1]),
            bank_24h: WindowBank::new(WINDOWS[2]),
            rsi_6h: RelativeStrengthIndex::new(RSI_PERIODS[0]).expect("period must be > 0"),
            rsi_14h: RelativeStrengthIndex::new(RSI_PERIODS[1]).expect("period must be > 0"),
            rsi_24h: RelativeStrengthIndex::new(RSI_PERIODS[2]).expect("period must be > 0"),
            macd: MovingAverageConvergenceDivergence::new(MACD_FAST, MACD_SLOW, MACD_SIGNAL)
                .expect("MACD periods must be valid"),
            stoch_k: FastStochastic::new(STOCH_PERIOD).expect("period must be > 0"),
            stoch_d: SimpleMovingAverage::new(STOCH_SMOOTH).expect("period must be > 0"),
            vwap: RollingVwap::new(VWAP_WINDOW),
            prev_close: None,
            rows: 0,
        }
    }

    pub fn process(&mut self, candle: &HourlyCandle, ticker: &Ticker24h) -> FeatureRow {
        self.rows += 1;
        let rows = self.rows;
        let close = candle.close;

        let ret = self
            .prev_close
            .filter(|p| *p > 0.0)
            .map(|p| (close - p) / p);

        // True range against the previous close; undefined on the first row.
        let tr = self.prev_close.map(|p| {
            (candle.high - candle.low)
                .max((candle.high - p).abs())
                .max((candle.low - p).abs())
        });

        let item = DataItem::builder()
            .open(candle.open)
            .high(candle.high)
            .low(candle.low)
            .close(close)
            .volume(candle.volume)
            .build()
            .unwrap_or_else(|e| {
                warn!(
                    "Candle at {} failed DataItem validation ({e:?}); flattening to close price",
                    candle.open_time
                );
                DataItem::builder()
                    .open(close)
                    .high(close)
                    .low(close)
                    .close(close)
                    .volume(0.0)
                    .build()
                    .unwrap()
            });

        let out_4h = self.bank_4h.update(close, ret, tr, candle.volume, rows);
        let out_8h = self.bank_8h.update(close, ret, tr, candle.volume, rows);
        let out_24h = self.bank_24h.update(close, ret, tr, candle.volume, rows);

        let rsi_6 = self.rsi_6h.next(close);
        let rsi_14 = self.rsi_14h.next(close);
        let rsi_24 = self.rsi_24h.next(close);

        let macd_val = self.macd.next(close);
        let k = self.stoch_k.next(&item);
        let d = self.stoch_d.next(k);

        let vwap = self.vwap.next(candle.high, candle.low, close, candle.volume);
        let vwap_distance = vwap.and_then(|v| {
            if v > 0.0 {
                Some((close - v) / v * 100.0)
            } else {
                None
            }
        });

        let volume_ratio = out_24h.volume_ma.and_then(|ma| {
            if ma > 0.0 {
                Some(candle.volume / ma)
            } else {
                None
            }
        });

        self.prev_close = Some(close);

        FeatureRow {
            open_time: candle.open_time.format(TIME_FORMAT).to_string(),
            close_time: candle.close_time.format(TIME_FORMAT).to_string(),
            open: candle.open,
            high: candle.high,
            low: candle.low,
            close,
            volume: candle.volume,
            quote_asset_volume: candle.quote_asset_volume,
            trade_count: candle.trade_count,

            price_change_24h: ticker.price_change,
            price_change_percent_24h: ticker.price_change_percent,
            high_price_24h: ticker.high_price,
            low_price_24h: ticker.low_price,
            weighted_avg_price_24h: ticker.weighted_avg_price,

            hourly_return: ret,
            hourly_range: candle.high - candle.low,
            range_pct: if candle.open > 0.0 {
                (candle.high - candle.low) / candle.open * 100.0
            } else {
                0.0
            },

            volatility_4h: out_4h.volatility,
            volatility_8h: out_8h.volatility,
            volatility_24h: out_24h.volatility,

            atr_4h: out_4h.atr,
            atr_8h: out_8h.atr,
            atr_24h: out_24h.atr,

            bb_upper_4h: out_4h.bb_upper,
            bb_lower_4h: out_4h.bb_lower,
            bb_width_4h: out_4h.bb_width,
            bb_upper_8h: out_8h.bb_upper,
            bb_lower_8h: out_8h.bb_lower,
            bb_width_8h: out_8h.bb_width,
            bb_upper_24h: out_24h.bb_upper,
            bb_lower_24h: out_24h.bb_lower,
            bb_width_24h: out_24h.bb_width,

            ema_4h: out_4h.ema,
            ema_8h: out_8h.ema,
            ema_24h: out_24h.ema,

            rsi_6h: gate(rows > RSI_PERIODS[0], rsi_6),
            rsi_14h: gate(rows > RSI_PERIODS[1], rsi_14),
            rsi_24h: gate(rows > RSI_PERIODS[2], rsi_24),

            macd: gate(rows >= MACD_SLOW, macd_val.macd),
            macd_signal: gate(rows >= MACD_SLOW + MACD_SIGNAL - 1, macd_val.signal),
            macd_diff: gate(rows >= MACD_SLOW + MACD_SIGNAL - 1, macd_val.histogram),

            stoch_k: gate(rows >= STOCH_PERIOD, k),
            stoch_d: gate(rows >= STOCH_PERIOD + STOCH_SMOOTH - 1, d),

            volume_ma_4h: out_4h.volume_ma,
            volume_ma_8h: out_8h.volume_ma,
            volume_ma_24h: out_24h.volume_ma,
            volume_ratio,

            vwap,
            vwap_distance,
        }
    }
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the pipeline over a full candle series, skipping inconsistent candles.
pub fn build_feature_table(candles: &[HourlyCandle], ticker: &Ticker24h) -> Vec<FeatureRow> {
    let mut pipeline = FeaturePipeline::new();
    let mut rows = Vec::with_capacity(candles.len());
    for candle in candles {
        if !candle.is_consistent() {
            warn!(
                "Skipping inconsistent candle at {} (H:{} L:{} V:{})",
                candle.open_time, candle.high, candle.low, candle.volume
            );
            continue;
        }
        rows.push(pipeline.process(candle, ticker));
    }
    rows
}
