//! End-to-end flow: synthetic candles -> feature table -> CSV -> labeled
//! dataset -> model suite.

use chrono::{DateTime, Duration, Utc};
use volcast::application::dataset::{
    StandardScaler, label_by_quantile, load_feature_table, smote_oversample, train_test_split,
};
use volcast::application::feature_pipeline::build_feature_table;
use volcast::application::model_suite::{SuiteParams, best_model, run_suite};
use volcast::domain::candle::{HourlyCandle, Ticker24h};
use volcast::infrastructure::csv_store::write_feature_table;

fn synthetic_candles(n: usize) -> Vec<HourlyCandle> {
    let start = DateTime::<Utc>::from_timestamp_millis(1_700_000_000_000).unwrap();
    let mut prev_close: f64 = 30000.0;
    (0..n)
        .map(|i| {
            let t = i as f64;
            // Regime switch halfway through so the volatility label has two classes
            let amplitude = if i < n / 2 { 40.0 } else { 400.0 };
            let close = 30000.0 + amplitude * (t * 0.7).sin() + 10.0 * (t * 0.13).cos();
            let open = prev_close;
            let high = open.max(close) + amplitude * 0.1;
            let low = open.min(close) - amplitude * 0.1;
            prev_close = close;
            HourlyCandle {
                open_time: start + Duration::hours(i as i64),
                close_time: start + Duration::hours(i as i64 + 1) - Duration::milliseconds(1),
                open,
                high,
                low,
                close,
                volume: 80.0 + (i % 11) as f64 * 3.0,
                quote_asset_volume: 2_400_000.0,
                trade_count: 1000 + i as u64,
            }
        })
        .collect()
}

#[test]
fn feature_table_to_trained_models() {
    let candles = synthetic_candles(240);
    let ticker = Ticker24h {
        price_change: -55.0,
        price_change_percent: -0.18,
        high_price: 30500.0,
        low_price: 29400.0,
        weighted_avg_price: 30010.0,
    };

    let rows = build_feature_table(&candles, &ticker);
    assert_eq!(rows.len(), 240);

    let dir = std::env::temp_dir().join(format!("volcast_flow_test_{}", std::process::id()));
    let path = write_feature_table(&rows, &dir, "BTCUSDT").unwrap();

    let dataset = load_feature_table(&path, "volatility_24h").unwrap();
    // Warm-up rows are dropped by the loader
    assert!(dataset.x.len() > 180 && dataset.x.len() < 240);
    // Time columns are non-numeric and excluded; target is split out
    assert!(!dataset.feature_names.iter().any(|n| n == "open_time"));
    assert!(!dataset.feature_names.iter().any(|n| n == "volatility_24h"));
    assert!(dataset.feature_names.iter().any(|n| n == "rsi_14h"));

    let (labels, threshold) = label_by_quantile(&dataset.target, "volatility_24h", 0.75).unwrap();
    assert!(threshold > 0.0);

    let (x, y) = smote_oversample(&dataset.x, &labels, 5, 42);
    let pos = y.iter().filter(|&&l| l == 1).count();
    assert_eq!(pos * 2, y.len());

    let (x_train, y_train, x_test, y_test) = train_test_split(&x, &y, 0.2, 42);
    let scaler = StandardScaler::fit(&x_train);
    let x_train = scaler.transform(&x_train);
    let x_test = scaler.transform(&x_test);

    let params = SuiteParams {
        n_trees: 20,
        ..Default::default()
    };
    let reports = run_suite(&x_train, &y_train, &x_test, &y_test, &params).unwrap();

    assert_eq!(reports.len(), 5);
    for report in &reports {
        let m = &report.metrics;
        for value in [m.accuracy, m.precision, m.recall, m.f1, m.roc_auc] {
            assert!((0.0..=1.0).contains(&value), "{value} out of range");
        }
    }
    // The regime switch makes the label learnable; the winner should beat chance.
    assert!(best_model(&reports).unwrap().metrics.roc_auc > 0.5);

    std::fs::remove_dir_all(&dir).ok();
}
