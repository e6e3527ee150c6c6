//! Integration tests for the Binance adapter against a mocked HTTP server.

use serde_json::json;
use volcast::domain::errors::MarketDataError;
use volcast::domain::ports::MarketDataSource;
use volcast::infrastructure::binance::BinanceClient;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn kline(open_time: i64, open: &str, high: &str, low: &str, close: &str) -> serde_json::Value {
    json!([
        open_time,
        open,
        high,
        low,
        close,
        "123.45",
        open_time + 3_599_999,
        "3711000.0",
        4521,
        "60.0",
        "1800000.0",
        "0"
    ])
}

#[tokio::test]
async fn fetches_and_parses_klines() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .and(query_param("symbol", "BTCUSDT"))
        .and(query_param("interval", "1h"))
        .and(query_param("limit", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline(1_700_000_000_000, "30000.0", "30100.0", "29900.0", "30050.0"),
            kline(1_700_003_600_000, "30050.0", "30200.0", "30000.0", "30150.0"),
            kline(1_700_007_200_000, "30150.0", "30300.0", "30100.0", "30250.0"),
        ])))
        .mount(&server)
        .await;

    let client = BinanceClient::builder().base_url(server.uri()).build();
    let candles = client.fetch_klines("BTCUSDT", "1h", 3).await.unwrap();

    assert_eq!(candles.len(), 3);
    assert_eq!(candles[0].open, 30000.0);
    assert_eq!(candles[2].close, 30250.0);
    assert_eq!(candles[0].trade_count, 4521);
    assert!(candles.iter().all(|c| c.is_consistent()));
}

#[tokio::test]
async fn drops_malformed_kline_entries() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            kline(1_700_000_000_000, "30000.0", "30100.0", "29900.0", "30050.0"),
            json!([1_700_003_600_000i64, "not-a-price"]),
        ])))
        .mount(&server)
        .await;

    let client = BinanceClient::builder().base_url(server.uri()).build();
    let candles = client.fetch_klines("BTCUSDT", "1h", 2).await.unwrap();
    assert_eq!(candles.len(), 1);
}

#[tokio::test]
async fn fetches_24h_ticker() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/ticker/24hr"))
        .and(query_param("symbol", "BTCUSDT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "symbol": "BTCUSDT",
            "priceChange": "120.50",
            "priceChangePercent": "0.40",
            "highPrice": "31000.00",
            "lowPrice": "29500.00",
            "weightedAvgPrice": "30200.00",
            "volume": "12345.0"
        })))
        .mount(&server)
        .await;

    let client = BinanceClient::builder().base_url(server.uri()).build();
    let ticker = client.fetch_ticker_24h("BTCUSDT").await.unwrap();

    assert_eq!(ticker.price_change, 120.5);
    assert_eq!(ticker.high_price, 31000.0);
    assert_eq!(ticker.weighted_avg_price, 30200.0);
}

#[tokio::test]
async fn surfaces_api_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v3/klines"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_string(r#"{"code":-1121,"msg":"Invalid symbol."}"#),
        )
        .mount(&server)
        .await;

    let client = BinanceClient::builder().base_url(server.uri()).build();
    let err = client.fetch_klines("NOPE", "1h", 10).await.unwrap_err();

    match err.downcast_ref::<MarketDataError>() {
        Some(MarketDataError::ApiStatus { status, body }) => {
            assert_eq!(*status, 400);
            assert!(body.contains("Invalid symbol"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
