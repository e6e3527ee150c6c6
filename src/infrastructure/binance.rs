//! Binance market data adapter
//!
//! Fetches historical klines and the rolling 24h ticker from the public REST
//! API. Only unsigned endpoints are used; an API key, when configured, is
//! passed through as a header for higher request weight limits.

use crate::domain::candle::{HourlyCandle, Ticker24h};
use crate::domain::errors::MarketDataError;
use crate::domain::ports::MarketDataSource;
use crate::infrastructure::http::{build_client, build_url_with_query};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest_middleware::ClientWithMiddleware;
use serde::Deserialize;
use tracing::{info, warn};

pub struct BinanceClient {
    client: ClientWithMiddleware,
    base_url: String,
    api_key: Option<String>,
}

impl BinanceClient {
    pub fn builder() -> BinanceClientBuilder {
        BinanceClientBuilder::default()
    }

    fn request(&self, url: &str) -> reqwest_middleware::RequestBuilder {
        let mut req = self.client.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("X-MBX-APIKEY", key);
        }
        req
    }
}

#[derive(Default)]
pub struct BinanceClientBuilder {
    base_url: Option<String>,
    api_key: Option<String>,
}

impl BinanceClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    pub fn build(self) -> BinanceClient {
        BinanceClient {
            client: build_client(),
            base_url: self
                .base_url
                .unwrap_or_else(|| crate::config::DEFAULT_BASE_URL.to_string()),
            api_key: self.api_key,
        }
    }
}

fn parse_kline(entry: &serde_json::Value) -> Option<HourlyCandle> {
    let arr = entry.as_array()?;
    if arr.len() < 9 {
        return None;
    }

    let open_time = DateTime::<Utc>::from_timestamp_millis(arr[0].as_i64()?)?;
    let close_time = DateTime::<Utc>::from_timestamp_millis(arr[6].as_i64()?)?;

    let price = |i: usize| arr[i].as_str()?.parse::<f64>().ok();

    Some(HourlyCandle {
        open_time,
        close_time,
        open: price(1)?,
        high: price(2)?,
        low: price(3)?,
        close: price(4)?,
        volume: price(5)?,
        quote_asset_volume: price(7)?,
        trade_count: arr[8].as_u64()?,
    })
}

#[async_trait]
impl MarketDataSource for BinanceClient {
    async fn fetch_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<HourlyCandle>> {
        let url = format!("{}/api/v3/klines", self.base_url);
        let limit_str = limit.to_string();
        let url = build_url_with_query(
            &url,
            &[
                ("symbol", symbol),
                ("interval", interval),
                ("limit", &limit_str),
            ],
        );

        let response = self
            .request(&url)
            .send()
            .await
            .context("Failed to fetch klines from Binance")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ApiStatus { status, body }.into());
        }

        // Klines arrive as heterogeneous JSON arrays:
        // [openTime, open, high, low, close, volume, closeTime, quoteVolume, trades, ...]
        let klines: Vec<serde_json::Value> = response
            .json()
            .await
            .context("Failed to parse Binance klines response")?;

        let total = klines.len();
        let candles: Vec<HourlyCandle> = klines
            .iter()
            .filter_map(parse_kline)
            .filter(|c| {
                if c.is_consistent() {
                    true
                } else {
                    warn!("Dropping inconsistent candle at {}", c.open_time);
                    false
                }
            })
            .collect();

        if candles.len() < total {
            warn!(
                "Dropped {} of {} klines for {} as malformed or inconsistent",
                total - candles.len(),
                total,
                symbol
            );
        }
        if candles.is_empty() && total > 0 {
            return Err(MarketDataError::MalformedPayload {
                endpoint: "/api/v3/klines".to_string(),
                reason: "no entry could be parsed".to_string(),
            }
            .into());
        }

        info!("Fetched {} klines for {} @ {}", candles.len(), symbol, interval);
        Ok(candles)
    }

    async fn fetch_ticker_24h(&self, symbol: &str) -> Result<Ticker24h> {
        #[derive(Debug, Deserialize)]
        struct RawTicker {
            #[serde(rename = "priceChange")]
            price_change: String,
            #[serde(rename = "priceChangePercent")]
            price_change_percent: String,
            #[serde(rename = "highPrice")]
            high_price: String,
            #[serde(rename = "lowPrice")]
            low_price: String,
            #[serde(rename = "weightedAvgPrice")]
            weighted_avg_price: String,
        }

        let url = format!("{}/api/v3/ticker/24hr", self.base_url);
        let url = build_url_with_query(&url, &[("symbol", symbol)]);

        let response = self
            .request(&url)
            .send()
            .await
            .context("Failed to fetch 24hr ticker from Binance")?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(MarketDataError::ApiStatus { status, body }.into());
        }

        let raw: RawTicker = response
            .json()
            .await
            .context("Failed to parse Binance 24hr ticker response")?;

        let field = |name: &str, v: &str| {
            v.parse::<f64>()
                .with_context(|| format!("24hr ticker field '{name}' is not numeric: {v}"))
        };

        Ok(Ticker24h {
            price_change: field("priceChange", &raw.price_change)?,
            price_change_percent: field("priceChangePercent", &raw.price_change_percent)?,
            high_price: field("highPrice", &raw.high_price)?,
            low_price: field("lowPrice", &raw.low_price)?,
            weighted_avg_price: field("weightedAvgPrice", &raw.weighted_avg_price)?,
        })
    }
}
