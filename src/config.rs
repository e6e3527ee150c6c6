//! Configuration module for volcast.
//!
//! Runtime parameters (symbol, interval, output paths, model hyperparameters)
//! are CLI arguments on the binaries; this module only carries the
//! environment-driven exchange settings shared by both stages.

use anyhow::Result;
use std::env;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Exchange connection settings, loaded from the environment.
///
/// # Environment Variables
/// - `BINANCE_BASE_URL` - API base URL (default: `https://api.binance.com`)
/// - `BINANCE_API_KEY` - optional API key; public market data works without it
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("BINANCE_BASE_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = env::var("BINANCE_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self { base_url, api_key })
    }
}
