use thiserror::Error;

/// Errors related to market data retrieval and payload shape
#[derive(Debug, Error)]
pub enum MarketDataError {
    #[error("exchange returned HTTP {status}: {body}")]
    ApiStatus { status: u16, body: String },

    #[error("malformed payload from {endpoint}: {reason}")]
    MalformedPayload { endpoint: String, reason: String },
}

/// Errors related to loading and preparing the modeling dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("column not found: {name}")]
    MissingColumn { name: String },

    #[error("dataset is empty after dropping incomplete rows")]
    Empty,

    #[error("target column '{name}' yields a single class at quantile {quantile}")]
    DegenerateTarget { name: String, quantile: f64 },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: csv::Error,
    },
}
