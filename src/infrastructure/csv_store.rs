//! CSV persistence for the engineered feature table.

use crate::domain::feature_row::FeatureRow;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// `{symbol}_volatility_features_{YYYYMMDDHHMMSS}.csv`
pub fn feature_file_name(symbol: &str, at: DateTime<Utc>) -> String {
    format!(
        "{}_volatility_features_{}.csv",
        symbol.to_lowercase(),
        at.format("%Y%m%d%H%M%S")
    )
}

/// Write the feature table into `dir` under a timestamped name and return
/// the full path.
pub fn write_feature_table(rows: &[FeatureRow], dir: &Path, symbol: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory {}", dir.display()))?;

    let path = dir.join(feature_file_name(symbol, Utc::now()));
    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to create {}", path.display()))?;

    for row in rows {
        writer
            .serialize(row)
            .context("Failed to serialize feature row")?;
    }
    writer.flush().context("Failed to flush CSV writer")?;

    info!("Saved {} feature rows to {}", rows.len(), path.display());
    Ok(path)
}
