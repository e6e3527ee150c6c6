//! Dataset preparation for the modeling stage
//!
//! Loads a feature CSV into a numeric matrix, derives the binary
//! high-volatility label from a quantile threshold, rebalances the classes
//! with SMOTE-style interpolation, and provides the shuffled split and
//! standard scaler used ahead of training.

use crate::domain::errors::DatasetError;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tracing::{debug, info};

/// Numeric feature table with the target column split out.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub x: Vec<Vec<f64>>,
    pub target: Vec<f64>,
}

/// Load a feature CSV, keeping every numeric column except `target` as a
/// feature.
///
/// Columns with unparseable non-empty cells (timestamps and the like) are
/// dropped as non-numeric; rows with empty or non-finite cells in the
/// surviving columns (indicator warm-up) are skipped.
pub fn load_feature_table(path: &Path, target: &str) -> Result<Dataset, DatasetError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| DatasetError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|source| DatasetError::Read {
            path: path.display().to_string(),
            source,
        })?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let target_idx = headers
        .iter()
        .position(|h| h == target)
        .ok_or_else(|| DatasetError::MissingColumn {
            name: target.to_string(),
        })?;

    let mut records = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|source| DatasetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        records.push(record);
    }

    // First pass: a column is numeric if every non-empty cell parses.
    let mut numeric = vec![true; headers.len()];
    for record in &records {
        for (i, cell) in record.iter().enumerate() {
            if !cell.is_empty() && cell.parse::<f64>().is_err() {
                numeric[i] = false;
            }
        }
    }
    if !numeric[target_idx] {
        return Err(DatasetError::MissingColumn {
            name: target.to_string(),
        });
    }

    let feature_idx: Vec<usize> = (0..headers.len())
        .filter(|&i| i != target_idx && numeric[i])
        .collect();
    let dropped: Vec<&String> = (0..headers.len())
        .filter(|&i| !numeric[i])
        .map(|i| &headers[i])
        .collect();
    if !dropped.is_empty() {
        debug!("Dropping non-numeric columns: {:?}", dropped);
    }

    // Second pass: keep rows where target and all features are finite.
    let mut x = Vec::new();
    let mut target_values = Vec::new();
    let mut skipped = 0usize;
    'rows: for record in &records {
        let Some(t) = record
            .get(target_idx)
            .and_then(|c| c.parse::<f64>().ok())
            .filter(|v| v.is_finite())
        else {
            skipped += 1;
            continue;
        };

        let mut row = Vec::with_capacity(feature_idx.len());
        for &i in &feature_idx {
            match record.get(i).and_then(|c| c.parse::<f64>().ok()) {
                Some(v) if v.is_finite() => row.push(v),
                _ => {
                    skipped += 1;
                    continue 'rows;
                }
            }
        }
        x.push(row);
        target_values.push(t);
    }

    if x.is_empty() {
        return Err(DatasetError::Empty);
    }

    info!(
        "Loaded {} rows x {} features from {} ({} incomplete rows skipped)",
        x.len(),
        feature_idx.len(),
        path.display(),
        skipped
    );

    Ok(Dataset {
        feature_names: feature_idx.iter().map(|&i| headers[i].clone()).collect(),
        x,
        target: target_values,
    })
}

/// Quantile of `values` (tau in 0..1), linearly interpolated between the two
/// nearest order statistics.
pub fn quantile_threshold(values: &[f64], tau: f64) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let pos = tau.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (pos - lo as f64) * (sorted[hi] - sorted[lo])
}

/// Threshold the target at its `tau` quantile: 1 where above, 0 otherwise.
///
/// Returns the labels and the threshold. Errors when the cut yields a single
/// class, since no classifier can be trained on that.
pub fn label_by_quantile(
    target: &[f64],
    target_name: &str,
    tau: f64,
) -> Result<(Vec<i32>, f64), DatasetError> {
    let threshold = quantile_threshold(target, tau);
    let labels: Vec<i32> = target
        .iter()
        .map(|&v| if v > threshold { 1 } else { 0 })
        .collect();

    let positives = labels.iter().filter(|&&l| l == 1).count();
    if positives == 0 || positives == labels.len() {
        return Err(DatasetError::DegenerateTarget {
            name: target_name.to_string(),
            quantile: tau,
        });
    }
    Ok((labels, threshold))
}

fn euclidean_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

/// SMOTE-style minority oversampling: synthesize points on the segment
/// between a random minority sample and one of its `k` nearest minority
/// neighbors until both classes have equal counts.
pub fn smote_oversample(
    x: &[Vec<f64>],
    y: &[i32],
    k: usize,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<i32>) {
    let positives = y.iter().filter(|&&l| l == 1).count();
    let negatives = y.len() - positives;
    let (minority_label, deficit) = if positives < negatives {
        (1, negatives - positives)
    } else {
        (0, positives - negatives)
    };

    let mut x_out = x.to_vec();
    let mut y_out = y.to_vec();
    if deficit == 0 {
        return (x_out, y_out);
    }

    let minority: Vec<&Vec<f64>> = x
        .iter()
        .zip(y)
        .filter(|&(_, &l)| l == minority_label)
        .map(|(row, _)| row)
        .collect();

    let mut rng = StdRng::seed_from_u64(seed);

    if minority.is_empty() {
        // One class is entirely absent; there is nothing to synthesize from.
        return (x_out, y_out);
    }
    if minority.len() < 2 {
        // Nothing to interpolate between; duplicate what is there.
        for _ in 0..deficit {
            x_out.push(minority[0].clone());
            y_out.push(minority_label);
        }
        return (x_out, y_out);
    }

    let k = k.min(minority.len() - 1);
    for _ in 0..deficit {
        let i = rng.random_range(0..minority.len());
        let base = minority[i];

        // k nearest minority neighbors of base, brute force
        let mut dists: Vec<(usize, f64)> = minority
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(j, row)| (j, euclidean_sq(base, row)))
            .collect();
        dists.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        let neighbor = minority[dists[rng.random_range(0..k)].0];
        let gap: f64 = rng.random_range(0.0..1.0);
        let synthetic: Vec<f64> = base
            .iter()
            .zip(neighbor)
            .map(|(a, b)| a + gap * (b - a))
            .collect();
        x_out.push(synthetic);
        y_out.push(minority_label);
    }

    info!(
        "SMOTE: synthesized {} minority samples (class {}), {} rows total",
        deficit,
        minority_label,
        x_out.len()
    );
    (x_out, y_out)
}

/// Seeded shuffled split; `test_size` is the test fraction.
#[allow(clippy::type_complexity)]
pub fn train_test_split(
    x: &[Vec<f64>],
    y: &[i32],
    test_size: f64,
    seed: u64,
) -> (Vec<Vec<f64>>, Vec<i32>, Vec<Vec<f64>>, Vec<i32>) {
    let n = x.len();
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64) * test_size).round() as usize;
    let n_test = n_test.clamp(1, n.saturating_sub(1));

    let (test_idx, train_idx) = indices.split_at(n_test);
    let collect = |idx: &[usize]| -> (Vec<Vec<f64>>, Vec<i32>) {
        (
            idx.iter().map(|&i| x[i].clone()).collect(),
            idx.iter().map(|&i| y[i]).collect(),
        )
    };
    let (x_test, y_test) = collect(test_idx);
    let (x_train, y_train) = collect(train_idx);
    (x_train, y_train, x_test, y_test)
}

/// Per-column standardization fit on the training partition only.
#[derive(Debug, Clone)]
pub struct StandardScaler {
    means: Vec<f64>,
    stds: Vec<f64>,
}

impl StandardScaler {
    pub fn fit(x: &[Vec<f64>]) -> Self {
        let n_rows = x.len().max(1) as f64;
        let n_cols = x.first().map_or(0, |r| r.len());

        let mut means = vec![0.0; n_cols];
        for row in x {
            for (m, v) in means.iter_mut().zip(row) {
                *m += v;
            }
        }
        for m in &mut means {
            *m /= n_rows;
        }

        let mut stds = vec![0.0; n_cols];
        for row in x {
            for ((s, v), m) in stds.iter_mut().zip(row).zip(&means) {
                *s += (v - m).powi(2);
            }
        }
        for s in &mut stds {
            *s = (*s / n_rows).sqrt();
            if *s < 1e-12 {
                *s = 1.0;
            }
        }

        Self { means, stds }
    }

    pub fn transform(&self, x: &[Vec<f64>]) -> Vec<Vec<f64>> {
        x.iter()
            .map(|row| {
                row.iter()
                    .zip(&self.means)
                    .zip(&self.stds)
                    .map(|((v, m), s)| (v - m) / s)
                    .collect()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantile_threshold_interpolates_linearly() {
        assert!((quantile_threshold(&[0.0, 1.0, 2.0, 3.0], 0.75) - 2.25).abs() < 1e-12);
        assert!((quantile_threshold(&[3.0, 1.0, 0.0, 2.0], 0.5) - 1.5).abs() < 1e-12);
        assert_eq!(quantile_threshold(&[7.0], 0.75), 7.0);
        assert!(quantile_threshold(&[], 0.75).is_nan());
    }

    #[test]
    fn test_label_by_quantile_splits_top_quartile() {
        let target: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let (labels, threshold) = label_by_quantile(&target, "volatility_24h", 0.75).unwrap();
        let positives = labels.iter().filter(|&&l| l == 1).count();
        assert!((threshold - 74.25).abs() < 1e-12);
        assert_eq!(positives, 25);
    }

    #[test]
    fn test_label_by_quantile_degenerate() {
        let target = vec![1.0; 50];
        assert!(matches!(
            label_by_quantile(&target, "flat", 0.75),
            Err(DatasetError::DegenerateTarget { .. })
        ));
    }

    #[test]
    fn test_smote_balances_classes() {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for i in 0..40 {
            x.push(vec![i as f64, -(i as f64)]);
            y.push(0);
        }
        for i in 0..10 {
            x.push(vec![100.0 + i as f64, 50.0 + i as f64]);
            y.push(1);
        }

        let (x2, y2) = smote_oversample(&x, &y, 5, 42);
        let pos = y2.iter().filter(|&&l| l == 1).count();
        let neg = y2.len() - pos;
        assert_eq!(pos, neg);
        assert_eq!(x2.len(), y2.len());

        // Synthetics interpolate minority samples, so they stay in the
        // minority bounding box.
        for (row, &label) in x2.iter().zip(&y2).skip(x.len()) {
            assert_eq!(label, 1);
            assert!((100.0..=109.0).contains(&row[0]));
            assert!((50.0..=59.0).contains(&row[1]));
        }
    }

    #[test]
    fn test_smote_empty_minority_left_unchanged() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0]];
        let y = vec![0, 0, 0];
        let (x2, y2) = smote_oversample(&x, &y, 5, 42);
        assert_eq!(x2, x);
        assert_eq!(y2, y);
    }

    #[test]
    fn test_smote_noop_when_balanced() {
        let x = vec![vec![0.0], vec![1.0], vec![2.0], vec![3.0]];
        let y = vec![0, 0, 1, 1];
        let (x2, y2) = smote_oversample(&x, &y, 5, 42);
        assert_eq!(x2, x);
        assert_eq!(y2, y);
    }

    #[test]
    fn test_split_sizes_and_determinism() {
        let x: Vec<Vec<f64>> = (0..50).map(|i| vec![i as f64]).collect();
        let y: Vec<i32> = (0..50).map(|i| (i % 2) as i32).collect();

        let (xtr, ytr, xte, yte) = train_test_split(&x, &y, 0.2, 42);
        assert_eq!(xte.len(), 10);
        assert_eq!(xtr.len(), 40);
        assert_eq!(ytr.len(), 40);
        assert_eq!(yte.len(), 10);

        let (xtr2, _, _, _) = train_test_split(&x, &y, 0.2, 42);
        assert_eq!(xtr, xtr2);

        let (xtr3, _, _, _) = train_test_split(&x, &y, 0.2, 7);
        assert_ne!(xtr, xtr3);
    }

    #[test]
    fn test_scaler_centers_training_data() {
        let x = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&x);

        for col in 0..2 {
            let mean: f64 = z.iter().map(|r| r[col]).sum::<f64>() / 3.0;
            let var: f64 = z.iter().map(|r| r[col].powi(2)).sum::<f64>() / 3.0;
            assert!(mean.abs() < 1e-9);
            assert!((var - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_scaler_constant_column_is_safe() {
        let x = vec![vec![5.0], vec![5.0]];
        let scaler = StandardScaler::fit(&x);
        let z = scaler.transform(&[vec![5.0], vec![6.0]].to_vec());
        assert_eq!(z[0][0], 0.0);
        assert_eq!(z[1][0], 1.0);
    }
}
