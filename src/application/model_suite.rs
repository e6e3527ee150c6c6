//! Classifier comparison suite
//!
//! Trains five off-the-shelf smartcore classifiers on the prepared matrix and
//! reports accuracy, precision, recall, F1 and ROC AUC per model. Metrics are
//! computed here rather than through `smartcore::metrics` so the positive
//! class and the ROC construction stay explicit.
//!
//! smartcore 0.4 exposes no uniform probability interface across these
//! models, so every model is scored on its hard label vector; the ROC curve
//! then has a single operating point and its AUC equals balanced accuracy.

use anyhow::{Result, anyhow};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::linear::logistic_regression::LogisticRegression;
use smartcore::neighbors::knn_classifier::{KNNClassifier, KNNClassifierParameters};
use smartcore::svm::Kernels;
use smartcore::svm::svc::{SVC, SVCParameters};
use smartcore::tree::decision_tree_classifier::DecisionTreeClassifier;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    LogisticRegression,
    RandomForest,
    SupportVector,
    DecisionTree,
    KNearestNeighbors,
}

impl ModelKind {
    pub fn all() -> [ModelKind; 5] {
        [
            ModelKind::LogisticRegression,
            ModelKind::RandomForest,
            ModelKind::SupportVector,
            ModelKind::DecisionTree,
            ModelKind::KNearestNeighbors,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LogisticRegression => "Logistic Regression",
            ModelKind::RandomForest => "Random Forest",
            ModelKind::SupportVector => "Support Vector Machine",
            ModelKind::DecisionTree => "Decision Tree",
            ModelKind::KNearestNeighbors => "K-Nearest Neighbors",
        }
    }
}

/// Hyperparameters surfaced on the CLI.
#[derive(Debug, Clone)]
pub struct SuiteParams {
    /// smartcore's forest parameters carry the tree count as `u16`.
    pub n_trees: u16,
    pub knn_k: usize,
    pub svc_c: f64,
}

impl Default for SuiteParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            knn_k: 5,
            svc_c: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ClassificationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub roc_auc: f64,
}

#[derive(Debug, Clone)]
pub struct ModelReport {
    pub model: ModelKind,
    pub metrics: ClassificationMetrics,
}

/// Confusion-matrix metrics with class 1 as the positive class.
pub fn evaluate(y_true: &[i32], y_pred: &[i32]) -> ClassificationMetrics {
    let n = y_true.len();
    let mut tp = 0usize;
    let mut tn = 0usize;
    let mut fp = 0usize;
    let mut fn_ = 0usize;
    for (&t, &p) in y_true.iter().zip(y_pred) {
        match (t, p) {
            (1, 1) => tp += 1,
            (0, 0) => tn += 1,
            (0, 1) => fp += 1,
            _ => fn_ += 1,
        }
    }

    let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };
    let precision = ratio(tp, tp + fp);
    let recall = ratio(tp, tp + fn_);
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };

    let scores: Vec<f64> = y_pred.iter().map(|&p| p as f64).collect();
    ClassificationMetrics {
        accuracy: ratio(tp + tn, n),
        precision,
        recall,
        f1,
        roc_auc: roc_auc(y_true, &scores),
    }
}

/// ROC curve as (fpr, tpr) points from (0,0) to (1,1), thresholds descending.
pub fn roc_curve(y_true: &[i32], scores: &[f64]) -> Vec<(f64, f64)> {
    let positives = y_true.iter().filter(|&&t| t == 1).count();
    let negatives = y_true.len() - positives;
    if positives == 0 || negatives == 0 {
        return vec![(0.0, 0.0), (1.0, 1.0)];
    }

    let mut thresholds: Vec<f64> = scores.to_vec();
    thresholds.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    thresholds.dedup();

    let mut points = vec![(0.0, 0.0)];
    for threshold in thresholds {
        let mut tp = 0usize;
        let mut fp = 0usize;
        for (&t, &s) in y_true.iter().zip(scores) {
            if s >= threshold {
                if t == 1 {
                    tp += 1;
                } else {
                    fp += 1;
                }
            }
        }
        points.push((fp as f64 / negatives as f64, tp as f64 / positives as f64));
    }
    if *points.last().unwrap() != (1.0, 1.0) {
        points.push((1.0, 1.0));
    }
    points
}

/// Area under the ROC curve, trapezoidal rule. 0.5 for degenerate inputs.
pub fn roc_auc(y_true: &[i32], scores: &[f64]) -> f64 {
    let points = roc_curve(y_true, scores);
    if points.len() < 2 {
        return 0.5;
    }
    points
        .windows(2)
        .map(|w| {
            let (x0, y0) = w[0];
            let (x1, y1) = w[1];
            (x1 - x0) * (y0 + y1) / 2.0
        })
        .sum()
}

/// Train and evaluate every model on an already scaled split.
pub fn run_suite(
    x_train: &[Vec<f64>],
    y_train: &[i32],
    x_test: &[Vec<f64>],
    y_test: &[i32],
    params: &SuiteParams,
) -> Result<Vec<ModelReport>> {
    let x_train_m = DenseMatrix::from_2d_vec(&x_train.to_vec())
        .map_err(|e| anyhow!("Matrix creation failed: {e}"))?;
    let x_test_m = DenseMatrix::from_2d_vec(&x_test.to_vec())
        .map_err(|e| anyhow!("Matrix creation failed: {e}"))?;
    let y_train_vec: Vec<i32> = y_train.to_vec();

    let n_features = x_train.first().map_or(1, |r| r.len()).max(1);

    let mut reports = Vec::with_capacity(ModelKind::all().len());
    for kind in ModelKind::all() {
        info!("Training {}...", kind.name());
        let y_pred: Vec<i32> = match kind {
            ModelKind::LogisticRegression => {
                let model = LogisticRegression::fit(&x_train_m, &y_train_vec, Default::default())
                    .map_err(|e| anyhow!("{} training failed: {e}", kind.name()))?;
                model
                    .predict(&x_test_m)
                    .map_err(|e| anyhow!("{} prediction failed: {e}", kind.name()))?
            }
            ModelKind::RandomForest => {
                let rf_params =
                    RandomForestClassifierParameters::default().with_n_trees(params.n_trees);
                let model = RandomForestClassifier::fit(&x_train_m, &y_train_vec, rf_params)
                    .map_err(|e| anyhow!("{} training failed: {e}", kind.name()))?;
                model
                    .predict(&x_test_m)
                    .map_err(|e| anyhow!("{} prediction failed: {e}", kind.name()))?
            }
            ModelKind::SupportVector => {
                // gamma = 1 / n_features, sklearn's "scale" on standardized input
                let svc_params = SVCParameters::default()
                    .with_c(params.svc_c)
                    .with_kernel(Kernels::rbf().with_gamma(1.0 / n_features as f64));
                let model = SVC::fit(&x_train_m, &y_train_vec, &svc_params)
                    .map_err(|e| anyhow!("{} training failed: {e}", kind.name()))?;
                let raw = model
                    .predict(&x_test_m)
                    .map_err(|e| anyhow!("{} prediction failed: {e}", kind.name()))?;
                raw.iter().map(|&v| v as i32).collect()
            }
            ModelKind::DecisionTree => {
                let model =
                    DecisionTreeClassifier::fit(&x_train_m, &y_train_vec, Default::default())
                        .map_err(|e| anyhow!("{} training failed: {e}", kind.name()))?;
                model
                    .predict(&x_test_m)
                    .map_err(|e| anyhow!("{} prediction failed: {e}", kind.name()))?
            }
            ModelKind::KNearestNeighbors => {
                let knn_params = KNNClassifierParameters::default().with_k(params.knn_k);
                let model = KNNClassifier::fit(&x_train_m, &y_train_vec, knn_params)
                    .map_err(|e| anyhow!("{} training failed: {e}", kind.name()))?;
                model
                    .predict(&x_test_m)
                    .map_err(|e| anyhow!("{} prediction failed: {e}", kind.name()))?
            }
        };

        reports.push(ModelReport {
            model: kind,
            metrics: evaluate(y_test, &y_pred),
        });
    }

    Ok(reports)
}

/// Best model by ROC AUC, ties broken by F1.
pub fn best_model(reports: &[ModelReport]) -> Option<&ModelReport> {
    reports.iter().max_by(|a, b| {
        (a.metrics.roc_auc, a.metrics.f1)
            .partial_cmp(&(b.metrics.roc_auc, b.metrics.f1))
            .unwrap_or(std::cmp::Ordering::Equal)
    })
}
