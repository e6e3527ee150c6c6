//! Stage 2: load a saved feature CSV, derive the high-volatility label from a
//! quantile threshold and compare five classifiers on it.
//!
//! # Usage
//! ```sh
//! cargo run --bin train_models -- --input data/btcusdt_volatility_features_20240101000000.csv
//! ```

use clap::Parser;
use std::path::PathBuf;
use volcast::application::dataset::{
    StandardScaler, label_by_quantile, load_feature_table, smote_oversample, train_test_split,
};
use volcast::application::model_suite::{ModelReport, SuiteParams, best_model, run_suite};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the feature CSV
    #[arg(long)]
    input: PathBuf,

    /// Target column to threshold into the binary label
    #[arg(long, default_value = "volatility_24h")]
    target: String,

    /// Quantile of the target used as the high-volatility threshold
    #[arg(long, default_value_t = 0.75)]
    quantile: f64,

    /// Test fraction of the (rebalanced) dataset
    #[arg(long, default_value_t = 0.2)]
    test_size: f64,

    /// RNG seed for oversampling and the split
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Neighbors considered per synthetic SMOTE sample
    #[arg(long, default_value_t = 5)]
    smote_k: usize,

    /// Disable minority oversampling
    #[arg(long)]
    no_smote: bool,

    /// Number of trees in the random forest
    #[arg(long, default_value_t = 100)]
    n_trees: u16,

    /// k for the nearest-neighbors classifier
    #[arg(long, default_value_t = 5)]
    knn_k: usize,

    /// Regularization constant for the RBF SVC
    #[arg(long, default_value_t = 1.0)]
    svc_c: f64,
}

fn print_report(reports: &[ModelReport]) {
    println!("\n══════════════════════════════════════════════════════════════════════════");
    println!("  MODEL PERFORMANCE COMPARISON");
    println!("  (scores are hard labels; ROC AUC equals balanced accuracy)");
    println!("══════════════════════════════════════════════════════════════════════════");
    println!(
        "  {:<24} {:>9} {:>10} {:>8} {:>9} {:>9}",
        "Model", "Accuracy", "Precision", "Recall", "F1", "ROC AUC"
    );
    for report in reports {
        let m = &report.metrics;
        println!(
            "  {:<24} {:>9.4} {:>10.4} {:>8.4} {:>9.4} {:>9.4}",
            report.model.name(),
            m.accuracy,
            m.precision,
            m.recall,
            m.f1,
            m.roc_auc
        );
    }
    println!("══════════════════════════════════════════════════════════════════════════");
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let args = Args::parse();

    let dataset = load_feature_table(&args.input, &args.target)?;
    println!(
        "Loaded {} rows with {} features (target: {})",
        dataset.x.len(),
        dataset.feature_names.len(),
        args.target
    );

    let (labels, threshold) = label_by_quantile(&dataset.target, &args.target, args.quantile)?;
    let positives = labels.iter().filter(|&&l| l == 1).count();
    println!(
        "Threshold at quantile {:.2} of {}: {:.6} ({} high-volatility rows of {})",
        args.quantile,
        args.target,
        threshold,
        positives,
        labels.len()
    );

    let (x, y) = if args.no_smote {
        (dataset.x.clone(), labels)
    } else {
        smote_oversample(&dataset.x, &labels, args.smote_k, args.seed)
    };

    let (x_train, y_train, x_test, y_test) = train_test_split(&x, &y, args.test_size, args.seed);
    println!(
        "Training on {} samples, evaluating on {}",
        x_train.len(),
        x_test.len()
    );

    let scaler = StandardScaler::fit(&x_train);
    let x_train = scaler.transform(&x_train);
    let x_test = scaler.transform(&x_test);

    let params = SuiteParams {
        n_trees: args.n_trees,
        knn_k: args.knn_k,
        svc_c: args.svc_c,
    };
    let reports = run_suite(&x_train, &y_train, &x_test, &y_test, &params)?;

    print_report(&reports);
    if let Some(best) = best_model(&reports) {
        println!(
            "\nBest model by ROC AUC: {} ({:.4})",
            best.model.name(),
            best.metrics.roc_auc
        );
    }

    Ok(())
}
