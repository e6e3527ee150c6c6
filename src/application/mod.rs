pub mod dataset;
pub mod feature_pipeline;
pub mod model_suite;
pub mod rolling;
