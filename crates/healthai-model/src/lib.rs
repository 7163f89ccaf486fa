//! healthai-model
//!
//! Random-forest disease classifier over binary symptom vectors: training,
//! inference through [`healthai_core::traits::Classifier`], JSON persistence
//! and a held-out accuracy diagnostic.
pub mod evaluate;
pub mod forest;
pub mod persist;
pub mod tree;

pub use evaluate::{accuracy, evaluate_holdout, EvaluationReport};
pub use forest::{ForestParams, RandomForest};
pub use persist::ModelOrigin;
