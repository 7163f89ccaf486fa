//! Held-out accuracy check.
//!
//! Diagnostic only: the served forest is always trained on the full table, so
//! this number describes a sibling model, not the one answering predictions.

use healthai_core::error::Result;
use healthai_core::training::TrainingTable;
use healthai_core::traits::Classifier;
use serde::Serialize;
use tracing::info;

use crate::forest::{ForestParams, RandomForest};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub train_rows: usize,
    pub test_rows: usize,
    pub accuracy: f64,
}

/// Share of rows whose label equals the classifier's argmax class.
#[allow(clippy::cast_precision_loss)]
pub fn accuracy<C: Classifier + ?Sized>(classifier: &C, table: &TrainingTable) -> f64 {
    if table.is_empty() {
        return 0.0;
    }
    let correct = table
        .rows()
        .iter()
        .zip(table.labels())
        .filter(|(row, label)| classifier.predict(row).is_some_and(|p| &p.label == *label))
        .count();
    correct as f64 / table.len() as f64
}

pub fn evaluate_holdout(table: &TrainingTable, params: &ForestParams, fraction: f64) -> Result<EvaluationReport> {
    let (train, test) = table.split_holdout(fraction, params.seed)?;
    let forest = RandomForest::fit(&train, params)?;
    let report = EvaluationReport { train_rows: train.len(), test_rows: test.len(), accuracy: accuracy(&forest, &test) };
    info!(accuracy = report.accuracy, train = report.train_rows, test = report.test_rows, "holdout evaluation");
    Ok(report)
}
