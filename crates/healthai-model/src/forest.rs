use std::time::Instant;

use healthai_core::config::ModelSettings;
use healthai_core::error::{Error, Result};
use healthai_core::training::TrainingTable;
use healthai_core::traits::Classifier;
use indicatif::ProgressBar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::tree::{DecisionTree, TrainingView, TreeParams};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self { n_trees: 100, seed: 42, max_depth: None, min_samples_split: 2 }
    }
}

impl From<&ModelSettings> for ForestParams {
    fn from(s: &ModelSettings) -> Self {
        Self { n_trees: s.n_trees, seed: s.seed, max_depth: s.max_depth, min_samples_split: s.min_samples_split }
    }
}

/// Bagged ensemble of [`DecisionTree`]s.
///
/// Each tree is grown on a bootstrap sample with its own RNG seeded from the
/// forest seed, so the same table and params always give the same forest.
/// `predict_proba` averages the per-tree leaf distributions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    features: Vec<String>,
    classes: Vec<String>,
    params: ForestParams,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    pub fn fit(table: &TrainingTable, params: &ForestParams) -> Result<Self> {
        Self::fit_with_progress(table, params, &ProgressBar::hidden())
    }

    /// Fit and tick `progress` once per tree.
    pub fn fit_with_progress(table: &TrainingTable, params: &ForestParams, progress: &ProgressBar) -> Result<Self> {
        if params.n_trees == 0 {
            return Err(Error::InvalidConfig("n_trees must be at least 1".to_string()));
        }
        if table.is_empty() || table.vocabulary().is_empty() {
            return Err(Error::Operation("cannot train on an empty table".to_string()));
        }
        let start = Instant::now();
        let classes = table.classes();
        let targets: Vec<usize> = table
            .labels()
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or_default())
            .collect();
        let n_features = table.vocabulary().len();
        let view = TrainingView { rows: table.rows(), targets: &targets, n_classes: classes.len(), n_features };
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: max_features(n_features),
        };
        info!(trees = params.n_trees, rows = table.len(), classes = classes.len(), features = n_features, "training random forest");

        progress.set_length(params.n_trees as u64);
        let mut seeder = StdRng::seed_from_u64(params.seed);
        let n = table.len();
        let mut trees = Vec::with_capacity(params.n_trees);
        for _ in 0..params.n_trees {
            let mut rng = StdRng::seed_from_u64(seeder.gen());
            let samples: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            trees.push(DecisionTree::fit(&view, samples, tree_params, &mut rng));
            progress.inc(1);
        }
        progress.finish_with_message("forest trained");
        info!(trees = trees.len(), elapsed_ms = start.elapsed().as_millis() as u64, "random forest trained");

        Ok(Self { features: table.vocabulary().tokens().to_vec(), classes, params: params.clone(), trees })
    }

    /// Feature names in training column order.
    pub fn features(&self) -> &[String] { &self.features }

    pub fn params(&self) -> &ForestParams { &self.params }

    pub fn trees(&self) -> &[DecisionTree] { &self.trees }

    /// Structural check used after deserialization.
    pub fn is_consistent(&self) -> bool {
        !self.classes.is_empty()
            && !self.trees.is_empty()
            && self.trees.iter().all(|t| t.is_consistent(self.features.len(), self.classes.len()))
    }
}

impl Classifier for RandomForest {
    fn classes(&self) -> &[String] { &self.classes }

    fn n_features(&self) -> usize { self.features.len() }

    #[allow(clippy::cast_precision_loss)]
    fn predict_proba(&self, features: &[u8]) -> Vec<f64> {
        let mut acc = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            tree.accumulate_proba(features, &mut acc);
        }
        let n = self.trees.len().max(1) as f64;
        for p in &mut acc {
            *p /= n;
        }
        acc
    }
}

/// `floor(sqrt(n))`, at least 1.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn max_features(n_features: usize) -> usize {
    ((n_features as f64).sqrt().floor() as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_features_is_floor_sqrt() {
        assert_eq!(max_features(1), 1);
        assert_eq!(max_features(3), 1);
        assert_eq!(max_features(132), 11);
    }
}
