//! CART decision tree over binary features, split by Gini impurity.
//!
//! A split on feature `f` sends rows with `f == 0` to `absent` and rows with
//! `f == 1` to `present`. Leaves keep raw class counts of the (bootstrap)
//! samples that reached them, so probabilities are recomputed exactly after
//! a save/load round trip.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    Split { feature: usize, absent: usize, present: usize },
    Leaf { counts: Vec<u32> },
}

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Non-constant features to evaluate per split.
    pub max_features: usize,
}

/// Training view shared by every node of one tree.
pub struct TrainingView<'a> {
    pub rows: &'a [Vec<u8>],
    pub targets: &'a [usize],
    pub n_classes: usize,
    pub n_features: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on `samples` (row indices, repeats allowed).
    pub fn fit<R: Rng>(view: &TrainingView<'_>, samples: Vec<usize>, params: TreeParams, rng: &mut R) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.grow(view, samples, 0, params, rng);
        tree
    }

    pub fn nodes(&self) -> &[Node] { &self.nodes }

    pub fn depth(&self) -> usize { self.depth_from(0) }

    /// Class counts of the leaf reached by `features`; a missing feature reads as absent.
    pub fn leaf_counts(&self, features: &[u8]) -> &[u32] {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Split { feature, absent, present }) => {
                    idx = if features.get(*feature) == Some(&1) { *present } else { *absent };
                }
                Some(Node::Leaf { counts }) => return counts,
                None => return &[],
            }
        }
    }

    /// Add this tree's class distribution for `features` into `acc`.
    pub fn accumulate_proba(&self, features: &[u8], acc: &mut [f64]) {
        let counts = self.leaf_counts(features);
        let total: u32 = counts.iter().sum();
        if total == 0 {
            return;
        }
        for (slot, &c) in acc.iter_mut().zip(counts) {
            *slot += f64::from(c) / f64::from(total);
        }
    }

    /// True when every split references a feature below `n_features` and a valid child,
    /// and every leaf has `n_classes` counts.
    pub fn is_consistent(&self, n_features: usize, n_classes: usize) -> bool {
        !self.nodes.is_empty()
            && self.nodes.iter().all(|node| match node {
                Node::Split { feature, absent, present } => {
                    *feature < n_features && *absent < self.nodes.len() && *present < self.nodes.len()
                }
                Node::Leaf { counts } => counts.len() == n_classes,
            })
    }

    fn depth_from(&self, idx: usize) -> usize {
        match self.nodes.get(idx) {
            Some(Node::Split { absent, present, .. }) => 1 + self.depth_from(*absent).max(self.depth_from(*present)),
            _ => 0,
        }
    }

    fn grow<R: Rng>(&mut self, view: &TrainingView<'_>, samples: Vec<usize>, depth: usize, params: TreeParams, rng: &mut R) -> usize {
        let counts = class_counts(view, &samples);
        let idx = self.nodes.len();
        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = params.max_depth.is_some_and(|d| depth >= d);
        if pure || depth_reached || samples.len() < params.min_samples_split {
            self.nodes.push(Node::Leaf { counts });
            return idx;
        }
        let Some(feature) = best_split(view, &samples, params.max_features, rng) else {
            self.nodes.push(Node::Leaf { counts });
            return idx;
        };

        self.nodes.push(Node::Leaf { counts: Vec::new() });
        let (absent_rows, present_rows): (Vec<usize>, Vec<usize>) =
            samples.into_iter().partition(|&s| view.rows[s][feature] == 0);
        let absent = self.grow(view, absent_rows, depth + 1, params, rng);
        let present = self.grow(view, present_rows, depth + 1, params, rng);
        self.nodes[idx] = Node::Split { feature, absent, present };
        idx
    }
}

fn class_counts(view: &TrainingView<'_>, samples: &[usize]) -> Vec<u32> {
    let mut counts = vec![0u32; view.n_classes];
    for &s in samples {
        counts[view.targets[s]] += 1;
    }
    counts
}

#[allow(clippy::cast_precision_loss)]
fn gini(counts: &[u32], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts.iter().map(|&c| (f64::from(c) / n).powi(2)).sum::<f64>()
}

/// Lowest weighted-Gini feature among up to `max_features` non-constant candidates,
/// visited in a random order. Constant features do not count towards the budget.
#[allow(clippy::cast_precision_loss)]
fn best_split<R: Rng>(view: &TrainingView<'_>, samples: &[usize], max_features: usize, rng: &mut R) -> Option<usize> {
    let mut order: Vec<usize> = (0..view.n_features).collect();
    order.shuffle(rng);

    let mut best: Option<(usize, f64)> = None;
    let mut visited = 0;
    let mut absent = vec![0u32; view.n_classes];
    let mut present = vec![0u32; view.n_classes];
    for feature in order {
        absent.fill(0);
        present.fill(0);
        let mut n_present = 0usize;
        for &s in samples {
            if view.rows[s][feature] == 1 {
                present[view.targets[s]] += 1;
                n_present += 1;
            } else {
                absent[view.targets[s]] += 1;
            }
        }
        let n_absent = samples.len() - n_present;
        if n_present == 0 || n_absent == 0 {
            continue;
        }
        let score = (n_absent as f64 * gini(&absent, n_absent) + n_present as f64 * gini(&present, n_present))
            / samples.len() as f64;
        match best {
            Some((_, b)) if score >= b => {}
            _ => best = Some((feature, score)),
        }
        visited += 1;
        if visited >= max_features {
            break;
        }
    }
    best.map(|(f, _)| f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(max_features: usize) -> TreeParams {
        TreeParams { max_depth: None, min_samples_split: 2, max_features }
    }

    #[test]
    fn separable_rows_give_pure_leaves() {
        let rows = vec![vec![1, 0], vec![1, 0], vec![0, 1], vec![0, 1]];
        let targets = vec![0, 0, 1, 1];
        let view = TrainingView { rows: &rows, targets: &targets, n_classes: 2, n_features: 2 };
        let tree = DecisionTree::fit(&view, vec![0, 1, 2, 3], params(2), &mut StdRng::seed_from_u64(1));

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.leaf_counts(&[1, 0]), &[2, 0]);
        assert_eq!(tree.leaf_counts(&[0, 1]), &[0, 2]);
        assert!(tree.is_consistent(2, 2));
    }

    #[test]
    fn constant_features_become_a_leaf() {
        let rows = vec![vec![1, 1], vec![1, 1]];
        let targets = vec![0, 1];
        let view = TrainingView { rows: &rows, targets: &targets, n_classes: 2, n_features: 2 };
        let tree = DecisionTree::fit(&view, vec![0, 1], params(1), &mut StdRng::seed_from_u64(1));

        assert_eq!(tree.nodes().len(), 1);
        let mut acc = vec![0.0; 2];
        tree.accumulate_proba(&[1, 1], &mut acc);
        assert_eq!(acc, vec![0.5, 0.5]);
    }

    #[test]
    fn max_depth_caps_growth() {
        let rows = vec![vec![0, 0], vec![0, 1], vec![1, 0], vec![1, 1]];
        let targets = vec![0, 1, 2, 3];
        let view = TrainingView { rows: &rows, targets: &targets, n_classes: 4, n_features: 2 };
        let capped = TreeParams { max_depth: Some(1), ..params(2) };
        let tree = DecisionTree::fit(&view, vec![0, 1, 2, 3], capped, &mut StdRng::seed_from_u64(3));
        assert_eq!(tree.depth(), 1);

        let full = DecisionTree::fit(&view, vec![0, 1, 2, 3], params(2), &mut StdRng::seed_from_u64(3));
        assert_eq!(full.depth(), 2);
    }
}
