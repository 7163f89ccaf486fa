use crate::types::ClassPrediction;

/// A fitted multi-class model over binary symptom vectors.
pub trait Classifier: Send + Sync {
    /// Class labels in the order used by `predict_proba`.
    fn classes(&self) -> &[String];
    /// Expected feature vector width.
    fn n_features(&self) -> usize;
    /// Probability mass per class; sums to 1 for a fitted model.
    fn predict_proba(&self, features: &[u8]) -> Vec<f64>;

    /// Argmax class with its probability. Ties go to the lowest class index.
    fn predict(&self, features: &[u8]) -> Option<ClassPrediction> {
        let probabilities = self.predict_proba(features);
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in probabilities.iter().enumerate() {
            let better = match best {
                Some((_, bp)) => p > bp,
                None => true,
            };
            if better {
                best = Some((i, p));
            }
        }
        let (idx, confidence) = best?;
        let label = self.classes().get(idx)?.clone();
        Some(ClassPrediction { label, confidence, probabilities, classes: self.classes().to_vec() })
    }
}
