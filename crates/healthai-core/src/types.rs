//! Domain types shared by the model, reference and pipeline crates.

use serde::{Deserialize, Serialize};

/// Raw classifier output for one feature vector.
///
/// `probabilities[i]` is the mass assigned to `classes[i]`; `label` is the
/// argmax class and `confidence` its mass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassPrediction {
    pub label: String,
    pub confidence: f64,
    pub probabilities: Vec<f64>,
    pub classes: Vec<String>,
}

/// One enriched prediction, built fresh for every call.
///
/// - `confidence`: probability in [0, 1] of the predicted class
/// - `precision`: share in [0, 100] of recognized inputs that belong to the
///   disease's characteristic symptoms (0 when nothing was recognized)
/// - `symptoms` / `disease_symptoms`: display-formatted
/// - reference fields are empty when no table row matched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub disease: String,
    pub confidence: f64,
    pub precision: f64,
    pub symptoms: Vec<String>,
    pub disease_symptoms: Vec<String>,
    pub medications: Vec<String>,
    pub description: String,
    pub diets: Vec<String>,
    pub precautions: Vec<String>,
    pub workouts: Vec<String>,
}

impl PredictionResult {
    /// Confidence as a percentage string, e.g. `"87.50%"`.
    pub fn confidence_percent(&self) -> String { format!("{:.2}%", self.confidence * 100.0) }

    /// Precision as a percentage string, e.g. `"100.00%"`.
    pub fn precision_percent(&self) -> String { format!("{:.2}%", self.precision) }
}
