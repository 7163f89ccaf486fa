//! healthai-pipeline
//!
//! Symptom strings in, enriched prediction out: normalize against the
//! vocabulary, build the binary vector, classify, score the overlap with the
//! disease's characteristic symptoms and join the reference tables.
use std::path::Path;
use std::time::Instant;

use healthai_core::config::Settings;
use healthai_core::error::{Error, Result};
use healthai_core::training::TrainingTable;
use healthai_core::traits::Classifier;
use healthai_core::types::{ClassPrediction, PredictionResult};
use healthai_core::vocabulary::{display, SymptomVocabulary};
use healthai_model::{ForestParams, ModelOrigin, RandomForest};
use healthai_reference::{ReferencePaths, ReferenceStore, SymptomCatalog};
use indicatif::ProgressBar;
use tracing::{debug, info};

/// Built once at start-up and shared read-only by every request.
pub struct DiseasePredictor<C: Classifier = RandomForest> {
    table: TrainingTable,
    classifier: C,
    reference: ReferenceStore,
    catalog: SymptomCatalog,
}

impl DiseasePredictor<RandomForest> {
    pub fn initialize(settings: &Settings) -> Result<Self> {
        Self::initialize_with_progress(settings, &ProgressBar::hidden())
    }

    /// Load the training table, load or train the forest, then load the reference tables.
    ///
    /// Only an unreadable training table is an error; model and reference problems
    /// degrade to retraining and empty lookups.
    pub fn initialize_with_progress(settings: &Settings, progress: &ProgressBar) -> Result<Self> {
        let start = Instant::now();
        let table = TrainingTable::load(Path::new(&settings.data.training), &settings.data.label_column)?;
        let (forest, origin) = RandomForest::load_or_train(
            settings.model.path.as_deref().map(Path::new),
            &table,
            &ForestParams::from(&settings.model),
            settings.model.save_after_training,
            progress,
        )?;
        let reference = ReferenceStore::load(&ReferencePaths::from(&settings.data));
        let catalog = SymptomCatalog::load_optional(settings.data.symptom_severity.as_deref().map(Path::new));
        info!(
            model = if origin == ModelOrigin::Loaded { "loaded" } else { "trained" },
            elapsed_ms = start.elapsed().as_millis() as u64,
            "predictor initialized"
        );
        Ok(Self::new(table, forest, reference)?.with_catalog(catalog))
    }
}

impl<C: Classifier> DiseasePredictor<C> {
    /// Wire a fitted classifier to its training table. The classifier must know
    /// at least one class and expect one feature per vocabulary token.
    pub fn new(table: TrainingTable, classifier: C, reference: ReferenceStore) -> Result<Self> {
        if classifier.classes().is_empty() {
            return Err(Error::Operation("classifier has no classes".to_string()));
        }
        if classifier.n_features() != table.vocabulary().len() {
            return Err(Error::Operation(format!(
                "classifier expects {} features, vocabulary has {}",
                classifier.n_features(),
                table.vocabulary().len()
            )));
        }
        Ok(Self { table, classifier, reference, catalog: SymptomCatalog::default() })
    }

    pub fn with_catalog(mut self, catalog: SymptomCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary { self.table.vocabulary() }

    pub fn classifier(&self) -> &C { &self.classifier }

    pub fn reference(&self) -> &ReferenceStore { &self.reference }

    pub fn catalog(&self) -> &SymptomCatalog { &self.catalog }

    /// Vocabulary in display form.
    pub fn available_symptoms(&self) -> Vec<String> { self.vocabulary().display_tokens() }

    /// Predict from free-text symptoms. Unknown symptoms are dropped; with none
    /// recognized the classifier sees an all-zero vector and precision is 0.
    /// A symptom given twice counts twice in precision and is listed twice.
    pub fn predict<S: AsRef<str>>(&self, inputs: &[S]) -> PredictionResult {
        let vocabulary = self.vocabulary();
        let recognized = vocabulary.recognize(inputs);
        let vector = vocabulary.feature_vector(&recognized);
        debug!(inputs = inputs.len(), recognized = recognized.len(), "feature vector built");

        let ClassPrediction { label, confidence, .. } =
            self.classifier.predict(&vector).unwrap_or_else(|| ClassPrediction {
                label: String::new(),
                confidence: 0.0,
                probabilities: Vec::new(),
                classes: Vec::new(),
            });

        let characteristic = self.table.characteristic_symptoms(&label);
        let precision = precision(&recognized, &characteristic);
        info!(disease = %label, confidence, precision, "prediction");

        PredictionResult {
            confidence,
            precision,
            symptoms: recognized.iter().map(|s| display(s)).collect(),
            disease_symptoms: characteristic.iter().map(|s| display(s)).collect(),
            medications: self.reference.medications(&label),
            description: self.reference.description(&label),
            diets: self.reference.diets(&label),
            precautions: self.reference.precautions(&label),
            workouts: self.reference.workouts(&label),
            disease: label,
        }
    }
}

/// Percentage of `recognized` found in `characteristic`; 0 when nothing was recognized.
#[allow(clippy::cast_precision_loss)]
pub fn precision(recognized: &[String], characteristic: &[String]) -> f64 {
    if recognized.is_empty() {
        return 0.0;
    }
    let matching = recognized.iter().filter(|&s| characteristic.contains(s)).count();
    matching as f64 / recognized.len() as f64 * 100.0
}
