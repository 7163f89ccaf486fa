//! Saving and loading a fitted forest.
//!
//! The file is a JSON document written atomically: serialize into a temp file
//! in the destination directory, then rename over the target.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use healthai_core::error::{Error, Result};
use healthai_core::training::TrainingTable;
use healthai_core::traits::Classifier;
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use crate::forest::{ForestParams, RandomForest};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct ModelFile {
    format_version: u32,
    forest: RandomForest,
}

/// Where the model in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelOrigin {
    Loaded,
    Trained,
}

impl RandomForest {
    pub fn save(&self, path: &Path) -> Result<()> {
        let parent_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent_dir)?;

        let temp_file = NamedTempFile::new_in(parent_dir)?;
        {
            let mut writer = BufWriter::new(temp_file.as_file());
            let doc = ModelFile { format_version: FORMAT_VERSION, forest: self.clone() };
            serde_json::to_writer(&mut writer, &doc).map_err(|e| Error::Operation(format!("serialize model: {e}")))?;
            writer.flush()?;
        }
        temp_file.persist(path).map_err(|e| Error::Io(e.error))?;
        info!(path = %path.display(), "model saved");
        Ok(())
    }

    /// Read a saved forest. A missing file is `NotFound`; unreadable or inconsistent content is `Malformed`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::NotFound(path.to_path_buf()));
        }
        let reader = BufReader::new(File::open(path)?);
        let doc: ModelFile = serde_json::from_reader(reader).map_err(|e| Error::malformed(path, e))?;
        if doc.format_version != FORMAT_VERSION {
            return Err(Error::malformed(path, format!("unsupported format version {}", doc.format_version)));
        }
        if !doc.forest.is_consistent() {
            return Err(Error::malformed(path, "inconsistent tree structure"));
        }
        info!(path = %path.display(), trees = doc.forest.trees().len(), "model loaded");
        Ok(doc.forest)
    }

    /// Load `path` if it holds a forest trained on `table`'s vocabulary and labels, otherwise train.
    ///
    /// Never fails on a bad model file: the cause is logged and a fresh forest is
    /// trained (and written back when `save_after_training` is set).
    pub fn load_or_train(
        path: Option<&Path>,
        table: &TrainingTable,
        params: &ForestParams,
        save_after_training: bool,
        progress: &ProgressBar,
    ) -> Result<(Self, ModelOrigin)> {
        if let Some(path) = path {
            match Self::load(path).and_then(|f| check_features(f, table, path)) {
                Ok(forest) => return Ok((forest, ModelOrigin::Loaded)),
                Err(Error::NotFound(_)) => info!(path = %path.display(), "no saved model, training"),
                Err(e) => warn!(path = %path.display(), kind = e.kind(), error = %e, "could not load model, retraining"),
            }
        }
        let forest = Self::fit_with_progress(table, params, progress)?;
        if let (Some(path), true) = (path, save_after_training) {
            if let Err(e) = forest.save(path) {
                warn!(path = %path.display(), error = %e, "could not save trained model");
            }
        }
        Ok((forest, ModelOrigin::Trained))
    }
}

/// A saved forest is reusable only for the same feature columns and the same disease labels.
fn check_features(forest: RandomForest, table: &TrainingTable, path: &Path) -> Result<RandomForest> {
    if forest.features() != table.vocabulary().tokens() {
        return Err(Error::malformed(path, "feature columns differ from the training table"));
    }
    if forest.classes() != table.classes().as_slice() {
        return Err(Error::malformed(path, "class labels differ from the training table"));
    }
    Ok(forest)
}
