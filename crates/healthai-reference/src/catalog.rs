//! Symptom severity catalog shown next to the symptom picker.

use std::path::Path;

use healthai_core::error::{Error, Result};
use healthai_core::table::{cell, column_index, headers, open_csv};
use healthai_core::vocabulary::{display, normalize};
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymptomInfo {
    /// Vocabulary token, e.g. `skin_rash`.
    pub symptom: String,
    /// Display name, e.g. `Skin rash`.
    pub name: String,
    pub weight: i32,
    /// Optional illustration.
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SymptomCatalog {
    entries: Vec<SymptomInfo>,
}

impl SymptomCatalog {
    /// Read `Symptom`, `weight` and optional `url` columns. Rows without an integer weight are skipped.
    pub fn load(path: &Path) -> Result<Self> {
        let mut reader = open_csv(path)?;
        let header = headers(&mut reader, path)?;
        let symptom_idx = column_index(&header, "Symptom", path)?;
        let weight_idx = column_index(&header, "weight", path)?;
        let url_idx = column_index(&header, "url", path).ok();

        let mut entries = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::malformed(path, e))?;
            let Some(raw) = cell(&record, symptom_idx) else { continue };
            let Some(weight) = cell(&record, weight_idx).and_then(|w| w.parse::<i32>().ok()) else {
                warn!(path = %path.display(), symptom = raw, "skipping symptom without an integer weight");
                continue;
            };
            let symptom = normalize(raw);
            entries.push(SymptomInfo {
                name: display(&symptom),
                symptom,
                weight,
                url: url_idx.and_then(|i| cell(&record, i)).map(str::to_string),
            });
        }
        Ok(Self { entries })
    }

    /// Like [`SymptomCatalog::load`] but an empty catalog on any failure.
    pub fn load_optional(path: Option<&Path>) -> Self {
        let Some(path) = path else { return Self::default() };
        Self::load(path).unwrap_or_else(|e| {
            warn!(kind = e.kind(), "symptom catalog unavailable: {e}");
            Self::default()
        })
    }

    pub fn entries(&self) -> &[SymptomInfo] { &self.entries }

    pub fn get(&self, symptom: &str) -> Option<&SymptomInfo> {
        let token = normalize(symptom);
        self.entries.iter().find(|e| e.symptom == token)
    }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}
