//! Labeled training table: binary symptom flags plus one disease label per row.

use std::path::Path;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::table::{column_index, headers, open_csv};
use crate::vocabulary::SymptomVocabulary;

pub const DEFAULT_LABEL_COLUMN: &str = "prognosis";

#[derive(Debug, Clone)]
pub struct TrainingTable {
    vocabulary: SymptomVocabulary,
    rows: Vec<Vec<u8>>,
    labels: Vec<String>,
}

impl TrainingTable {
    /// Load a CSV whose header defines the vocabulary and whose `label_column` holds the disease.
    pub fn load(path: &Path, label_column: &str) -> Result<Self> {
        let mut reader = open_csv(path)?;
        let header = headers(&mut reader, path)?;
        let label_idx = column_index(&header, label_column, path)?;
        let vocabulary = SymptomVocabulary::from_headers(&header, label_column);

        // Map each CSV column to its vocabulary slot; a repeated header only counts once.
        let mut taken = vec![false; vocabulary.len()];
        let mut slots = Vec::with_capacity(header.len());
        for (i, h) in header.iter().enumerate() {
            let slot = if i == label_idx { None } else { vocabulary.index_of(h) };
            slots.push(slot.filter(|&s| !std::mem::replace(&mut taken[s], true)));
        }

        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for (line, record) in reader.records().enumerate() {
            let record = record.map_err(|e| Error::malformed(path, e))?;
            let label = record.get(label_idx).map(str::trim).unwrap_or_default();
            if label.is_empty() {
                return Err(Error::malformed(path, format!("row {} has an empty label", line + 1)));
            }
            let mut row = vec![0u8; vocabulary.len()];
            for (col, slot) in slots.iter().enumerate() {
                let Some(slot) = *slot else { continue };
                let raw = record.get(col).unwrap_or_default();
                row[slot] = parse_flag(raw).ok_or_else(|| {
                    Error::malformed(path, format!("row {} column '{}' is not 0/1: '{}'", line + 1, header[col], raw))
                })?;
            }
            rows.push(row);
            labels.push(label.to_string());
        }
        if rows.is_empty() {
            return Err(Error::malformed(path, "no data rows"));
        }
        info!(path = %path.display(), rows = rows.len(), symptoms = vocabulary.len(), "training table loaded");
        Ok(Self { vocabulary, rows, labels })
    }

    /// Build from in-memory rows. Every row must match the vocabulary width and hold only 0/1.
    pub fn from_rows(vocabulary: SymptomVocabulary, rows: Vec<Vec<u8>>, labels: Vec<String>) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(Error::Operation(format!("{} rows but {} labels", rows.len(), labels.len())));
        }
        if let Some(i) = rows.iter().position(|r| r.len() != vocabulary.len() || r.iter().any(|&v| v > 1)) {
            return Err(Error::Operation(format!("row {i} is not a binary vector of width {}", vocabulary.len())));
        }
        Ok(Self { vocabulary, rows, labels })
    }

    pub fn vocabulary(&self) -> &SymptomVocabulary { &self.vocabulary }

    pub fn rows(&self) -> &[Vec<u8>] { &self.rows }

    pub fn labels(&self) -> &[String] { &self.labels }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Sorted, de-duplicated labels.
    pub fn classes(&self) -> Vec<String> {
        let mut classes = self.labels.clone();
        classes.sort();
        classes.dedup();
        classes
    }

    /// Tokens flagged 1 in the first row carrying `label`; empty for unknown labels.
    pub fn characteristic_symptoms(&self, label: &str) -> Vec<String> {
        let Some(pos) = self.labels.iter().position(|l| l == label) else { return Vec::new() };
        self.rows[pos]
            .iter()
            .zip(self.vocabulary.tokens())
            .filter(|(flag, _)| **flag == 1)
            .map(|(_, token)| token.clone())
            .collect()
    }

    /// Rows at `indices`, sharing this table's vocabulary.
    pub fn subset(&self, indices: &[usize]) -> Self {
        let rows = indices.iter().filter_map(|&i| self.rows.get(i).cloned()).collect();
        let labels = indices.iter().filter_map(|&i| self.labels.get(i).cloned()).collect();
        Self { vocabulary: self.vocabulary.clone(), rows, labels }
    }

    /// Seeded shuffle then split into (train, test) with `fraction` of rows (rounded up) held out.
    pub fn split_holdout(&self, fraction: f64, seed: u64) -> Result<(Self, Self)> {
        if !(fraction > 0.0 && fraction < 1.0) {
            return Err(Error::InvalidConfig(format!("holdout fraction must be in (0, 1), got {fraction}")));
        }
        if self.len() < 2 {
            return Err(Error::Operation("need at least two rows to hold some out".to_string()));
        }
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(&mut StdRng::seed_from_u64(seed));
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
        let test_n = ((self.len() as f64 * fraction).ceil() as usize).clamp(1, self.len() - 1);
        let (test, train) = indices.split_at(test_n);
        debug!(train = train.len(), test = test.len(), "holdout split");
        Ok((self.subset(train), self.subset(test)))
    }
}

fn parse_flag(raw: &str) -> Option<u8> {
    match raw.trim() {
        "0" | "0.0" => Some(0),
        "1" | "1.0" => Some(1),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, body: &str) -> std::path::PathBuf {
        let path = dir.path().join("training.csv");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_rows_and_vocabulary() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "fever,cough,fatigue,prognosis\n1,1,1,Flu\n0,1,0,Cold\n");
        let table = TrainingTable::load(&path, "prognosis").unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.vocabulary().tokens(), &["fever", "cough", "fatigue"]);
        assert_eq!(table.rows()[1], vec![0, 1, 0]);
        assert_eq!(table.classes(), vec!["Cold".to_string(), "Flu".to_string()]);
        assert_eq!(table.characteristic_symptoms("Flu"), vec!["fever", "cough", "fatigue"]);
        assert!(table.characteristic_symptoms("Unknown").is_empty());
    }

    #[test]
    fn label_column_may_sit_anywhere() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "prognosis,fever,cough\nFlu,1,0\n");
        let table = TrainingTable::load(&path, "prognosis").unwrap();
        assert_eq!(table.vocabulary().tokens(), &["fever", "cough"]);
        assert_eq!(table.rows()[0], vec![1, 0]);
    }

    #[test]
    fn characteristic_set_uses_first_matching_row() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "fever,cough,prognosis\n1,0,Flu\n0,1,Flu\n");
        let table = TrainingTable::load(&path, "prognosis").unwrap();
        assert_eq!(table.characteristic_symptoms("Flu"), vec!["fever"]);
    }

    #[test]
    fn distinguishes_missing_malformed_and_schema() {
        let dir = TempDir::new().unwrap();
        let missing = TrainingTable::load(&dir.path().join("nope.csv"), "prognosis").unwrap_err();
        assert_eq!(missing.kind(), "not_found");

        let bad_value = write(&dir, "fever,prognosis\n2,Flu\n");
        assert_eq!(TrainingTable::load(&bad_value, "prognosis").unwrap_err().kind(), "malformed");

        let no_label = write(&dir, "fever,disease\n1,Flu\n");
        assert_eq!(TrainingTable::load(&no_label, "prognosis").unwrap_err().kind(), "schema_mismatch");
    }

    #[test]
    fn holdout_split_is_seeded_and_disjoint() {
        let vocab = SymptomVocabulary::from_headers(&["a", "b"], "prognosis");
        let rows = (0..10).map(|i| vec![(i % 2) as u8, 1]).collect();
        let labels = (0..10).map(|i| format!("D{i}")).collect();
        let table = TrainingTable::from_rows(vocab, rows, labels).unwrap();

        let (train, test) = table.split_holdout(0.2, 42).unwrap();
        assert_eq!((train.len(), test.len()), (8, 2));
        for label in test.labels() {
            assert!(!train.labels().contains(label));
        }

        let (train2, _) = table.split_holdout(0.2, 42).unwrap();
        assert_eq!(train.labels(), train2.labels());
        assert!(table.split_holdout(1.0, 42).is_err());
    }
}
