//! Reference Store: five optional lookup tables keyed by disease label.
//!
//! Each table is loaded independently. A table that is not configured, not on
//! disk, unreadable or missing a column is simply absent, and every lookup
//! against an absent table answers the same as an unmatched label.
//!
//! The workout table keys on lowercase `disease` while the other four key on
//! `Disease`; both spellings are kept as found in the source files.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use healthai_core::config::DataSettings;
use healthai_core::error::{Error, Result};
use healthai_core::table::{cell, column_index, headers, open_csv};
use tracing::{debug, info, warn};

use crate::literal::decode_list;

pub const DISEASE_KEY: &str = "Disease";
pub const WORKOUT_KEY: &str = "disease";
pub const MEDICATION_COLUMN: &str = "Medication";
pub const DESCRIPTION_COLUMN: &str = "Description";
pub const DIET_COLUMN: &str = "Diet";
pub const WORKOUT_COLUMN: &str = "workout";
pub const PRECAUTION_COLUMNS: [&str; 4] = ["Precaution_1", "Precaution_2", "Precaution_3", "Precaution_4"];

#[derive(Debug, Clone, Default)]
pub struct ReferencePaths {
    pub medications: Option<PathBuf>,
    pub descriptions: Option<PathBuf>,
    pub diets: Option<PathBuf>,
    pub precautions: Option<PathBuf>,
    pub workouts: Option<PathBuf>,
}

impl From<&DataSettings> for ReferencePaths {
    fn from(d: &DataSettings) -> Self {
        Self {
            medications: d.medications.as_ref().map(PathBuf::from),
            descriptions: d.descriptions.as_ref().map(PathBuf::from),
            diets: d.diets.as_ref().map(PathBuf::from),
            precautions: d.precautions.as_ref().map(PathBuf::from),
            workouts: d.workouts.as_ref().map(PathBuf::from),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceStore {
    medications: Option<HashMap<String, Vec<String>>>,
    descriptions: Option<HashMap<String, String>>,
    diets: Option<HashMap<String, Vec<String>>>,
    precautions: Option<HashMap<String, Vec<String>>>,
    workouts: Option<HashMap<String, Vec<String>>>,
}

impl ReferenceStore {
    /// Load every configured table; never fails.
    pub fn load(paths: &ReferencePaths) -> Self {
        let store = Self {
            medications: optional("medications", paths.medications.as_deref(), |p| {
                load_list_table(p, DISEASE_KEY, MEDICATION_COLUMN)
            }),
            descriptions: optional("descriptions", paths.descriptions.as_deref(), |p| {
                load_text_table(p, DISEASE_KEY, DESCRIPTION_COLUMN)
            }),
            diets: optional("diets", paths.diets.as_deref(), |p| load_list_table(p, DISEASE_KEY, DIET_COLUMN)),
            precautions: optional("precautions", paths.precautions.as_deref(), load_precautions),
            workouts: optional("workouts", paths.workouts.as_deref(), load_workouts),
        };
        info!(loaded = store.loaded_tables().len(), "reference store ready");
        store
    }

    /// Names of the tables that loaded.
    pub fn loaded_tables(&self) -> Vec<&'static str> {
        [
            ("medications", self.medications.is_some()),
            ("descriptions", self.descriptions.is_some()),
            ("diets", self.diets.is_some()),
            ("precautions", self.precautions.is_some()),
            ("workouts", self.workouts.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, loaded)| loaded.then_some(name))
        .collect()
    }

    pub fn medications(&self, label: &str) -> Vec<String> { lookup(self.medications.as_ref(), label) }

    pub fn description(&self, label: &str) -> String { lookup(self.descriptions.as_ref(), label) }

    pub fn diets(&self, label: &str) -> Vec<String> { lookup(self.diets.as_ref(), label) }

    /// Up to four non-blank precautions in column order.
    pub fn precautions(&self, label: &str) -> Vec<String> { lookup(self.precautions.as_ref(), label) }

    /// Every workout row for the label, in file order.
    pub fn workouts(&self, label: &str) -> Vec<String> { lookup(self.workouts.as_ref(), label) }
}

fn lookup<T: Clone + Default>(table: Option<&HashMap<String, T>>, label: &str) -> T {
    table.and_then(|t| t.get(label)).cloned().unwrap_or_default()
}

/// Run `loader` when a path is configured, logging why a table ends up absent.
fn optional<T>(table: &str, path: Option<&Path>, loader: impl FnOnce(&Path) -> Result<T>) -> Option<T> {
    let Some(path) = path else {
        debug!(table, "no path configured");
        return None;
    };
    match loader(path) {
        Ok(t) => {
            debug!(table, path = %path.display(), "reference table loaded");
            Some(t)
        }
        Err(e @ Error::NotFound(_)) => {
            warn!(table, kind = e.kind(), "reference table file not found: {e}");
            None
        }
        Err(e @ Error::Schema { .. }) => {
            warn!(table, kind = e.kind(), "reference table schema mismatch: {e}");
            None
        }
        Err(e) => {
            warn!(table, kind = e.kind(), "reference table unreadable: {e}");
            None
        }
    }
}

/// One list per label; the first row for a label wins.
pub fn load_list_table(path: &Path, key_column: &str, value_column: &str) -> Result<HashMap<String, Vec<String>>> {
    let mut map = HashMap::new();
    for_each_row(path, key_column, &[value_column], |key, values| {
        map.entry(key).or_insert_with(|| values[0].map(decode_list).unwrap_or_default());
    })?;
    Ok(map)
}

/// One text per label; the first row for a label wins. Blank cells read as "".
pub fn load_text_table(path: &Path, key_column: &str, value_column: &str) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    for_each_row(path, key_column, &[value_column], |key, values| {
        map.entry(key).or_insert_with(|| values[0].unwrap_or_default().to_string());
    })?;
    Ok(map)
}

/// `Precaution_1..4` per label, blanks dropped. Only `Disease` is required;
/// precaution columns missing from the file are skipped.
pub fn load_precautions(path: &Path) -> Result<HashMap<String, Vec<String>>> {
    let mut reader = open_csv(path)?;
    let header = headers(&mut reader, path)?;
    let key_idx = column_index(&header, DISEASE_KEY, path)?;
    let cols: Vec<usize> = PRECAUTION_COLUMNS.iter().filter_map(|c| column_index(&header, c, path).ok()).collect();

    let mut map = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|e| Error::malformed(path, e))?;
        let Some(key) = cell(&record, key_idx) else { continue };
        map.entry(key.to_string())
            .or_insert_with(|| cols.iter().filter_map(|&c| cell(&record, c)).map(str::to_string).collect());
    }
    Ok(map)
}

/// All workouts per label (one-to-many), in file order. Keys on lowercase `disease`.
pub fn load_workouts(path: &Path) -> Result<HashMap<String, Vec<String>>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for_each_row(path, WORKOUT_KEY, &[WORKOUT_COLUMN], |key, values| {
        if let Some(w) = values[0] {
            map.entry(key).or_default().push(w.to_string());
        }
    })?;
    Ok(map)
}

/// Stream `(key, [value cells])` for rows with a non-blank key.
fn for_each_row(path: &Path, key_column: &str, value_columns: &[&str], mut f: impl FnMut(String, &[Option<&str>])) -> Result<()> {
    let mut reader = open_csv(path)?;
    let header = headers(&mut reader, path)?;
    let key_idx = column_index(&header, key_column, path)?;
    let value_idx = value_columns
        .iter()
        .map(|c| column_index(&header, c, path))
        .collect::<Result<Vec<_>>>()?;
    for record in reader.records() {
        let record = record.map_err(|e| Error::malformed(path, e))?;
        let Some(key) = cell(&record, key_idx) else { continue };
        let values: Vec<Option<&str>> = value_idx.iter().map(|&i| cell(&record, i)).collect();
        f(key.to_string(), &values);
    }
    Ok(())
}
