use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed file {}: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("Schema mismatch in {}: missing column '{column}'", path.display())]
    Schema { path: PathBuf, column: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn malformed(path: &Path, reason: impl ToString) -> Self {
        Self::Malformed { path: path.to_path_buf(), reason: reason.to_string() }
    }

    pub fn schema(path: &Path, column: &str) -> Self {
        Self::Schema { path: path.to_path_buf(), column: column.to_string() }
    }

    /// Short machine-friendly tag used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidConfig(_) => "invalid_config",
            Self::NotFound(_) => "not_found",
            Self::Malformed { .. } => "malformed",
            Self::Schema { .. } => "schema_mismatch",
            Self::Io(_) => "io",
            Self::Operation(_) => "operation",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

