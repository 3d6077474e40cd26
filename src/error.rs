//! Error types for freight-forge operations.
//!
//! Defines tagged error types for the major subsystems:
//! - Document-store reads
//! - Tabular frame manipulation and splitting
//! - Model resolution, fitting and tuning
//! - Persistence (YAML, arrays, objects, archives)
//!
//! Ingestion and configuration errors live next to their components in
//! `ingestion::orchestrator` and `ingestion::config`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading from a document store.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Collection '{collection}' not found in database '{db}'")]
    CollectionNotFound { db: String, collection: String },

    #[error("Collection '{collection}' in database '{db}' is not an array of documents")]
    NotADocumentArray { db: String, collection: String },

    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during frame manipulation and splitting.
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Column '{0}' not found in frame")]
    UnknownColumn(String),

    #[error("Cannot split an empty frame")]
    EmptyFrame,

    #[error("Frame with {0} rows cannot be split into two non-empty partitions")]
    TooFewRows(usize),

    #[error("Test fraction {0} is outside the open interval (0, 1)")]
    InvalidFraction(f64),

    #[error("Non-numeric value in column '{column}' at row {row}")]
    NonNumeric { column: String, row: usize },

    #[error("Row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors that can occur during model resolution, fitting and tuning.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Unknown model '{0}'")]
    UnknownModel(String),

    #[error("No hyperparameter grid defined for model '{0}'")]
    NoParamGrid(String),

    #[error("Invalid value for parameter '{name}': {message}")]
    InvalidParam { name: String, message: String },

    #[error("Shape mismatch: {left} observations vs {right} predictions")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Model '{0}' has not been fitted")]
    NotFitted(&'static str),

    #[error("Training set is empty")]
    EmptyTrainingSet,

    #[error("Normal equations are singular; features may be collinear")]
    SingularSystem,

    #[error("Cannot run {cv}-fold cross-validation on {rows} rows")]
    TooFewRows { cv: usize, rows: usize },

    #[error("Cannot reduce an empty model list")]
    EmptyModelList,

    #[error("Model config error: {0}")]
    Config(#[from] PersistError),
}

/// Errors that can occur during persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("Archive entry '{0}' escapes the extraction directory")]
    UnsafeArchivePath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}
