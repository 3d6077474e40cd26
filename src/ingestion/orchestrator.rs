//! Data ingestion orchestrator.
//!
//! Coordinates one ingestion run: fetch the configured collection from the
//! document store, drop non-feature columns, drop incomplete rows, split
//! into train/test partitions, write both as CSV, and hand back an artifact
//! descriptor for the downstream training stages.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::dataset::{train_test_split, DataFrame};
use crate::error::{FrameError, SourceError};
use crate::source::DocumentStore;

use super::config::{ConfigError, DataIngestionConfig};

/// Errors that can occur during an ingestion run.
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Document-store read failed.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Frame manipulation or splitting failed.
    #[error("Frame error: {0}")]
    Frame(#[from] FrameError),

    /// Filesystem operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Descriptor of the files one ingestion run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataIngestionArtifacts {
    /// Unique id of the ingestion run.
    pub run_id: Uuid,
    /// When the run finished.
    pub created_at: DateTime<Utc>,
    /// Path of the written train partition.
    pub train_file_path: PathBuf,
    /// Path of the written test partition.
    pub test_file_path: PathBuf,
    /// Rows in the train partition.
    pub train_rows: usize,
    /// Rows in the test partition.
    pub test_rows: usize,
    /// SHA-256 of the train file contents.
    pub train_checksum: String,
    /// SHA-256 of the test file contents.
    pub test_checksum: String,
}

/// Orchestrates one data ingestion run against an injected document store.
pub struct DataIngestion<S: DocumentStore> {
    config: DataIngestionConfig,
    store: S,
}

impl<S: DocumentStore> DataIngestion<S> {
    /// Creates an orchestrator after validating the configuration.
    pub fn new(config: DataIngestionConfig, store: S) -> Result<Self, IngestionError> {
        config.validate()?;
        Ok(Self { config, store })
    }

    /// The configuration this orchestrator runs with.
    pub fn config(&self) -> &DataIngestionConfig {
        &self.config
    }

    /// Fetches the configured collection as a frame. No retry; a store
    /// failure surfaces as an ingestion error.
    pub fn fetch_dataset(&self) -> Result<DataFrame, IngestionError> {
        let frame = self.store.get_collection_as_frame(
            &self.config.db_name,
            &self.config.collection_name,
        )?;
        info!(
            store = self.store.name(),
            rows = frame.n_rows(),
            cols = frame.n_cols(),
            "fetched raw dataset"
        );
        Ok(frame)
    }

    /// Splits a cleaned frame and writes both partitions as headered CSV,
    /// overwriting any previous files at the configured paths. Directory
    /// creation is idempotent.
    pub fn split_as_train_test(
        &self,
        frame: &DataFrame,
    ) -> Result<(DataFrame, DataFrame), IngestionError> {
        fs::create_dir_all(self.config.train_dir())?;
        fs::create_dir_all(self.config.test_dir())?;

        let (train, test) =
            train_test_split(frame, self.config.test_fraction, self.config.split_seed)?;

        train.write_csv(&self.config.train_file_path())?;
        test.write_csv(&self.config.test_file_path())?;
        info!(
            train_rows = train.n_rows(),
            test_rows = test.n_rows(),
            dir = %self.config.artifacts_dir.display(),
            "wrote train/test partitions"
        );

        Ok((train, test))
    }

    /// Runs the full ingestion: fetch, clean, split, describe.
    pub fn run(&self) -> Result<DataIngestionArtifacts, IngestionError> {
        let raw = self.fetch_dataset()?;
        let cleaned = raw.drop_columns(&self.config.drop_columns)?.drop_incomplete();
        info!(
            raw_rows = raw.n_rows(),
            cleaned_rows = cleaned.n_rows(),
            dropped_columns = self.config.drop_columns.len(),
            "cleaned dataset"
        );

        let (train, test) = self.split_as_train_test(&cleaned)?;

        let train_file_path = self.config.train_file_path();
        let test_file_path = self.config.test_file_path();
        let artifacts = DataIngestionArtifacts {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            train_checksum: file_checksum(&train_file_path)?,
            test_checksum: file_checksum(&test_file_path)?,
            train_file_path,
            test_file_path,
            train_rows: train.n_rows(),
            test_rows: test.n_rows(),
        };
        info!(run_id = %artifacts.run_id, "ingestion run complete");
        Ok(artifacts)
    }
}

fn file_checksum(path: &Path) -> Result<String, IngestionError> {
    let bytes = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}
