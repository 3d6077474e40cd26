//! Configuration for the data ingestion stage.

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

/// File name of the train partition inside the train directory.
pub const TRAIN_FILE_NAME: &str = "train.csv";

/// File name of the test partition inside the test directory.
pub const TEST_FILE_NAME: &str = "test.csv";

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration for one ingestion run. Read-only once constructed.
#[derive(Debug, Clone)]
pub struct DataIngestionConfig {
    /// Database to read from.
    pub db_name: String,
    /// Collection holding the raw shipment records.
    pub collection_name: String,
    /// Root directory for ingestion artifacts.
    pub artifacts_dir: PathBuf,
    /// Columns to remove before splitting (non-feature fields).
    pub drop_columns: Vec<String>,
    /// Fraction of rows assigned to the test partition.
    pub test_fraction: f64,
    /// Seed for the split shuffle (None = non-deterministic).
    pub split_seed: Option<u64>,
}

impl Default for DataIngestionConfig {
    fn default() -> Self {
        Self {
            db_name: "freight".to_string(),
            collection_name: "shipments".to_string(),
            artifacts_dir: PathBuf::from("./artifacts/data_ingestion"),
            drop_columns: vec!["_id".to_string()],
            test_fraction: 0.2,
            split_seed: None,
        }
    }
}

impl DataIngestionConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory the train partition is written into.
    pub fn train_dir(&self) -> PathBuf {
        self.artifacts_dir.join("train")
    }

    /// Directory the test partition is written into.
    pub fn test_dir(&self) -> PathBuf {
        self.artifacts_dir.join("test")
    }

    /// Full path of the train partition file.
    pub fn train_file_path(&self) -> PathBuf {
        self.train_dir().join(TRAIN_FILE_NAME)
    }

    /// Full path of the test partition file.
    pub fn test_file_path(&self) -> PathBuf {
        self.test_dir().join(TEST_FILE_NAME)
    }

    /// Creates configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `FREIGHT_DB_NAME`: database name (default: freight)
    /// - `FREIGHT_COLLECTION`: collection name (default: shipments)
    /// - `FREIGHT_ARTIFACTS_DIR`: artifact root (default: ./artifacts/data_ingestion)
    /// - `FREIGHT_DROP_COLUMNS`: comma-separated column names (default: _id)
    /// - `FREIGHT_TEST_FRACTION`: test split fraction (default: 0.2)
    /// - `FREIGHT_SPLIT_SEED`: shuffle seed (default: unset)
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("FREIGHT_DB_NAME") {
            config.db_name = val;
        }

        if let Ok(val) = std::env::var("FREIGHT_COLLECTION") {
            config.collection_name = val;
        }

        if let Ok(val) = std::env::var("FREIGHT_ARTIFACTS_DIR") {
            config.artifacts_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var("FREIGHT_DROP_COLUMNS") {
            config.drop_columns = val.split(',').map(|s| s.trim().to_string()).collect();
        }

        if let Ok(val) = std::env::var("FREIGHT_TEST_FRACTION") {
            config.test_fraction = parse_env_value(&val, "FREIGHT_TEST_FRACTION")?;
        }

        if let Ok(val) = std::env::var("FREIGHT_SPLIT_SEED") {
            config.split_seed = Some(parse_env_value(&val, "FREIGHT_SPLIT_SEED")?);
        }

        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "db_name must not be empty".to_string(),
            ));
        }
        if self.collection_name.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "collection_name must not be empty".to_string(),
            ));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "test_fraction must lie in (0, 1), got {}",
                self.test_fraction
            )));
        }
        Ok(())
    }
}

fn parse_env_value<T>(val: &str, key: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    val.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        key: key.to_string(),
        message: e.to_string(),
    })
}
