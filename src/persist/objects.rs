//! Generic object persistence.
//!
//! Serializes any serde-representable value to pretty-printed JSON, the
//! format the pipeline's other descriptors already use. Fitted-model state
//! persists the same way as plain mappings.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::PersistError;

/// Saves a serializable object to a file.
pub fn save_object<T: Serialize>(path: &Path, object: &T) -> Result<(), PersistError> {
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, object)?;
    debug!(path = %path.display(), "saved object");
    Ok(())
}

/// Loads an object previously written by [`save_object`].
pub fn load_object<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    /// Stand-in for a fitted estimator's persisted state.
    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct FittedStub {
        name: String,
        coefficients: Vec<f64>,
        intercept: f64,
    }

    #[test]
    fn round_trips_a_plain_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");

        let mapping = BTreeMap::from([("alpha".to_string(), 0.5), ("beta".to_string(), 2.0)]);
        save_object(&path, &mapping).unwrap();

        let restored: BTreeMap<String, f64> = load_object(&path).unwrap();
        assert_eq!(restored, mapping);
    }

    #[test]
    fn round_trips_a_fitted_estimator_stub() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let fitted = FittedStub {
            name: "RidgeRegression".to_string(),
            coefficients: vec![1.25, -0.5],
            intercept: 3.75,
        };
        save_object(&path, &fitted).unwrap();

        let restored: FittedStub = load_object(&path).unwrap();
        assert_eq!(restored, fitted);
    }

    #[test]
    fn deserializing_the_wrong_shape_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapping.json");
        save_object(&path, &vec![1, 2, 3]).unwrap();

        let err = load_object::<FittedStub>(&path).unwrap_err();
        assert!(matches!(err, PersistError::Json(_)));
    }
}
