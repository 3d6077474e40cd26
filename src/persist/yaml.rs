//! YAML document persistence.

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::PersistError;

/// Reads a YAML file into any deserializable value.
pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, PersistError> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&contents)?)
}

/// Writes a serializable value as a YAML file, overwriting it.
pub fn write_yaml<T: Serialize>(value: &T, path: &Path) -> Result<(), PersistError> {
    let contents = serde_yaml::to_string(value)?;
    fs::write(path, contents)?;
    debug!(path = %path.display(), "wrote YAML document");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn round_trips_a_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");

        let mapping = BTreeMap::from([
            ("carrier".to_string(), "acme".to_string()),
            ("mode".to_string(), "air".to_string()),
        ]);
        write_yaml(&mapping, &path).unwrap();

        let restored: BTreeMap<String, String> = read_yaml(&path).unwrap();
        assert_eq!(restored, mapping);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_yaml::<BTreeMap<String, String>>(Path::new("/nonexistent.yaml"))
            .unwrap_err();
        assert!(matches!(err, PersistError::Io(_)));
    }

    #[test]
    fn malformed_yaml_is_a_yaml_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.yaml");
        fs::write(&path, "a: [unclosed").unwrap();

        let err = read_yaml::<serde_yaml::Value>(&path).unwrap_err();
        assert!(matches!(err, PersistError::Yaml(_)));
    }
}
