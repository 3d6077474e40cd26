//! Document-store collaborator.
//!
//! The pipeline only ever reads one thing from the store: a whole collection
//! as a tabular frame. `DocumentStore` is that seam; the database driver
//! behind it is not this crate's concern. `JsonFileStore` is the shipped
//! implementation, backed by plain JSON files, and is what tests and local
//! runs inject.

use std::fs;
use std::path::PathBuf;

use serde_json::Value;
use tracing::info;

use crate::dataset::DataFrame;
use crate::error::SourceError;

/// Read access to a document store.
pub trait DocumentStore: Send + Sync {
    /// Store name, for logging.
    fn name(&self) -> &str;

    /// Fetches an entire collection as a tabular frame.
    fn get_collection_as_frame(
        &self,
        db_name: &str,
        collection_name: &str,
    ) -> Result<DataFrame, SourceError>;
}

/// Document store backed by JSON files on disk.
///
/// A collection lives at `<root>/<db>/<collection>.json` and holds a JSON
/// array of documents.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at the given directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_path(&self, db_name: &str, collection_name: &str) -> PathBuf {
        self.root
            .join(db_name)
            .join(format!("{collection_name}.json"))
    }
}

impl DocumentStore for JsonFileStore {
    fn name(&self) -> &str {
        "json-file"
    }

    fn get_collection_as_frame(
        &self,
        db_name: &str,
        collection_name: &str,
    ) -> Result<DataFrame, SourceError> {
        let path = self.collection_path(db_name, collection_name);
        if !path.exists() {
            return Err(SourceError::CollectionNotFound {
                db: db_name.to_string(),
                collection: collection_name.to_string(),
            });
        }

        let contents = fs::read_to_string(&path)?;
        let value: Value = serde_json::from_str(&contents)?;

        let docs = match value {
            Value::Array(entries) => entries
                .into_iter()
                .map(|entry| match entry {
                    Value::Object(doc) => Ok(doc),
                    _ => Err(SourceError::NotADocumentArray {
                        db: db_name.to_string(),
                        collection: collection_name.to_string(),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()?,
            _ => {
                return Err(SourceError::NotADocumentArray {
                    db: db_name.to_string(),
                    collection: collection_name.to_string(),
                })
            }
        };

        info!(
            db = db_name,
            collection = collection_name,
            documents = docs.len(),
            "fetched collection"
        );
        Ok(DataFrame::from_documents(&docs))
    }
}
