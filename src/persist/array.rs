//! Numeric array persistence.
//!
//! Arrays round-trip through serde, the same persistence layer the rest of
//! the crate uses, so integer and float payloads come back exactly as
//! written.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ndarray::{Array, Dimension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::PersistError;

/// Saves a numeric array to a file.
pub fn save_array<A, D>(path: &Path, array: &Array<A, D>) -> Result<(), PersistError>
where
    A: Serialize,
    D: Dimension + Serialize,
{
    let writer = BufWriter::new(File::create(path)?);
    Ok(serde_json::to_writer(writer, array)?)
}

/// Loads a numeric array from a file written by [`save_array`].
pub fn load_array<A, D>(path: &Path) -> Result<Array<A, D>, PersistError>
where
    A: DeserializeOwned,
    D: Dimension + DeserializeOwned,
{
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
