//! Persistence toolkit: YAML documents, numeric arrays, serialized objects
//! and zip archives.

pub mod archive;
pub mod array;
pub mod objects;
pub mod yaml;

pub use archive::{unzip, zip_dir};
pub use array::{load_array, save_array};
pub use objects::{load_object, save_object};
pub use yaml::{read_yaml, write_yaml};
