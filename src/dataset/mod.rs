//! Tabular dataset handling: frames, cleaning and train/test splitting.

pub mod frame;
pub mod split;

pub use frame::DataFrame;
pub use split::train_test_split;
