//! Randomized train/test splitting.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::error::FrameError;

use super::frame::DataFrame;

/// Splits a frame into train and test partitions.
///
/// Row indices are shuffled with a ChaCha8 RNG (seeded for reproducibility
/// when `seed` is set) and the first `round(n * test_fraction)` rows become
/// the test partition, clamped so both partitions are non-empty. The two
/// partitions are disjoint and together contain every input row.
pub fn train_test_split(
    frame: &DataFrame,
    test_fraction: f64,
    seed: Option<u64>,
) -> Result<(DataFrame, DataFrame), FrameError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(FrameError::InvalidFraction(test_fraction));
    }
    let n = frame.n_rows();
    if n == 0 {
        return Err(FrameError::EmptyFrame);
    }
    if n < 2 {
        return Err(FrameError::TooFewRows(n));
    }

    let n_test = ((n as f64 * test_fraction).round() as usize).clamp(1, n - 1);

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_rng(&mut rand::rng()),
    };
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(n_test);
    debug!(rows = n, test_rows = n_test, "split frame into partitions");

    Ok((frame.select_rows(train_idx), frame.select_rows(test_idx)))
}
