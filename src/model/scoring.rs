//! Regression scoring.

use ndarray::ArrayView1;

use crate::error::ModelError;

/// Coefficient of determination (R²).
///
/// Returns an error when truth and predictions differ in length or are
/// empty. A constant target scores 1.0 for a perfect fit and 0.0 otherwise,
/// matching the reference behavior of the usual metric libraries.
pub fn r2_score(
    truth: ArrayView1<'_, f64>,
    preds: ArrayView1<'_, f64>,
) -> Result<f64, ModelError> {
    if truth.len() != preds.len() {
        return Err(ModelError::ShapeMismatch {
            left: truth.len(),
            right: preds.len(),
        });
    }
    if truth.is_empty() {
        return Err(ModelError::EmptyTrainingSet);
    }

    let mean = truth.mean().expect("non-empty array has a mean");
    let ss_res: f64 = truth
        .iter()
        .zip(preds.iter())
        .map(|(t, p)| (t - p) * (t - p))
        .sum();
    let ss_tot: f64 = truth.iter().map(|t| (t - mean) * (t - mean)).sum();

    if ss_tot == 0.0 {
        return Ok(if ss_res == 0.0 { 1.0 } else { 0.0 });
    }
    Ok(1.0 - ss_res / ss_tot)
}
