//! Estimator abstraction shared by the model catalog.

use std::collections::BTreeMap;

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::ModelError;

/// Hyperparameter assignment, as parsed from the model-config document.
pub type ParamMap = BTreeMap<String, serde_yaml::Value>;

/// A trainable regression model.
///
/// Implementations are plain Rust over `ndarray`; `clone_unfitted` hands the
/// grid search a fresh copy per fold without sharing fitted state.
pub trait Estimator: Send + Sync + std::fmt::Debug {
    /// Catalog name of the model.
    fn name(&self) -> &'static str;

    /// Applies a hyperparameter assignment. Unknown names or ill-typed
    /// values fail closed.
    fn set_params(&mut self, params: &ParamMap) -> Result<(), ModelError>;

    /// Fits the model on a feature matrix and target vector.
    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<(), ModelError>;

    /// Predicts targets for a feature matrix.
    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError>;

    /// Returns an unfitted copy carrying the same hyperparameters.
    fn clone_unfitted(&self) -> Box<dyn Estimator>;
}

/// Checks the usual fit preconditions and returns the row count.
pub(crate) fn check_fit_shapes(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
) -> Result<usize, ModelError> {
    if x.nrows() != y.len() {
        return Err(ModelError::ShapeMismatch {
            left: x.nrows(),
            right: y.len(),
        });
    }
    if x.nrows() == 0 {
        return Err(ModelError::EmptyTrainingSet);
    }
    Ok(x.nrows())
}

pub(crate) fn param_f64(name: &str, value: &serde_yaml::Value) -> Result<f64, ModelError> {
    value.as_f64().ok_or_else(|| ModelError::InvalidParam {
        name: name.to_string(),
        message: format!("expected a number, got {value:?}"),
    })
}

pub(crate) fn param_usize(name: &str, value: &serde_yaml::Value) -> Result<usize, ModelError> {
    value
        .as_u64()
        .map(|v| v as usize)
        .ok_or_else(|| ModelError::InvalidParam {
            name: name.to_string(),
            message: format!("expected a non-negative integer, got {value:?}"),
        })
}

pub(crate) fn param_bool(name: &str, value: &serde_yaml::Value) -> Result<bool, ModelError> {
    value.as_bool().ok_or_else(|| ModelError::InvalidParam {
        name: name.to_string(),
        message: format!("expected a boolean, got {value:?}"),
    })
}

pub(crate) fn unknown_param(model: &str, name: &str) -> ModelError {
    ModelError::InvalidParam {
        name: name.to_string(),
        message: format!("not a parameter of {model}"),
    }
}
