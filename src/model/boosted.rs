//! Gradient-boosted regression stumps.
//!
//! The crate's boosted-tree family: an additive ensemble of depth-1 trees
//! fitted to residuals. Small enough to tune exhaustively, strong enough to
//! pick up the non-linear structure the linear models miss.

use ndarray::{Array1, ArrayView1, ArrayView2};

use crate::error::ModelError;

use super::estimator::{
    check_fit_shapes, param_f64, param_usize, unknown_param, Estimator, ParamMap,
};

/// Single-split regression tree.
#[derive(Debug, Clone)]
struct Stump {
    feature: usize,
    threshold: f64,
    left_value: f64,
    right_value: f64,
}

impl Stump {
    fn predict_row(&self, row: ArrayView1<'_, f64>) -> f64 {
        if row[self.feature] <= self.threshold {
            self.left_value
        } else {
            self.right_value
        }
    }
}

/// Gradient-boosted stump ensemble for regression.
#[derive(Debug, Clone)]
pub struct GbtRegressor {
    n_estimators: usize,
    learning_rate: f64,
    base_prediction: f64,
    stumps: Vec<Stump>,
    fitted: bool,
}

impl GbtRegressor {
    pub fn new() -> Self {
        Self {
            n_estimators: 50,
            learning_rate: 0.1,
            base_prediction: 0.0,
            stumps: Vec::new(),
            fitted: false,
        }
    }
}

impl Default for GbtRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for GbtRegressor {
    fn name(&self) -> &'static str {
        "GbtRegressor"
    }

    fn set_params(&mut self, params: &ParamMap) -> Result<(), ModelError> {
        for (name, value) in params {
            match name.as_str() {
                "n_estimators" => {
                    let n = param_usize(name, value)?;
                    if n == 0 {
                        return Err(ModelError::InvalidParam {
                            name: name.clone(),
                            message: "n_estimators must be at least 1".to_string(),
                        });
                    }
                    self.n_estimators = n;
                }
                "learning_rate" => {
                    let rate = param_f64(name, value)?;
                    if !(rate > 0.0 && rate <= 1.0) {
                        return Err(ModelError::InvalidParam {
                            name: name.clone(),
                            message: "learning_rate must lie in (0, 1]".to_string(),
                        });
                    }
                    self.learning_rate = rate;
                }
                _ => return Err(unknown_param(self.name(), name)),
            }
        }
        Ok(())
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<(), ModelError> {
        check_fit_shapes(x, y)?;

        self.base_prediction = y.mean().unwrap_or(0.0);
        self.stumps.clear();

        let mut residuals = &y.to_owned() - self.base_prediction;
        for _ in 0..self.n_estimators {
            let Some(stump) = best_stump(x, residuals.view()) else {
                break; // residuals are constant, nothing left to split on
            };
            for (i, row) in x.rows().into_iter().enumerate() {
                residuals[i] -= self.learning_rate * stump.predict_row(row);
            }
            self.stumps.push(stump);
        }

        self.fitted = true;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        if !self.fitted {
            return Err(ModelError::NotFitted(self.name()));
        }
        let preds = x
            .rows()
            .into_iter()
            .map(|row| {
                self.base_prediction
                    + self.learning_rate
                        * self
                            .stumps
                            .iter()
                            .map(|stump| stump.predict_row(row))
                            .sum::<f64>()
            })
            .collect();
        Ok(preds)
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            n_estimators: self.n_estimators,
            learning_rate: self.learning_rate,
            base_prediction: 0.0,
            stumps: Vec::new(),
            fitted: false,
        })
    }
}

/// Exhaustively finds the SSE-minimizing single split, trying midpoints of
/// consecutive distinct values per feature. Returns None when no split
/// improves on the constant fit.
fn best_stump(x: ArrayView2<'_, f64>, residuals: ArrayView1<'_, f64>) -> Option<Stump> {
    let mut best: Option<(f64, Stump)> = None;

    for feature in 0..x.ncols() {
        let mut values: Vec<f64> = x.column(feature).to_vec();
        values.sort_by(f64::total_cmp);
        values.dedup();

        for pair in values.windows(2) {
            let threshold = (pair[0] + pair[1]) / 2.0;

            let (mut left_sum, mut left_n) = (0.0, 0usize);
            let (mut right_sum, mut right_n) = (0.0, 0usize);
            for (row, &r) in x.rows().into_iter().zip(residuals.iter()) {
                if row[feature] <= threshold {
                    left_sum += r;
                    left_n += 1;
                } else {
                    right_sum += r;
                    right_n += 1;
                }
            }
            if left_n == 0 || right_n == 0 {
                continue;
            }

            let left_value = left_sum / left_n as f64;
            let right_value = right_sum / right_n as f64;

            let sse: f64 = x
                .rows()
                .into_iter()
                .zip(residuals.iter())
                .map(|(row, &r)| {
                    let fitted = if row[feature] <= threshold {
                        left_value
                    } else {
                        right_value
                    };
                    (r - fitted) * (r - fitted)
                })
                .sum();

            if best.as_ref().map_or(true, |(best_sse, _)| sse < *best_sse) {
                best = Some((
                    sse,
                    Stump {
                        feature,
                        threshold,
                        left_value,
                        right_value,
                    },
                ));
            }
        }
    }

    let baseline: f64 = residuals.iter().map(|r| r * r).sum();
    best.filter(|(sse, _)| *sse < baseline).map(|(_, stump)| stump)
}
