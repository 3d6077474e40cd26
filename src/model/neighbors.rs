//! k-nearest-neighbors regression.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::ModelError;

use super::estimator::{check_fit_shapes, param_usize, unknown_param, Estimator, ParamMap};

/// Predicts the mean target of the k nearest training rows by Euclidean
/// distance.
#[derive(Debug, Clone)]
pub struct KnnRegressor {
    n_neighbors: usize,
    train_x: Option<Array2<f64>>,
    train_y: Option<Array1<f64>>,
}

impl KnnRegressor {
    pub fn new() -> Self {
        Self {
            n_neighbors: 5,
            train_x: None,
            train_y: None,
        }
    }
}

impl Default for KnnRegressor {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for KnnRegressor {
    fn name(&self) -> &'static str {
        "KnnRegressor"
    }

    fn set_params(&mut self, params: &ParamMap) -> Result<(), ModelError> {
        for (name, value) in params {
            match name.as_str() {
                "n_neighbors" => {
                    let k = param_usize(name, value)?;
                    if k == 0 {
                        return Err(ModelError::InvalidParam {
                            name: name.clone(),
                            message: "n_neighbors must be at least 1".to_string(),
                        });
                    }
                    self.n_neighbors = k;
                }
                _ => return Err(unknown_param(self.name(), name)),
            }
        }
        Ok(())
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<(), ModelError> {
        let rows = check_fit_shapes(x, y)?;
        if self.n_neighbors > rows {
            return Err(ModelError::InvalidParam {
                name: "n_neighbors".to_string(),
                message: format!("{} neighbors requested but only {rows} rows", self.n_neighbors),
            });
        }
        self.train_x = Some(x.to_owned());
        self.train_y = Some(y.to_owned());
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let (train_x, train_y) = match (&self.train_x, &self.train_y) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(ModelError::NotFitted(self.name())),
        };

        let preds = x
            .rows()
            .into_iter()
            .map(|query| {
                let mut distances: Vec<(f64, f64)> = train_x
                    .rows()
                    .into_iter()
                    .zip(train_y.iter())
                    .map(|(row, &target)| {
                        let d2 = row
                            .iter()
                            .zip(query.iter())
                            .map(|(a, b)| (a - b) * (a - b))
                            .sum::<f64>();
                        (d2, target)
                    })
                    .collect();
                distances.sort_by(|a, b| a.0.total_cmp(&b.0));
                distances
                    .iter()
                    .take(self.n_neighbors)
                    .map(|(_, target)| target)
                    .sum::<f64>()
                    / self.n_neighbors as f64
            })
            .collect();
        Ok(preds)
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            n_neighbors: self.n_neighbors,
            train_x: None,
            train_y: None,
        })
    }
}
