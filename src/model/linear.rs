//! Linear models fitted by normal equations.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::error::ModelError;

use super::estimator::{
    check_fit_shapes, param_bool, param_f64, unknown_param, Estimator, ParamMap,
};

/// Ordinary least squares regression.
#[derive(Debug, Clone)]
pub struct LinearRegression {
    fit_intercept: bool,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self {
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl Default for LinearRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for LinearRegression {
    fn name(&self) -> &'static str {
        "LinearRegression"
    }

    fn set_params(&mut self, params: &ParamMap) -> Result<(), ModelError> {
        for (name, value) in params {
            match name.as_str() {
                "fit_intercept" => self.fit_intercept = param_bool(name, value)?,
                _ => return Err(unknown_param(self.name(), name)),
            }
        }
        Ok(())
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<(), ModelError> {
        let (coefficients, intercept) = solve_least_squares(x, y, self.fit_intercept, 0.0)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(ModelError::NotFitted(self.name()))?;
        Ok(x.dot(coefficients) + self.intercept)
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            fit_intercept: self.fit_intercept,
            coefficients: None,
            intercept: 0.0,
        })
    }
}

/// Least squares with L2 regularization on the feature weights.
#[derive(Debug, Clone)]
pub struct RidgeRegression {
    alpha: f64,
    fit_intercept: bool,
    coefficients: Option<Array1<f64>>,
    intercept: f64,
}

impl RidgeRegression {
    pub fn new() -> Self {
        Self {
            alpha: 1.0,
            fit_intercept: true,
            coefficients: None,
            intercept: 0.0,
        }
    }
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl Estimator for RidgeRegression {
    fn name(&self) -> &'static str {
        "RidgeRegression"
    }

    fn set_params(&mut self, params: &ParamMap) -> Result<(), ModelError> {
        for (name, value) in params {
            match name.as_str() {
                "alpha" => {
                    let alpha = param_f64(name, value)?;
                    if alpha < 0.0 {
                        return Err(ModelError::InvalidParam {
                            name: name.clone(),
                            message: "alpha must be non-negative".to_string(),
                        });
                    }
                    self.alpha = alpha;
                }
                "fit_intercept" => self.fit_intercept = param_bool(name, value)?,
                _ => return Err(unknown_param(self.name(), name)),
            }
        }
        Ok(())
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: ArrayView1<'_, f64>) -> Result<(), ModelError> {
        let (coefficients, intercept) = solve_least_squares(x, y, self.fit_intercept, self.alpha)?;
        self.coefficients = Some(coefficients);
        self.intercept = intercept;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(ModelError::NotFitted(self.name()))?;
        Ok(x.dot(coefficients) + self.intercept)
    }

    fn clone_unfitted(&self) -> Box<dyn Estimator> {
        Box::new(Self {
            alpha: self.alpha,
            fit_intercept: self.fit_intercept,
            coefficients: None,
            intercept: 0.0,
        })
    }
}

/// Solves the (optionally ridge-regularized) normal equations. The intercept
/// column is never penalized. Returns feature weights and intercept.
fn solve_least_squares(
    x: ArrayView2<'_, f64>,
    y: ArrayView1<'_, f64>,
    fit_intercept: bool,
    alpha: f64,
) -> Result<(Array1<f64>, f64), ModelError> {
    check_fit_shapes(x, y)?;

    let n = x.nrows();
    let p = x.ncols() + usize::from(fit_intercept);

    let mut design = Array2::zeros((n, p));
    design.slice_mut(ndarray::s![.., ..x.ncols()]).assign(&x);
    if fit_intercept {
        design.column_mut(p - 1).fill(1.0);
    }

    let mut gram = design.t().dot(&design);
    for j in 0..x.ncols() {
        gram[[j, j]] += alpha;
    }
    let rhs = design.t().dot(&y);

    let solution = solve_symmetric(gram, rhs)?;
    let intercept = if fit_intercept { solution[p - 1] } else { 0.0 };
    let coefficients = solution.slice(ndarray::s![..x.ncols()]).to_owned();
    Ok((coefficients, intercept))
}

/// Gaussian elimination with partial pivoting.
fn solve_symmetric(mut a: Array2<f64>, mut b: Array1<f64>) -> Result<Array1<f64>, ModelError> {
    let n = b.len();

    for col in 0..n {
        let pivot_row = (col..n)
            .max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))
            .expect("non-empty pivot range");
        if a[[pivot_row, col]].abs() < 1e-12 {
            return Err(ModelError::SingularSystem);
        }
        if pivot_row != col {
            for k in 0..n {
                a.swap([pivot_row, k], [col, k]);
            }
            b.swap(pivot_row, col);
        }

        for row in (col + 1)..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut solution = Array1::zeros(n);
    for row in (0..n).rev() {
        let mut acc = b[row];
        for k in (row + 1)..n {
            acc -= a[[row, k]] * solution[k];
        }
        solution[row] = acc / a[[row, row]];
    }
    Ok(solution)
}
