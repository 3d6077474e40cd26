//! Hyperparameter search and model selection.
//!
//! The model-config YAML document declares one candidate grid per model
//! name plus the best score seen so far. `GridSearch` exhaustively
//! cross-validates every combination; `tune_model` glues registry, search
//! and scoring together into the one call training code uses.

use std::collections::BTreeMap;
use std::path::Path;
use std::thread;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ModelError, PersistError};
use crate::persist::yaml::{read_yaml, write_yaml};

use super::estimator::{Estimator, ParamMap};
use super::registry::ModelRegistry;
use super::scoring::r2_score;

/// Candidate values per hyperparameter name.
pub type ParamGrid = BTreeMap<String, Vec<serde_yaml::Value>>;

/// The persisted model-config document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Best score seen across training runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_model_score: Option<f64>,
    /// Hyperparameter grid per model name.
    pub train_model: BTreeMap<String, ParamGrid>,
}

impl ModelConfig {
    /// Reads the document from a YAML file.
    pub fn load(path: &Path) -> Result<Self, PersistError> {
        read_yaml(path)
    }

    /// Writes the document to a YAML file, overwriting it.
    pub fn save(&self, path: &Path) -> Result<(), PersistError> {
        write_yaml(self, path)
    }

    /// The grid declared for a model name.
    pub fn grid_for(&self, model_name: &str) -> Result<&ParamGrid, ModelError> {
        self.train_model
            .get(model_name)
            .ok_or_else(|| ModelError::NoParamGrid(model_name.to_string()))
    }

    /// Persists a new best score into the document at `path`, keeping the
    /// declared grids intact.
    pub fn update_best_score(path: &Path, score: f64) -> Result<(), PersistError> {
        let mut config = Self::load(path)?;
        config.base_model_score = Some(score);
        config.save(path)?;
        info!(score, path = %path.display(), "updated best model score");
        Ok(())
    }
}

/// Expands a grid into every parameter combination (cartesian product).
pub fn expand_grid(grid: &ParamGrid) -> Vec<ParamMap> {
    let mut combos = vec![ParamMap::new()];
    for (name, values) in grid {
        let mut next = Vec::with_capacity(combos.len() * values.len());
        for combo in &combos {
            for value in values {
                let mut expanded = combo.clone();
                expanded.insert(name.clone(), value.clone());
                next.push(expanded);
            }
        }
        combos = next;
    }
    combos
}

/// Exhaustive cross-validated hyperparameter search.
#[derive(Debug, Clone)]
pub struct GridSearch {
    /// Number of cross-validation folds.
    pub cv: usize,
    /// Worker threads used to evaluate combinations.
    pub n_workers: usize,
}

impl Default for GridSearch {
    fn default() -> Self {
        Self { cv: 2, n_workers: 1 }
    }
}

/// Winning combination of one search.
#[derive(Debug, Clone)]
pub struct GridSearchOutcome {
    pub best_params: ParamMap,
    pub best_score: f64,
}

impl GridSearch {
    /// Searches the grid for the combination with the highest mean R²
    /// across folds. Combinations are evaluated on up to `n_workers`
    /// scoped threads; ties keep the earliest combination.
    pub fn search(
        &self,
        proto: &dyn Estimator,
        grid: &ParamGrid,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> Result<GridSearchOutcome, ModelError> {
        let rows = x.nrows();
        if self.cv < 2 || rows < self.cv {
            return Err(ModelError::TooFewRows { cv: self.cv, rows });
        }

        let combos = expand_grid(grid);
        if combos.is_empty() {
            return Err(ModelError::NoParamGrid(proto.name().to_string()));
        }
        debug!(
            model = proto.name(),
            combinations = combos.len(),
            cv = self.cv,
            "starting grid search"
        );

        let workers = self.n_workers.clamp(1, combos.len());
        let scored: Vec<(usize, f64)> = if workers == 1 {
            let mut scored = Vec::with_capacity(combos.len());
            for (i, combo) in combos.iter().enumerate() {
                scored.push((i, self.cross_val_score(proto, combo, x, y)?));
            }
            scored
        } else {
            let chunk_size = combos.len().div_ceil(workers);
            thread::scope(|scope| {
                let handles: Vec<_> = combos
                    .chunks(chunk_size)
                    .enumerate()
                    .map(|(chunk_no, chunk)| {
                        scope.spawn(move || {
                            chunk
                                .iter()
                                .enumerate()
                                .map(|(i, combo)| {
                                    let index = chunk_no * chunk_size + i;
                                    self.cross_val_score(proto, combo, x, y)
                                        .map(|score| (index, score))
                                })
                                .collect::<Result<Vec<_>, _>>()
                        })
                    })
                    .collect();

                handles
                    .into_iter()
                    .map(|handle| handle.join().expect("search worker panicked"))
                    .collect::<Result<Vec<_>, _>>()
                    .map(|chunks| chunks.into_iter().flatten().collect())
            })?
        };

        let &(best_index, best_score) = scored
            .iter()
            .min_by(|(ia, sa), (ib, sb)| sb.total_cmp(sa).then(ia.cmp(ib)))
            .expect("at least one combination was scored");

        info!(
            model = proto.name(),
            best_score,
            params = ?combos[best_index],
            "grid search finished"
        );
        Ok(GridSearchOutcome {
            best_params: combos[best_index].clone(),
            best_score,
        })
    }

    /// Mean R² of one combination across contiguous k folds.
    fn cross_val_score(
        &self,
        proto: &dyn Estimator,
        params: &ParamMap,
        x: ArrayView2<'_, f64>,
        y: ArrayView1<'_, f64>,
    ) -> Result<f64, ModelError> {
        let rows = x.nrows();
        let mut total = 0.0;

        for fold in 0..self.cv {
            let start = fold * rows / self.cv;
            let end = (fold + 1) * rows / self.cv;

            let val_idx: Vec<usize> = (start..end).collect();
            let train_idx: Vec<usize> = (0..rows).filter(|i| !(start..end).contains(i)).collect();

            let train_x: Array2<f64> = x.select(Axis(0), &train_idx);
            let train_y: Array1<f64> = y.select(Axis(0), &train_idx);
            let val_x: Array2<f64> = x.select(Axis(0), &val_idx);
            let val_y: Array1<f64> = y.select(Axis(0), &val_idx);

            let mut model = proto.clone_unfitted();
            model.set_params(params)?;
            model.fit(train_x.view(), train_y.view())?;
            let preds = model.predict(val_x.view())?;
            total += r2_score(val_y.view(), preds.view())?;
        }

        Ok(total / self.cv as f64)
    }
}

/// A tuned, fitted model with its test score.
#[derive(Debug)]
pub struct TunedModel {
    pub score: f64,
    pub model: Box<dyn Estimator>,
    pub model_name: String,
}

/// Resolves a base model by name, grid-searches its hyperparameters on the
/// training split, refits on the full training split, and scores on the
/// test split.
#[allow(clippy::too_many_arguments)]
pub fn tune_model(
    registry: &ModelRegistry,
    search: &GridSearch,
    config: &ModelConfig,
    name: &str,
    train_x: ArrayView2<'_, f64>,
    train_y: ArrayView1<'_, f64>,
    test_x: ArrayView2<'_, f64>,
    test_y: ArrayView1<'_, f64>,
) -> Result<TunedModel, ModelError> {
    let mut model = registry.create(name)?;
    let grid = config.grid_for(model.name())?;

    let outcome = search.search(model.as_ref(), grid, train_x, train_y)?;
    model.set_params(&outcome.best_params)?;
    model.fit(train_x, train_y)?;

    let preds = model.predict(test_x)?;
    let score = r2_score(test_y, preds.view())?;
    info!(model = model.name(), score, "tuned model");

    Ok(TunedModel {
        score,
        model_name: model.name().to_string(),
        model,
    })
}

/// Reduces a list of `(score, model)` pairs to the best-scoring model.
/// Ties keep the earliest entry.
pub fn best_of(
    models: Vec<(f64, Box<dyn Estimator>)>,
) -> Result<(Box<dyn Estimator>, f64), ModelError> {
    let mut best: Option<(f64, Box<dyn Estimator>)> = None;
    for (score, model) in models {
        let replace = match &best {
            Some((current, _)) => score.total_cmp(current).is_gt(),
            None => true,
        };
        if replace {
            best = Some((score, model));
        }
    }
    best.map(|(score, model)| (model, score))
        .ok_or(ModelError::EmptyModelList)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::linear::LinearRegression;
    use ndarray::Array;
    use serde_yaml::Value;

    fn yaml_values(values: &[f64]) -> Vec<Value> {
        values.iter().map(|&v| Value::from(v)).collect()
    }

    fn linear_data(n: usize) -> (Array2<f64>, Array1<f64>) {
        let x = Array::from_shape_fn((n, 1), |(i, _)| i as f64);
        let y = Array::from_shape_fn(n, |i| 2.0 * i as f64 + 1.0);
        (x, y)
    }

    fn ridge_config() -> ModelConfig {
        let mut grids = BTreeMap::new();
        grids.insert(
            "RidgeRegression".to_string(),
            ParamGrid::from([("alpha".to_string(), yaml_values(&[0.0, 1000.0]))]),
        );
        ModelConfig {
            base_model_score: None,
            train_model: grids,
        }
    }

    #[test]
    fn expand_grid_is_the_cartesian_product() {
        let grid = ParamGrid::from([
            ("a".to_string(), yaml_values(&[1.0, 2.0])),
            ("b".to_string(), yaml_values(&[3.0, 4.0, 5.0])),
        ]);
        let combos = expand_grid(&grid);
        assert_eq!(combos.len(), 6);
        assert!(combos.iter().all(|c| c.len() == 2));
    }

    #[test]
    fn empty_grid_yields_the_default_combination() {
        let combos = expand_grid(&ParamGrid::new());
        assert_eq!(combos.len(), 1);
        assert!(combos[0].is_empty());
    }

    #[test]
    fn search_prefers_the_unregularized_fit_on_clean_data() {
        let (x, y) = linear_data(20);
        let config = ridge_config();
        let grid = config.grid_for("RidgeRegression").unwrap();

        let search = GridSearch::default();
        let proto = ModelRegistry::builtin().create("RidgeRegression").unwrap();
        let outcome = search.search(proto.as_ref(), grid, x.view(), y.view()).unwrap();

        assert_eq!(outcome.best_params["alpha"], Value::from(0.0));
        assert!(outcome.best_score > 0.9);
    }

    #[test]
    fn parallel_search_matches_sequential_search() {
        let (x, y) = linear_data(20);
        let config = ridge_config();
        let grid = config.grid_for("RidgeRegression").unwrap();
        let proto = ModelRegistry::builtin().create("RidgeRegression").unwrap();

        let sequential = GridSearch { cv: 2, n_workers: 1 }
            .search(proto.as_ref(), grid, x.view(), y.view())
            .unwrap();
        let parallel = GridSearch { cv: 2, n_workers: 4 }
            .search(proto.as_ref(), grid, x.view(), y.view())
            .unwrap();

        assert_eq!(sequential.best_params, parallel.best_params);
        assert_eq!(sequential.best_score, parallel.best_score);
    }

    #[test]
    fn too_few_rows_for_the_fold_count_is_an_error() {
        let (x, y) = linear_data(3);
        let proto = ModelRegistry::builtin().create("LinearRegression").unwrap();
        let err = GridSearch { cv: 4, n_workers: 1 }
            .search(proto.as_ref(), &ParamGrid::new(), x.view(), y.view())
            .unwrap_err();
        assert!(matches!(err, ModelError::TooFewRows { cv: 4, rows: 3 }));
    }

    #[test]
    fn tune_model_fits_and_scores_on_the_test_split() {
        let (x, y) = linear_data(20);
        let (test_x, test_y) = (
            Array::from_shape_fn((5, 1), |(i, _)| (30 + i) as f64),
            Array::from_shape_fn(5, |i| 2.0 * (30 + i) as f64 + 1.0),
        );

        let mut grids = BTreeMap::new();
        grids.insert(
            "LinearRegression".to_string(),
            ParamGrid::from([(
                "fit_intercept".to_string(),
                vec![Value::Bool(true), Value::Bool(false)],
            )]),
        );
        let config = ModelConfig {
            base_model_score: None,
            train_model: grids,
        };

        let tuned = tune_model(
            &ModelRegistry::builtin(),
            &GridSearch::default(),
            &config,
            "LinearRegression",
            x.view(),
            y.view(),
            test_x.view(),
            test_y.view(),
        )
        .unwrap();

        assert_eq!(tuned.model_name, "LinearRegression");
        assert!(tuned.score > 0.999);
    }

    #[test]
    fn missing_grid_is_an_error() {
        let (x, y) = linear_data(10);
        let err = tune_model(
            &ModelRegistry::builtin(),
            &GridSearch::default(),
            &ridge_config(),
            "KnnRegressor",
            x.view(),
            y.view(),
            x.view(),
            y.view(),
        )
        .unwrap_err();
        assert!(matches!(err, ModelError::NoParamGrid(name) if name == "KnnRegressor"));
    }

    #[test]
    fn best_of_returns_the_highest_scoring_model() {
        let models: Vec<(f64, Box<dyn Estimator>)> = vec![
            (0.7, Box::new(LinearRegression::new())),
            (0.9, Box::new(LinearRegression::new())),
            (0.5, Box::new(LinearRegression::new())),
        ];
        let (_, score) = best_of(models).unwrap();
        assert_eq!(score, 0.9);
    }

    #[test]
    fn best_of_rejects_an_empty_list() {
        assert!(matches!(best_of(Vec::new()), Err(ModelError::EmptyModelList)));
    }

    #[test]
    fn update_best_score_round_trips_through_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.yaml");
        ridge_config().save(&path).unwrap();

        ModelConfig::update_best_score(&path, 0.87).unwrap();

        let reloaded = ModelConfig::load(&path).unwrap();
        assert_eq!(reloaded.base_model_score, Some(0.87));
        assert!(reloaded.train_model.contains_key("RidgeRegression"));
    }
}
