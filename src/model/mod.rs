//! Model catalog, selection, tuning and scoring.

pub mod boosted;
pub mod estimator;
pub mod linear;
pub mod neighbors;
pub mod registry;
pub mod scoring;
pub mod tuning;

pub use boosted::GbtRegressor;
pub use estimator::{Estimator, ParamMap};
pub use linear::{LinearRegression, RidgeRegression};
pub use neighbors::KnnRegressor;
pub use registry::{ModelRegistry, BOOSTED_PREFIX};
pub use scoring::r2_score;
pub use tuning::{
    best_of, expand_grid, tune_model, GridSearch, GridSearchOutcome, ModelConfig, ParamGrid,
    TunedModel,
};
