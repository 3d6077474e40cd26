//! Name-to-factory model registry.
//!
//! The catalog is an explicit table built at startup; lookups are
//! case-insensitive and unknown names fail closed. Names carrying the
//! boosted-family prefix are resolved against the boosted-tree table first,
//! mirroring how the pipeline treats that family as its own library.

use tracing::debug;

use crate::error::ModelError;

use super::boosted::GbtRegressor;
use super::estimator::Estimator;
use super::linear::{LinearRegression, RidgeRegression};
use super::neighbors::KnnRegressor;

/// Prefix that routes a lookup through the boosted-tree table.
pub const BOOSTED_PREFIX: &str = "gbt";

type Factory = fn() -> Box<dyn Estimator>;

/// Registry of instantiable models.
pub struct ModelRegistry {
    general: Vec<(&'static str, Factory)>,
    boosted: Vec<(&'static str, Factory)>,
}

impl ModelRegistry {
    /// Builds the registry of built-in models.
    pub fn builtin() -> Self {
        Self {
            general: vec![
                ("LinearRegression", || Box::new(LinearRegression::new())),
                ("RidgeRegression", || Box::new(RidgeRegression::new())),
                ("KnnRegressor", || Box::new(KnnRegressor::new())),
            ],
            boosted: vec![("GbtRegressor", || Box::new(GbtRegressor::new()))],
        }
    }

    /// All registered model names, boosted family included.
    pub fn names(&self) -> Vec<&'static str> {
        self.general
            .iter()
            .chain(&self.boosted)
            .map(|(name, _)| *name)
            .collect()
    }

    /// Instantiates a base model by name (case-insensitive).
    pub fn create(&self, name: &str) -> Result<Box<dyn Estimator>, ModelError> {
        let lower = name.to_lowercase();
        let table = if lower.starts_with(BOOSTED_PREFIX) {
            debug!(model = name, "resolving through the boosted-tree table");
            &self.boosted
        } else {
            &self.general
        };

        table
            .iter()
            .find(|(candidate, _)| candidate.to_lowercase() == lower)
            .map(|(_, factory)| factory())
            .ok_or_else(|| ModelError::UnknownModel(name.to_string()))
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_boosted_names_through_the_prefix_path() {
        let registry = ModelRegistry::builtin();
        let model = registry.create("GbtRegressor").unwrap();
        assert_eq!(model.name(), "GbtRegressor");
    }

    #[test]
    fn lookup_is_case_insensitive() {
        let registry = ModelRegistry::builtin();
        assert_eq!(
            registry.create("linearregression").unwrap().name(),
            "LinearRegression"
        );
        assert_eq!(registry.create("GBTREGRESSOR").unwrap().name(), "GbtRegressor");
    }

    #[test]
    fn unknown_names_fail_closed() {
        let registry = ModelRegistry::builtin();
        let err = registry.create("unknown_model_zzz").unwrap_err();
        assert!(matches!(err, ModelError::UnknownModel(name) if name == "unknown_model_zzz"));
    }

    #[test]
    fn boosted_prefix_does_not_leak_into_the_general_table() {
        let registry = ModelRegistry::builtin();
        // A gbt-prefixed name that is not in the boosted table must not fall
        // back to the general catalog.
        assert!(registry.create("GbtLinear").is_err());
    }

    #[test]
    fn names_lists_every_factory() {
        let names = ModelRegistry::builtin().names();
        assert!(names.contains(&"LinearRegression"));
        assert!(names.contains(&"GbtRegressor"));
        assert_eq!(names.len(), 4);
    }
}
