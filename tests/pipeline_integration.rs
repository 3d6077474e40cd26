//! Integration test for the full training pipeline scaffold.
//!
//! Seeds a JSON-file document store, runs ingestion end to end, tunes two
//! models against the written partitions, and packages the artifact folder.

use std::fs;

use freight_forge::dataset::DataFrame;
use freight_forge::ingestion::{DataIngestion, DataIngestionArtifacts, DataIngestionConfig};
use freight_forge::model::{
    best_of, tune_model, Estimator, GridSearch, ModelConfig, ModelRegistry, ParamGrid,
};
use freight_forge::persist::{load_object, save_object, unzip, zip_dir};
use freight_forge::source::JsonFileStore;

fn seed_store(root: &std::path::Path, n: usize) -> anyhow::Result<()> {
    let db_dir = root.join("freight");
    fs::create_dir_all(&db_dir)?;

    // cost = 3 * weight + 5 * distance + 10, exactly.
    let docs: Vec<serde_json::Value> = (0..n)
        .map(|i| {
            let weight = (i % 7) as f64 + 1.0;
            let distance = (i % 11) as f64 * 2.0;
            serde_json::json!({
                "_id": i,
                "weight": weight,
                "distance": distance,
                "cost": 3.0 * weight + 5.0 * distance + 10.0,
            })
        })
        .collect();

    fs::write(db_dir.join("shipments.json"), serde_json::to_string(&docs)?)?;
    Ok(())
}

fn model_config() -> ModelConfig {
    let mut train_model = std::collections::BTreeMap::new();
    train_model.insert(
        "RidgeRegression".to_string(),
        ParamGrid::from([(
            "alpha".to_string(),
            vec![serde_yaml::Value::from(0.0), serde_yaml::Value::from(10.0)],
        )]),
    );
    train_model.insert(
        "KnnRegressor".to_string(),
        ParamGrid::from([(
            "n_neighbors".to_string(),
            vec![serde_yaml::Value::from(2u64), serde_yaml::Value::from(4u64)],
        )]),
    );
    ModelConfig {
        base_model_score: None,
        train_model,
    }
}

#[test]
fn ingest_tune_and_package_end_to_end() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    seed_store(dir.path(), 40)?;

    // Ingest: fetch, clean, split, write partitions.
    let ingestion_config = DataIngestionConfig {
        artifacts_dir: dir.path().join("artifacts/data_ingestion"),
        split_seed: Some(17),
        ..Default::default()
    };
    let store = JsonFileStore::new(dir.path());
    let ingestion = DataIngestion::new(ingestion_config, store)?;
    let artifacts = ingestion.run()?;

    assert_eq!(artifacts.train_rows + artifacts.test_rows, 40);
    assert_eq!(artifacts.test_rows, 8);

    // The written partitions carry features only, no _id.
    let train = DataFrame::read_csv(&artifacts.train_file_path)?;
    let test = DataFrame::read_csv(&artifacts.test_file_path)?;
    assert_eq!(train.columns(), ["cost", "distance", "weight"]);

    let features = ["weight", "distance"];
    let train_x = train.to_matrix(&features)?;
    let train_y = train.column_vector("cost")?;
    let test_x = test.to_matrix(&features)?;
    let test_y = test.column_vector("cost")?;

    // Tune two candidate models and reduce to the best one.
    let registry = ModelRegistry::builtin();
    let search = GridSearch { cv: 2, n_workers: 2 };
    let config = model_config();

    let mut pairs: Vec<(f64, Box<dyn Estimator>)> = Vec::new();
    for name in ["RidgeRegression", "KnnRegressor"] {
        let tuned = tune_model(
            &registry,
            &search,
            &config,
            name,
            train_x.view(),
            train_y.view(),
            test_x.view(),
            test_y.view(),
        )?;
        pairs.push((tuned.score, tuned.model));
    }
    let (best_model, best_score) = best_of(pairs)?;

    // The relation is exactly linear, so ridge with alpha 0 wins outright.
    assert_eq!(best_model.name(), "RidgeRegression");
    assert!(best_score > 0.999);

    // Persist the best score into the model-config document.
    let config_path = dir.path().join("model.yaml");
    config.save(&config_path)?;
    ModelConfig::update_best_score(&config_path, best_score)?;
    let reloaded = ModelConfig::load(&config_path)?;
    assert_eq!(reloaded.base_model_score, Some(best_score));

    // The artifact descriptor round-trips like any other object.
    let descriptor_path = dir.path().join("artifacts/ingestion.json");
    save_object(&descriptor_path, &artifacts)?;
    let restored: DataIngestionArtifacts = load_object(&descriptor_path)?;
    assert_eq!(restored.run_id, artifacts.run_id);
    assert_eq!(restored.train_checksum, artifacts.train_checksum);

    // Package the artifact folder and verify the archive round-trips.
    let archive = dir.path().join("artifacts.zip");
    zip_dir(&archive, &dir.path().join("artifacts"))?;

    let extracted = dir.path().join("extracted");
    unzip(&archive, &extracted)?;
    assert_eq!(
        fs::read(extracted.join("data_ingestion/train/train.csv"))?,
        fs::read(&artifacts.train_file_path)?
    );

    Ok(())
}

#[test]
fn ingestion_surfaces_missing_collections() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    seed_store(dir.path(), 10)?;

    let config = DataIngestionConfig {
        collection_name: "refunds".to_string(),
        artifacts_dir: dir.path().join("artifacts"),
        ..Default::default()
    };
    let ingestion = DataIngestion::new(config, JsonFileStore::new(dir.path()))?;
    assert!(ingestion.run().is_err());
    Ok(())
}
