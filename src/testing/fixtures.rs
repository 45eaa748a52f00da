//! Pre-built configuration fixtures.

use crate::config::{DataIngestionConfig, InputConfig, RetryPolicy};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

fn quoted(path: &Path) -> String {
    format!("'{}'", path.display().to_string().replace('\'', "''"))
}

/// A complete nine-stage configuration document whose ingestion section reads `*.csv` from
/// `data_dir` (chunks of 100 rows, 3 attempts, no delay).
///
/// # Example
///
/// ```
/// use timeseries_inventory::config::{ConfigDocument, StageConfigs};
/// use timeseries_inventory::testing::sample_config_yaml;
///
/// let doc = ConfigDocument::from_yaml_str(&sample_config_yaml("data/raw".as_ref())).unwrap();
/// let stages = StageConfigs::resolve_all(&doc).unwrap();
/// assert_eq!(stages.ingestion.input.chunksize, 100);
/// ```
#[must_use]
pub fn sample_config_yaml(data_dir: &Path) -> String {
    format!(
        r"data_ingestion:
  stage: ingestion
  input:
    source: local
    path: {data}
    file_pattern: '*.csv'
    max_files: 10
    chunksize: 100
  retry:
    attempts: 3
    delay_seconds: 0
data_cleaning:
  stage: cleaning
  operations:
    drop_duplicates: true
    fill_columns: [quantity, price]
data_validation:
  stage: validation
  checks:
    allow_nulls: false
    fail_fast: true
    column_ranges:
      quantity: {{min: 0, max: 100000}}
      price: {{min: 0.0, max: 9999.99}}
data_transformation:
  stage: transformation
  transformations:
    scaling: standard
    encode_categoricals: true
  output:
    directory: data/processed
feature_selection:
  stage: feature_selection
  strategy:
    method: mutual_info
    top_k: 20
    random_state: 42
feature_engineering:
  stage: feature_engineering
  operations:
    generate_polynomials: false
    interaction_terms: true
    lag_features:
      enabled: true
      lags: [1, 7, 28]
      target_column: quantity
model_training:
  stage: training
  model:
    type: [random_forest, gradient_boosting]
    hyperparameters:
      n_estimators: 200
      max_depth: 8
      learning_rate: 0.05
  training:
    target_column: quantity
    test_size: 0.2
    random_state: 42
model_evaluation:
  stage: evaluation
  evaluation:
    metric: rmse
    cross_validation: true
    n_splits: 5
model_prediction:
  stage: prediction
  paths:
    model: models/latest.bin
    input_data: data/processed/features.csv
    output_predictions: data/predictions/forecast.csv
  settings:
    batch_size: 500
",
        data = quoted(data_dir)
    )
}

/// Write `yaml` to `config.yaml` inside `dir` and return its path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_config(dir: &Path, yaml: &str) -> Result<PathBuf> {
    let path = dir.join("config.yaml");
    std::fs::write(&path, yaml).with_context(|| format!("write {}", path.display()))?;
    Ok(path)
}

/// An ingestion record reading `pattern` from `data_dir` with no retry delay.
#[must_use]
pub fn ingestion_config(
    data_dir: &Path,
    pattern: &str,
    max_files: usize,
    chunksize: usize,
    attempts: u32,
) -> DataIngestionConfig {
    DataIngestionConfig {
        stage: "ingestion".to_string(),
        input: InputConfig {
            source: "local".to_string(),
            path: data_dir.to_path_buf(),
            file_pattern: pattern.to_string(),
            max_files,
            chunksize,
            has_headers: None,
            delimiter: None,
        },
        retry: RetryPolicy::new(attempts, 0.0),
    }
}
