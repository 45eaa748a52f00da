//! Integration tests for the stage orchestrator.

use anyhow::bail;
use timeseries_inventory::config::*;
use timeseries_inventory::testing::*;
use timeseries_inventory::{Collaborators, DataBatch, Error, Orchestrator, RunSummary};

#[derive(Default)]
struct Recorder {
    calls: Vec<&'static str>,
    rows: usize,
    fail_at: Option<&'static str>,
}

impl Recorder {
    fn record(&mut self, stage: &'static str) -> anyhow::Result<()> {
        self.calls.push(stage);
        if self.fail_at == Some(stage) {
            bail!("{stage} exploded");
        }
        Ok(())
    }
}

impl Collaborators for Recorder {
    fn clean(&mut self, config: &DataCleaningConfig, batch: DataBatch) -> anyhow::Result<()> {
        assert!(config.operations.drop_duplicates);
        self.rows += batch.into_rows().len();
        self.record("clean")
    }

    fn validate(&mut self, config: &DataValidationConfig) -> anyhow::Result<()> {
        assert!(config.checks.fail_fast);
        self.record("validate")
    }

    fn transform(&mut self, _: &DataTransformationConfig) -> anyhow::Result<()> {
        self.record("transform")
    }

    fn select_features(&mut self, config: &FeatureSelectionConfig) -> anyhow::Result<()> {
        assert_eq!(config.strategy.top_k, 20);
        self.record("select_features")
    }

    fn engineer_features(&mut self, _: &FeatureEngineeringConfig) -> anyhow::Result<()> {
        self.record("engineer_features")
    }

    fn train(&mut self, config: &ModelTrainingConfig) -> anyhow::Result<()> {
        assert_eq!(config.training.target_column, "quantity");
        self.record("train")
    }

    fn evaluate(&mut self, _: &ModelEvaluationConfig) -> anyhow::Result<()> {
        self.record("evaluate")
    }

    fn predict(&mut self, config: &ModelPredictionConfig) -> anyhow::Result<()> {
        assert_eq!(config.batch_size, 500);
        self.record("predict")
    }
}

fn orchestrator(dir: &TempDirPath) -> anyhow::Result<Orchestrator> {
    let doc = ConfigDocument::from_yaml_str(&sample_config_yaml(dir.path()))?;
    Ok(Orchestrator::from_document(&doc)?)
}

#[test]
fn test_run_calls_every_stage_in_order() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("a.csv"), 250)?;
    write_rows_csv(dir.file_path("b.csv"), 40)?;

    let mut recorder = Recorder::default();
    let summary = orchestrator(&dir)?.run(&mut recorder)?;

    assert_eq!(summary, RunSummary { files: 2, batches: 4, rows: 290 });
    assert_eq!(recorder.rows, 290);
    assert_eq!(
        recorder.calls,
        [
            "clean",
            "clean",
            "clean",
            "clean",
            "validate",
            "transform",
            "select_features",
            "engineer_features",
            "train",
            "evaluate",
            "predict",
        ]
    );
    Ok(())
}

#[test]
fn test_default_hooks_are_no_ops() -> anyhow::Result<()> {
    struct Nothing;
    impl Collaborators for Nothing {}

    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("a.csv"), 10)?;
    let summary = orchestrator(&dir)?.run(&mut Nothing)?;
    assert_eq!(summary.rows, 10);
    Ok(())
}

#[test]
fn test_stage_failure_stops_the_run() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("a.csv"), 10)?;

    let mut recorder = Recorder {
        fail_at: Some("train"),
        ..Recorder::default()
    };
    let err = orchestrator(&dir)?.run(&mut recorder).unwrap_err();

    match &err {
        Error::Stage { stage, .. } => assert_eq!(*stage, ModelTrainingConfig::SECTION),
        other => panic!("expected stage error, got {other:?}"),
    }
    assert!(err.to_string().contains("train exploded"));
    assert_eq!(recorder.calls.last(), Some(&"train"));
    assert!(!recorder.calls.contains(&"evaluate"));
    Ok(())
}

#[test]
fn test_cleaning_failure_stops_ingestion() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("a.csv"), 250)?;

    let mut recorder = Recorder {
        fail_at: Some("clean"),
        ..Recorder::default()
    };
    let err = orchestrator(&dir)?.run(&mut recorder).unwrap_err();
    assert!(matches!(err, Error::Stage { stage: "data_cleaning", .. }));
    assert_eq!(recorder.calls, ["clean"]);
    Ok(())
}

#[test]
fn test_ingestion_failure_surfaces_before_later_stages() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    write_rows_csv(dir.file_path("a.csv"), 10)?;

    let mut recorder = Recorder::default();
    let flaky = FlakySource::csv().always_failing();
    let err = orchestrator(&dir)?
        .run_with_source(&flaky, &mut recorder)
        .unwrap_err();

    assert!(matches!(err, Error::IngestionRead { attempts: 3, .. }));
    assert!(recorder.calls.is_empty());
    assert_eq!(flaky.total_opens(), 3);
    Ok(())
}

#[test]
fn test_missing_data_directory() -> anyhow::Result<()> {
    let dir = TempDirPath::new()?;
    let doc = ConfigDocument::from_yaml_str(&sample_config_yaml(&dir.file_path("missing")))?;
    let err = Orchestrator::from_document(&doc)?
        .run(&mut Recorder::default())
        .unwrap_err();
    assert!(err.is_not_found());
    Ok(())
}
