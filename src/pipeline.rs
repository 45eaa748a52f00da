//! Stage orchestration.
//!
//! The [`Orchestrator`] owns one resolved [`StageConfigs`] and drives a run: it streams the
//! ingestion batches into the cleaning stage, then calls every later stage once, in pipeline
//! order, each with its own configuration record. What a stage actually does is up to the
//! [`Collaborators`] implementation; every hook defaults to a no-op.

use crate::config::{
    ConfigDocument, DataCleaningConfig, DataTransformationConfig, DataValidationConfig,
    FeatureEngineeringConfig, FeatureSelectionConfig, ModelEvaluationConfig,
    ModelPredictionConfig, ModelTrainingConfig, StageConfig, StageConfigs,
};
use crate::error::{Error, Result};
use crate::ingestion::{DataBatch, IngestionReader, RowSource};
use crate::io::csv::CsvSource;

/// Downstream stage implementations.
///
/// Each hook receives exactly the configuration record of its stage. Returning an error stops
/// the run; the orchestrator reports it as [`Error::Stage`].
#[allow(unused_variables)]
pub trait Collaborators {
    /// Called once per ingested batch, in stream order.
    fn clean(&mut self, config: &DataCleaningConfig, batch: DataBatch) -> anyhow::Result<()> {
        Ok(())
    }

    fn validate(&mut self, config: &DataValidationConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn transform(&mut self, config: &DataTransformationConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn select_features(&mut self, config: &FeatureSelectionConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn engineer_features(&mut self, config: &FeatureEngineeringConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn train(&mut self, config: &ModelTrainingConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn evaluate(&mut self, config: &ModelEvaluationConfig) -> anyhow::Result<()> {
        Ok(())
    }

    fn predict(&mut self, config: &ModelPredictionConfig) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Counters for one completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Files matched for ingestion.
    pub files: usize,
    /// Batches handed to the cleaning stage.
    pub batches: usize,
    /// Rows across those batches.
    pub rows: u64,
}

/// Runs the nine stages over one configuration.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    configs: StageConfigs,
}

impl Orchestrator {
    #[must_use]
    pub fn new(configs: StageConfigs) -> Self {
        Self { configs }
    }

    /// Resolve every stage from `doc`.
    ///
    /// # Errors
    /// The first schema violation found.
    pub fn from_document(doc: &ConfigDocument) -> Result<Self> {
        Ok(Self::new(StageConfigs::resolve_all(doc)?))
    }

    #[must_use]
    pub fn configs(&self) -> &StageConfigs {
        &self.configs
    }

    /// Run the pipeline, reading source files as CSV.
    ///
    /// # Errors
    /// Ingestion errors as produced by [`IngestionReader`], or [`Error::Stage`] for the first
    /// collaborator that fails.
    pub fn run<C: Collaborators + ?Sized>(&self, collaborators: &mut C) -> Result<RunSummary> {
        let source = CsvSource::from_input(&self.configs.ingestion.input);
        self.run_with_source(source, collaborators)
    }

    /// Run the pipeline, reading source files through `source`.
    ///
    /// # Errors
    /// See [`Orchestrator::run`].
    pub fn run_with_source<S, C>(&self, source: S, collaborators: &mut C) -> Result<RunSummary>
    where
        S: RowSource,
        C: Collaborators + ?Sized,
    {
        let c = &self.configs;
        let reader = IngestionReader::with_source(&c.ingestion, source)?;
        let mut summary = RunSummary {
            files: reader.files().len(),
            ..RunSummary::default()
        };

        for batch in reader.stream() {
            let batch = batch?;
            summary.batches += 1;
            summary.rows += batch.len() as u64;
            collaborators
                .clean(&c.cleaning, batch)
                .map_err(stage_error(DataCleaningConfig::SECTION))?;
        }
        tracing::info!(
            files = summary.files,
            batches = summary.batches,
            rows = summary.rows,
            "Ingestion and cleaning complete"
        );

        collaborators
            .validate(&c.validation)
            .map_err(stage_error(DataValidationConfig::SECTION))?;
        collaborators
            .transform(&c.transformation)
            .map_err(stage_error(DataTransformationConfig::SECTION))?;
        collaborators
            .select_features(&c.feature_selection)
            .map_err(stage_error(FeatureSelectionConfig::SECTION))?;
        collaborators
            .engineer_features(&c.feature_engineering)
            .map_err(stage_error(FeatureEngineeringConfig::SECTION))?;
        collaborators
            .train(&c.training)
            .map_err(stage_error(ModelTrainingConfig::SECTION))?;
        collaborators
            .evaluate(&c.evaluation)
            .map_err(stage_error(ModelEvaluationConfig::SECTION))?;
        collaborators
            .predict(&c.prediction)
            .map_err(stage_error(ModelPredictionConfig::SECTION))?;

        tracing::info!("Pipeline run complete");
        Ok(summary)
    }
}

fn stage_error(stage: &'static str) -> impl FnOnce(anyhow::Error) -> Error {
    move |e| {
        tracing::error!(stage, error = %format!("{e:#}"), "Stage failed");
        Error::Stage {
            stage,
            source: e.into(),
        }
    }
}
