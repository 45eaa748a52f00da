//! Strictly-typed, immutable per-stage configuration records.
//!
//! Each record mirrors one top-level section of the configuration document and is built by
//! walking a fixed set of keys. Resolution is all-or-nothing: a record is either fully
//! populated or the resolver returns the first [`Error::MissingField`],
//! [`Error::TypeMismatch`] or [`Error::InvalidValue`] it meets. Resolvers do not depend on each
//! other and may run in any order.
//!
//! | Record | Section |
//! |---|---|
//! | [`DataIngestionConfig`] | `data_ingestion` |
//! | [`DataCleaningConfig`] | `data_cleaning` |
//! | [`DataValidationConfig`] | `data_validation` |
//! | [`DataTransformationConfig`] | `data_transformation` |
//! | [`FeatureSelectionConfig`] | `feature_selection` |
//! | [`FeatureEngineeringConfig`] | `feature_engineering` |
//! | [`ModelTrainingConfig`] | `model_training` |
//! | [`ModelEvaluationConfig`] | `model_evaluation` |
//! | [`ModelPredictionConfig`] | `model_prediction` |

use crate::config::loader::ConfigDocument;
use crate::config::node::{ConfigPath, Node};
use crate::config::section::Section;
use crate::error::{Error, Result};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// A configuration record for one pipeline stage.
pub trait StageConfig: Sized {
    /// Top-level key the record is read from.
    const SECTION: &'static str;

    /// Build the record from its section.
    ///
    /// # Errors
    /// Schema violations, each naming the offending dotted path.
    fn from_section(section: &Section<'_>) -> Result<Self>;

    /// Rebuild the subtree this record was resolved from. Optional keys that were absent in
    /// the source stay absent.
    fn to_node(&self) -> Node;

    /// Resolve the record from a whole document.
    ///
    /// # Errors
    /// [`Error::MissingField`] if the section itself is absent, otherwise see
    /// [`StageConfig::from_section`].
    fn resolve(doc: &ConfigDocument) -> Result<Self> {
        let section = Section::of(doc).child(Self::SECTION)?;
        let config = Self::from_section(&section)?;
        tracing::debug!(section = Self::SECTION, "Resolved stage configuration");
        Ok(config)
    }
}

fn mapping<const N: usize>(entries: [(&str, Node); N]) -> Node {
    Node::Mapping(
        entries
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    )
}

fn push_opt(node: &mut Node, key: &str, value: Option<Node>) {
    if let (Node::Mapping(entries), Some(v)) = (node, value) {
        entries.push((key.to_string(), v));
    }
}

fn strings_node(values: &[String]) -> Node {
    Node::Sequence(values.iter().map(|s| Node::from(s.as_str())).collect())
}

fn count_node(value: impl Into<i64>) -> Node {
    Node::from(value.into())
}

fn usize_node(value: usize) -> Node {
    Node::from(i64::try_from(value).unwrap_or(i64::MAX))
}

fn u64_node(value: u64) -> Node {
    Node::from(i64::try_from(value).unwrap_or(i64::MAX))
}

fn positive_usize(section: &Section<'_>) -> Result<usize> {
    let v = section.usize()?;
    if v == 0 {
        return Err(Error::invalid(section.path().clone(), "must be at least 1"));
    }
    Ok(v)
}

// ---------------------------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------------------------

fn checked_delay(seconds: f64, path: ConfigPath) -> Result<Duration> {
    Duration::try_from_secs_f64(seconds).map_err(|_| {
        Error::invalid(
            path,
            format!("must be a non-negative number of seconds that fits a duration, got {seconds}"),
        )
    })
}

/// What the ingestion reader does once a file has used up its retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OnExhausted {
    /// Surface the failure and end the whole stream.
    #[default]
    Abort,
    /// Log the failure and continue with the next file.
    Skip,
}

impl OnExhausted {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            OnExhausted::Abort => "abort",
            OnExhausted::Skip => "skip",
        }
    }
}

impl fmt::Display for OnExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Retry budget for reading one source file.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per file, at least 1.
    pub attempts: u32,
    /// Fixed pause between attempts, non-negative.
    pub delay_seconds: f64,
    /// `retry.on_exhausted`; `None` when the key is absent (treated as abort).
    pub on_exhausted: Option<OnExhausted>,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(attempts: u32, delay_seconds: f64) -> Self {
        Self {
            attempts,
            delay_seconds,
            on_exhausted: None,
        }
    }

    /// Pause between attempts. A delay that is not a representable [`Duration`] (negative,
    /// NaN, or too large) reads as zero; resolved and reader-checked policies never hold one.
    #[must_use]
    pub fn delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.delay_seconds).unwrap_or_default()
    }

    fn check(&self, path: &ConfigPath) -> Result<()> {
        if self.attempts == 0 {
            return Err(Error::invalid(path.key("attempts"), "must be at least 1"));
        }
        checked_delay(self.delay_seconds, path.key("delay_seconds"))?;
        Ok(())
    }

    #[must_use]
    pub fn on_exhausted(&self) -> OnExhausted {
        self.on_exhausted.unwrap_or_default()
    }

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let attempts_section = section.child("attempts")?;
        let attempts = attempts_section.u32()?;
        if attempts == 0 {
            return Err(Error::invalid(
                attempts_section.path().clone(),
                "must be at least 1",
            ));
        }
        let delay_section = section.child("delay_seconds")?;
        let delay_seconds = delay_section.f64()?;
        checked_delay(delay_seconds, delay_section.path().clone())?;
        let on_exhausted = match section.optional("on_exhausted")? {
            None => None,
            Some(s) => Some(match s.string()?.as_str() {
                "abort" => OnExhausted::Abort,
                "skip" => OnExhausted::Skip,
                other => {
                    return Err(Error::invalid(
                        s.path().clone(),
                        format!("expected 'abort' or 'skip', got '{other}'"),
                    ));
                }
            }),
        };
        Ok(Self {
            attempts,
            delay_seconds,
            on_exhausted,
        })
    }

    fn to_node(&self) -> Node {
        let mut node = mapping([
            ("attempts", count_node(self.attempts)),
            ("delay_seconds", Node::from(self.delay_seconds)),
        ]);
        push_opt(
            &mut node,
            "on_exhausted",
            self.on_exhausted.map(|p| Node::from(p.as_str())),
        );
        node
    }
}

/// `data_ingestion.input`.
#[derive(Debug, Clone, PartialEq)]
pub struct InputConfig {
    pub source: String,
    /// Directory searched for source files.
    pub path: PathBuf,
    /// Glob pattern matched against entries of `path`.
    pub file_pattern: String,
    pub max_files: usize,
    /// Maximum rows per batch.
    pub chunksize: usize,
    pub has_headers: Option<bool>,
    pub delimiter: Option<u8>,
}

impl InputConfig {
    #[must_use]
    pub fn has_headers(&self) -> bool {
        self.has_headers.unwrap_or(true)
    }

    #[must_use]
    pub fn delimiter(&self) -> u8 {
        self.delimiter.unwrap_or(b',')
    }

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let delimiter = match section.optional("delimiter")? {
            None => None,
            Some(s) => match s.string()?.as_bytes() {
                [b] if b.is_ascii() => Some(*b),
                _ => {
                    return Err(Error::invalid(
                        s.path().clone(),
                        "must be a single ASCII character",
                    ));
                }
            },
        };
        Ok(Self {
            source: section.child("source")?.string()?,
            path: section.child("path")?.path_buf()?,
            file_pattern: section.child("file_pattern")?.string()?,
            max_files: positive_usize(&section.child("max_files")?)?,
            chunksize: positive_usize(&section.child("chunksize")?)?,
            has_headers: section.optional("has_headers")?.map(|s| s.bool()).transpose()?,
            delimiter,
        })
    }

    fn to_node(&self) -> Node {
        let mut node = mapping([
            ("source", Node::from(self.source.as_str())),
            ("path", Node::from(self.path.clone())),
            ("file_pattern", Node::from(self.file_pattern.as_str())),
            ("max_files", usize_node(self.max_files)),
            ("chunksize", usize_node(self.chunksize)),
        ]);
        push_opt(&mut node, "has_headers", self.has_headers.map(Node::from));
        push_opt(
            &mut node,
            "delimiter",
            self.delimiter.map(|b| Node::from((b as char).to_string())),
        );
        node
    }
}

/// `data_ingestion`: where source files live and how they are read.
#[derive(Debug, Clone, PartialEq)]
pub struct DataIngestionConfig {
    pub stage: String,
    pub input: InputConfig,
    pub retry: RetryPolicy,
}

impl DataIngestionConfig {
    /// Re-check the bounds the resolver enforces: `input.max_files`, `input.chunksize` and
    /// `retry.attempts` of at least 1, and a `retry.delay_seconds` that fits a [`Duration`].
    /// Records built by hand rather than resolved go through this before they are read.
    ///
    /// # Errors
    /// [`Error::InvalidValue`] naming the first offending `data_ingestion.*` path.
    pub fn validate(&self) -> Result<()> {
        let root = ConfigPath::root().key(Self::SECTION);
        let input = root.key("input");
        if self.input.max_files == 0 {
            return Err(Error::invalid(input.key("max_files"), "must be at least 1"));
        }
        if self.input.chunksize == 0 {
            return Err(Error::invalid(input.key("chunksize"), "must be at least 1"));
        }
        self.retry.check(&root.key("retry"))
    }
}

impl StageConfig for DataIngestionConfig {
    const SECTION: &'static str = "data_ingestion";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        Ok(Self {
            stage: section.child("stage")?.string()?,
            input: InputConfig::from_section(&section.child("input")?)?,
            retry: RetryPolicy::from_section(&section.child("retry")?)?,
        })
    }

    fn to_node(&self) -> Node {
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            ("input", self.input.to_node()),
            ("retry", self.retry.to_node()),
        ])
    }
}

// ---------------------------------------------------------------------------------------------
// Cleaning / validation / transformation
// ---------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningOperations {
    pub drop_duplicates: bool,
    pub fill_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataCleaningConfig {
    pub stage: String,
    pub operations: CleaningOperations,
}

impl StageConfig for DataCleaningConfig {
    const SECTION: &'static str = "data_cleaning";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let ops = section.child("operations")?;
        Ok(Self {
            stage: section.child("stage")?.string()?,
            operations: CleaningOperations {
                drop_duplicates: ops.child("drop_duplicates")?.bool()?,
                fill_columns: ops.child("fill_columns")?.strings()?,
            },
        })
    }

    fn to_node(&self) -> Node {
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "operations",
                mapping([
                    ("drop_duplicates", Node::from(self.operations.drop_duplicates)),
                    ("fill_columns", strings_node(&self.operations.fill_columns)),
                ]),
            ),
        ])
    }
}

/// Inclusive value range enforced on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRange {
    pub column: String,
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationChecks {
    pub allow_nulls: bool,
    pub fail_fast: bool,
    /// In document order.
    pub column_ranges: Vec<ColumnRange>,
}

impl ValidationChecks {
    /// Range configured for `column`, if any.
    #[must_use]
    pub fn range_for(&self, column: &str) -> Option<&ColumnRange> {
        self.column_ranges.iter().find(|r| r.column == column)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataValidationConfig {
    pub stage: String,
    pub checks: ValidationChecks,
}

impl StageConfig for DataValidationConfig {
    const SECTION: &'static str = "data_validation";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let checks = section.child("checks")?;
        let mut column_ranges = Vec::new();
        for (column, range) in checks.child("column_ranges")?.entries()? {
            let min = range.child("min")?.f64()?;
            let max = range.child("max")?.f64()?;
            if min > max {
                return Err(Error::invalid(
                    range.path().clone(),
                    format!("min ({min}) is greater than max ({max})"),
                ));
            }
            column_ranges.push(ColumnRange {
                column: column.to_string(),
                min,
                max,
            });
        }
        Ok(Self {
            stage: section.child("stage")?.string()?,
            checks: ValidationChecks {
                allow_nulls: checks.child("allow_nulls")?.bool()?,
                fail_fast: checks.child("fail_fast")?.bool()?,
                column_ranges,
            },
        })
    }

    fn to_node(&self) -> Node {
        let ranges = Node::Mapping(
            self.checks
                .column_ranges
                .iter()
                .map(|r| {
                    (
                        r.column.clone(),
                        mapping([("min", Node::from(r.min)), ("max", Node::from(r.max))]),
                    )
                })
                .collect(),
        );
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "checks",
                mapping([
                    ("allow_nulls", Node::from(self.checks.allow_nulls)),
                    ("fail_fast", Node::from(self.checks.fail_fast)),
                    ("column_ranges", ranges),
                ]),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataTransformationConfig {
    pub stage: String,
    /// Free-form transformation settings, handed to the transformation stage as-is.
    pub transformations: Node,
    /// `output.directory`.
    pub output_directory: PathBuf,
}

impl StageConfig for DataTransformationConfig {
    const SECTION: &'static str = "data_transformation";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        Ok(Self {
            stage: section.child("stage")?.string()?,
            transformations: section.child("transformations")?.mapping()?,
            output_directory: section.child("output")?.child("directory")?.path_buf()?,
        })
    }

    fn to_node(&self) -> Node {
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            ("transformations", self.transformations.clone()),
            (
                "output",
                mapping([("directory", Node::from(self.output_directory.clone()))]),
            ),
        ])
    }
}

// ---------------------------------------------------------------------------------------------
// Features
// ---------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SelectionStrategy {
    pub method: String,
    pub top_k: usize,
    pub random_state: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSelectionConfig {
    pub stage: String,
    pub strategy: SelectionStrategy,
}

impl StageConfig for FeatureSelectionConfig {
    const SECTION: &'static str = "feature_selection";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let strategy = section.child("strategy")?;
        Ok(Self {
            stage: section.child("stage")?.string()?,
            strategy: SelectionStrategy {
                method: strategy.child("method")?.string()?,
                top_k: strategy.child("top_k")?.usize()?,
                random_state: strategy.child("random_state")?.u64()?,
            },
        })
    }

    fn to_node(&self) -> Node {
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "strategy",
                mapping([
                    ("method", Node::from(self.strategy.method.as_str())),
                    ("top_k", usize_node(self.strategy.top_k)),
                    ("random_state", u64_node(self.strategy.random_state)),
                ]),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LagFeatures {
    pub enabled: bool,
    pub lags: Vec<u32>,
    pub target_column: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineeringOperations {
    pub generate_polynomials: bool,
    pub interaction_terms: bool,
    pub lag_features: LagFeatures,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEngineeringConfig {
    pub stage: String,
    pub operations: EngineeringOperations,
}

impl StageConfig for FeatureEngineeringConfig {
    const SECTION: &'static str = "feature_engineering";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let ops = section.child("operations")?;
        let lag = ops.child("lag_features")?;
        Ok(Self {
            stage: section.child("stage")?.string()?,
            operations: EngineeringOperations {
                generate_polynomials: ops.child("generate_polynomials")?.bool()?,
                interaction_terms: ops.child("interaction_terms")?.bool()?,
                lag_features: LagFeatures {
                    enabled: lag.child("enabled")?.bool()?,
                    lags: lag.child("lags")?.u32s()?,
                    target_column: lag.child("target_column")?.string()?,
                },
            },
        })
    }

    fn to_node(&self) -> Node {
        let lag = &self.operations.lag_features;
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "operations",
                mapping([
                    (
                        "generate_polynomials",
                        Node::from(self.operations.generate_polynomials),
                    ),
                    ("interaction_terms", Node::from(self.operations.interaction_terms)),
                    (
                        "lag_features",
                        mapping([
                            ("enabled", Node::from(lag.enabled)),
                            (
                                "lags",
                                Node::Sequence(lag.lags.iter().map(|&l| count_node(l)).collect()),
                            ),
                            ("target_column", Node::from(lag.target_column.as_str())),
                        ]),
                    ),
                ]),
            ),
        ])
    }
}

// ---------------------------------------------------------------------------------------------
// Models
// ---------------------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Hyperparameters {
    pub n_estimators: u32,
    pub max_depth: u32,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    /// `model.type`: candidate model families.
    pub model_type: Vec<String>,
    pub hyperparameters: Hyperparameters,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSettings {
    pub target_column: String,
    pub test_size: f64,
    pub random_state: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelTrainingConfig {
    pub stage: String,
    pub model: ModelSpec,
    pub training: TrainingSettings,
}

impl StageConfig for ModelTrainingConfig {
    const SECTION: &'static str = "model_training";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let model = section.child("model")?;
        let hp = model.child("hyperparameters")?;
        let training = section.child("training")?;
        Ok(Self {
            stage: section.child("stage")?.string()?,
            model: ModelSpec {
                model_type: model.child("type")?.strings()?,
                hyperparameters: Hyperparameters {
                    n_estimators: hp.child("n_estimators")?.u32()?,
                    max_depth: hp.child("max_depth")?.u32()?,
                    learning_rate: hp.child("learning_rate")?.f64()?,
                },
            },
            training: TrainingSettings {
                target_column: training.child("target_column")?.string()?,
                test_size: training.child("test_size")?.f64()?,
                random_state: training.child("random_state")?.u64()?,
            },
        })
    }

    fn to_node(&self) -> Node {
        let hp = &self.model.hyperparameters;
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "model",
                mapping([
                    ("type", strings_node(&self.model.model_type)),
                    (
                        "hyperparameters",
                        mapping([
                            ("n_estimators", count_node(hp.n_estimators)),
                            ("max_depth", count_node(hp.max_depth)),
                            ("learning_rate", Node::from(hp.learning_rate)),
                        ]),
                    ),
                ]),
            ),
            (
                "training",
                mapping([
                    (
                        "target_column",
                        Node::from(self.training.target_column.as_str()),
                    ),
                    ("test_size", Node::from(self.training.test_size)),
                    ("random_state", u64_node(self.training.random_state)),
                ]),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSettings {
    pub metric: String,
    pub cross_validation: bool,
    pub n_splits: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelEvaluationConfig {
    pub stage: String,
    pub evaluation: EvaluationSettings,
}

impl StageConfig for ModelEvaluationConfig {
    const SECTION: &'static str = "model_evaluation";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let eval = section.child("evaluation")?;
        Ok(Self {
            stage: section.child("stage")?.string()?,
            evaluation: EvaluationSettings {
                metric: eval.child("metric")?.string()?,
                cross_validation: eval.child("cross_validation")?.bool()?,
                n_splits: eval.child("n_splits")?.u32()?,
            },
        })
    }

    fn to_node(&self) -> Node {
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "evaluation",
                mapping([
                    ("metric", Node::from(self.evaluation.metric.as_str())),
                    ("cross_validation", Node::from(self.evaluation.cross_validation)),
                    ("n_splits", count_node(self.evaluation.n_splits)),
                ]),
            ),
        ])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictionPaths {
    pub model: PathBuf,
    pub input_data: PathBuf,
    pub output_predictions: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelPredictionConfig {
    pub stage: String,
    pub paths: PredictionPaths,
    /// `settings.batch_size`.
    pub batch_size: usize,
}

impl StageConfig for ModelPredictionConfig {
    const SECTION: &'static str = "model_prediction";

    fn from_section(section: &Section<'_>) -> Result<Self> {
        let paths = section.child("paths")?;
        Ok(Self {
            stage: section.child("stage")?.string()?,
            paths: PredictionPaths {
                model: paths.child("model")?.path_buf()?,
                input_data: paths.child("input_data")?.path_buf()?,
                output_predictions: paths.child("output_predictions")?.path_buf()?,
            },
            batch_size: positive_usize(&section.child("settings")?.child("batch_size")?)?,
        })
    }

    fn to_node(&self) -> Node {
        mapping([
            ("stage", Node::from(self.stage.as_str())),
            (
                "paths",
                mapping([
                    ("model", Node::from(self.paths.model.clone())),
                    ("input_data", Node::from(self.paths.input_data.clone())),
                    (
                        "output_predictions",
                        Node::from(self.paths.output_predictions.clone()),
                    ),
                ]),
            ),
            (
                "settings",
                mapping([("batch_size", usize_node(self.batch_size))]),
            ),
        ])
    }
}

// ---------------------------------------------------------------------------------------------
// Resolvers
// ---------------------------------------------------------------------------------------------

/// Resolve `data_ingestion`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_data_ingestion(doc: &ConfigDocument) -> Result<DataIngestionConfig> {
    DataIngestionConfig::resolve(doc)
}

/// Resolve `data_cleaning`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_data_cleaning(doc: &ConfigDocument) -> Result<DataCleaningConfig> {
    DataCleaningConfig::resolve(doc)
}

/// Resolve `data_validation`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_data_validation(doc: &ConfigDocument) -> Result<DataValidationConfig> {
    DataValidationConfig::resolve(doc)
}

/// Resolve `data_transformation`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_data_transformation(doc: &ConfigDocument) -> Result<DataTransformationConfig> {
    DataTransformationConfig::resolve(doc)
}

/// Resolve `feature_selection`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_feature_selection(doc: &ConfigDocument) -> Result<FeatureSelectionConfig> {
    FeatureSelectionConfig::resolve(doc)
}

/// Resolve `feature_engineering`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_feature_engineering(doc: &ConfigDocument) -> Result<FeatureEngineeringConfig> {
    FeatureEngineeringConfig::resolve(doc)
}

/// Resolve `model_training`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_model_training(doc: &ConfigDocument) -> Result<ModelTrainingConfig> {
    ModelTrainingConfig::resolve(doc)
}

/// Resolve `model_evaluation`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_model_evaluation(doc: &ConfigDocument) -> Result<ModelEvaluationConfig> {
    ModelEvaluationConfig::resolve(doc)
}

/// Resolve `model_prediction`.
///
/// # Errors
/// Schema violations naming the offending path.
pub fn resolve_model_prediction(doc: &ConfigDocument) -> Result<ModelPredictionConfig> {
    ModelPredictionConfig::resolve(doc)
}

/// All nine stage records, resolved from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct StageConfigs {
    pub ingestion: DataIngestionConfig,
    pub cleaning: DataCleaningConfig,
    pub validation: DataValidationConfig,
    pub transformation: DataTransformationConfig,
    pub feature_selection: FeatureSelectionConfig,
    pub feature_engineering: FeatureEngineeringConfig,
    pub training: ModelTrainingConfig,
    pub evaluation: ModelEvaluationConfig,
    pub prediction: ModelPredictionConfig,
}

impl StageConfigs {
    /// Resolve every stage. Fails on the first stage that does not resolve.
    ///
    /// # Errors
    /// The first schema violation found, in pipeline order.
    pub fn resolve_all(doc: &ConfigDocument) -> Result<Self> {
        Ok(Self {
            ingestion: DataIngestionConfig::resolve(doc)?,
            cleaning: DataCleaningConfig::resolve(doc)?,
            validation: DataValidationConfig::resolve(doc)?,
            transformation: DataTransformationConfig::resolve(doc)?,
            feature_selection: FeatureSelectionConfig::resolve(doc)?,
            feature_engineering: FeatureEngineeringConfig::resolve(doc)?,
            training: ModelTrainingConfig::resolve(doc)?,
            evaluation: ModelEvaluationConfig::resolve(doc)?,
            prediction: ModelPredictionConfig::resolve(doc)?,
        })
    }

    /// `(section, subtree)` for every stage, in pipeline order.
    #[must_use]
    pub fn sections(&self) -> Vec<(&'static str, Node)> {
        vec![
            (DataIngestionConfig::SECTION, self.ingestion.to_node()),
            (DataCleaningConfig::SECTION, self.cleaning.to_node()),
            (DataValidationConfig::SECTION, self.validation.to_node()),
            (DataTransformationConfig::SECTION, self.transformation.to_node()),
            (FeatureSelectionConfig::SECTION, self.feature_selection.to_node()),
            (FeatureEngineeringConfig::SECTION, self.feature_engineering.to_node()),
            (ModelTrainingConfig::SECTION, self.training.to_node()),
            (ModelEvaluationConfig::SECTION, self.evaluation.to_node()),
            (ModelPredictionConfig::SECTION, self.prediction.to_node()),
        ]
    }
}
