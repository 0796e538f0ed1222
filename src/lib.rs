//! # Probeset Ranker
//!
//! Ranks microarray probesets by their predictive value for a binary
//! classification task and measures, by repeated seeded cross-validation,
//! how well the selected probesets classify.
//!
//! ## Features
//!
//! - **Bounded top-K selection**: [`ScoreBoundedSelector`] keeps the K best
//!   scores of a stream in a bounded min-heap.
//! - **Reproducible cross-validation**: [`FoldPartitioner`] derives stratified
//!   folds from a seed alone, so every strategy compared on a task sees the
//!   same folds; [`CrossValidationEvaluator`] trains per fold and averages the
//!   requested measures over folds and repeats.
//! - **Recursive feature elimination**: [`RecursiveEliminationLoop`] retrains
//!   a linear model and discards the smallest weights until a target count
//!   is reached.
//! - **Scoring strategies**: Welch t-test, Kendall tau-b, min/max separation,
//!   linear weight and elimination, behind one [`Strategy`] enum.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use probeset_ranker::{
//!     top_k, CrossValidationConfig, CrossValidationEvaluator, ClassificationTask,
//!     LogisticRegressionTrainer, MeasureType, Strategy, TableLoader,
//! };
//!
//! # fn main() -> probeset_ranker::Result<()> {
//! let dataset = TableLoader::default().load("expression.tsv")?;
//! let task = ClassificationTask::new("tumor_vs_normal", vec!["normal".into()], vec!["tumor".into()])?;
//! let data = task.bind(&dataset)?;
//!
//! let trainer = LogisticRegressionTrainer::new();
//! let scores = Strategy::TTest.score(&trainer, &data, &data.all_features())?;
//! let selected: Vec<usize> = top_k(scores, 20)?.iter().map(|s| s.feature).collect();
//!
//! let evaluator = CrossValidationEvaluator::new(
//!     CrossValidationConfig::new()
//!         .with_fold_count(5)
//!         .with_repeat_count(10)
//!         .with_seed(42)
//!         .with_measures(vec![MeasureType::Auc, MeasureType::Accuracy]),
//! );
//! let measures = evaluator.evaluate(&trainer, &data, &selected)?;
//! for (name, value) in measures.iter() {
//!     println!("{name}: {value:.3}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`core`]: types, constants, error handling and the trainer/model traits
//! - [`dataset`]: expression tables, tasks and gene lists
//! - [`selection`]: bounded selection and scoring strategies
//! - [`cv`]: fold partitioning and cross-validation
//! - [`elimination`]: recursive feature elimination
//! - [`linear`]: logistic regression trainer
//! - [`metrics_eval`]: performance measures
//! - [`report`]: tab-separated reports
//! - [`config`]: configuration files and environment overrides
//! - [`runner`]: driver over tasks × gene lists × strategies

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Dataset loading and task binding
pub mod dataset;

// Bounded selection and scoring strategies
pub mod selection;

// Cross-validation
pub mod cv;

// Recursive feature elimination
pub mod elimination;

// Linear classifiers
pub mod linear;

// Performance measures
pub mod metrics_eval;

// Report writers
pub mod report;

// Driver
pub mod runner;

// Re-export commonly used types
pub use crate::core::{
    constants::*,
    error::{RankerError, Result},
    traits::{LinearModel, Model, Trainer},
    types::{FeatureIndex, FeatureScore, MeasureType, Prediction, SampleIndex, VerbosityLevel},
};

pub use config::{Config, ConfigBuilder};

pub use dataset::{load_gene_list, BinaryDataset, ClassificationTask, Dataset, TableConfig, TableLoader};

pub use selection::{top_k, ScoreBoundedSelector, Strategy, StrategyScores};

pub use cv::{
    cross_validate, CrossValidationConfig, CrossValidationEvaluator, EvaluationMeasure, FoldAssignment,
    FoldPartitioner,
};

pub use elimination::{eliminate, EliminationResult, FeatureWeight, RankedFeature, RecursiveEliminationLoop};

pub use linear::{LogisticModel, LogisticRegressionTrainer};

pub use metrics_eval::{compute_measure, ConfusionMatrix};

pub use report::{MeasureReportWriter, ReportWriter};

pub use runner::{GeneList, RunSummary, Runner, StrategyOutcome};

// Version information
pub use crate::core::constants::PROBESET_RANKER_VERSION as VERSION;

/// Initialize logging.
///
/// `RUST_LOG` takes precedence; otherwise `verbosity` sets the filter.
/// Calling this more than once is harmless.
pub fn init_logging(verbosity: VerbosityLevel) {
    let env = env_logger::Env::default().default_filter_or(verbosity.as_filter());
    if env_logger::Builder::from_env(env).format_timestamp_secs().try_init().is_ok() {
        log::debug!("probeset-ranker {} logging initialised", VERSION);
    }
}
