//! Core configuration structure for the probeset ranker.

use crate::core::constants::*;
use crate::core::error::{RankerError, Result};
use crate::core::types::{MeasureType, VerbosityLevel};
use crate::cv::CrossValidationConfig;
use crate::dataset::{ClassificationTask, TableConfig};
use crate::linear::LogisticRegressionTrainer;
use crate::selection::Strategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Cross-validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvSection {
    /// Folds per round; equal to the sample count for leave-one-out
    pub fold_count: usize,
    /// Rounds, each with a fresh partition
    pub repeat_count: usize,
    /// Base seed shared by every strategy
    pub seed: u64,
    /// Measure names in report order
    pub measures: Vec<String>,
    /// Train the folds of a round in parallel
    pub parallel: bool,
    /// Worker threads for parallel folds, 0 = one per core
    pub threads: usize,
}

impl Default for CvSection {
    fn default() -> Self {
        CvSection {
            fold_count: DEFAULT_FOLD_COUNT,
            repeat_count: DEFAULT_REPEAT_COUNT,
            seed: DEFAULT_SEED,
            measures: DEFAULT_MEASURES.iter().map(|s| s.to_string()).collect(),
            parallel: false,
            threads: 0,
        }
    }
}

/// Top-K selection settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSection {
    /// Features kept per strategy
    pub top_k: usize,
}

impl Default for SelectionSection {
    fn default() -> Self {
        SelectionSection { top_k: DEFAULT_TOP_K }
    }
}

/// Input locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// Expression table
    pub dataset: Option<PathBuf>,
    /// Gene lists; all features are used when empty
    pub gene_lists: Vec<PathBuf>,
    /// Table parsing options
    pub table: TableConfig,
}

/// Output locations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    /// Directory receiving one ranking report per (task, gene list, strategy)
    pub ranking_dir: Option<PathBuf>,
    /// Measure report file
    pub measure_report: Option<PathBuf>,
    /// Append to existing reports instead of replacing them
    pub append: bool,
}

/// Complete run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cross-validation
    pub cv: CvSection,
    /// Top-K selection
    pub selection: SelectionSection,
    /// Linear trainer used by cross-validation and weight based strategies
    pub trainer: LogisticRegressionTrainer,
    /// Scoring strategies to compare
    pub strategies: Vec<Strategy>,
    /// Classification tasks
    pub tasks: Vec<ClassificationTask>,
    /// Input locations
    pub input: InputSection,
    /// Output locations
    pub output: OutputSection,
    /// Log verbosity when `RUST_LOG` is unset
    pub verbosity: VerbosityLevel,
    /// Log a failed (task, gene list) unit and keep going
    pub continue_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cv: CvSection::default(),
            selection: SelectionSection::default(),
            trainer: LogisticRegressionTrainer::default(),
            strategies: vec![Strategy::TTest],
            tasks: Vec::new(),
            input: InputSection::default(),
            output: OutputSection::default(),
            verbosity: VerbosityLevel::default(),
            continue_on_error: false,
        }
    }
}

fn env_value<T: FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RankerError::config(format!("Invalid {}: {}", name, raw))),
        Err(_) => Ok(None),
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration.
    ///
    /// Tasks are optional here; the driver refuses to run without one.
    pub fn validate(&self) -> Result<()> {
        if self.cv.fold_count < 2 {
            return Err(RankerError::config(format!(
                "cv.fold_count must be at least 2, got {}",
                self.cv.fold_count
            )));
        }
        if self.cv.repeat_count == 0 {
            return Err(RankerError::config("cv.repeat_count must be at least 1"));
        }
        MeasureType::parse_list(&self.cv.measures)
            .map_err(|e| RankerError::config(format!("cv.measures: {}", e)))?;

        if self.cv.threads > num_cpus::get() * 2 {
            log::warn!(
                "cv.threads ({}) is much larger than available cores ({})",
                self.cv.threads,
                num_cpus::get()
            );
        }

        if self.selection.top_k == 0 {
            return Err(RankerError::config("selection.top_k must be at least 1"));
        }

        self.trainer
            .validate()
            .map_err(|e| RankerError::config(format!("trainer: {}", e)))?;

        if self.strategies.is_empty() {
            return Err(RankerError::config("at least one strategy is required"));
        }
        for (i, strategy) in self.strategies.iter().enumerate() {
            if self.strategies[..i].iter().any(|s| s.label() == strategy.label()) {
                return Err(RankerError::config(format!("duplicate strategy '{}'", strategy.label())));
            }
            if let Strategy::Elimination {
                target_count,
                shrink_ratio,
            } = *strategy
            {
                if target_count == 0 {
                    return Err(RankerError::config("elimination target_count must be at least 1"));
                }
                if !(shrink_ratio > 0.0 && shrink_ratio <= 1.0) {
                    return Err(RankerError::config(format!(
                        "elimination shrink_ratio must be in (0, 1], got {}",
                        shrink_ratio
                    )));
                }
            }
        }

        for (i, task) in self.tasks.iter().enumerate() {
            task.validate()
                .map_err(|e| RankerError::config(format!("tasks[{}]: {}", i, e)))?;
            if self.tasks[..i].iter().any(|t| t.name == task.name) {
                return Err(RankerError::config(format!("duplicate task name '{}'", task.name)));
            }
        }

        Ok(())
    }

    /// Measures to compute, in report order
    pub fn measure_types(&self) -> Result<Vec<MeasureType>> {
        MeasureType::parse_list(&self.cv.measures)
    }

    /// Cross-validation settings for the evaluator
    pub fn cv_config(&self) -> Result<CrossValidationConfig> {
        Ok(CrossValidationConfig::new()
            .with_fold_count(self.cv.fold_count)
            .with_repeat_count(self.cv.repeat_count)
            .with_seed(self.cv.seed)
            .with_measures(self.measure_types()?)
            .with_parallel(self.cv.parallel))
    }

    /// Worker threads for parallel folds
    pub fn effective_threads(&self) -> usize {
        if self.cv.threads == 0 {
            num_cpus::get()
        } else {
            self.cv.threads
        }
    }

    /// Load configuration from a `.toml` or `.json` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| RankerError::config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        let config: Config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => {
                return Err(RankerError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.toml` or `.json` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self)?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| RankerError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(RankerError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| RankerError::config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Default configuration with environment overrides applied
    pub fn load_from_environment() -> Result<Self> {
        let mut config = Config::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Override settings from `PROBESET_*` environment variables
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Some(seed) = env_value(&format!("{}SEED", ENV_PREFIX))? {
            self.cv.seed = seed;
        }
        if let Some(folds) = env_value(&format!("{}FOLDS", ENV_PREFIX))? {
            self.cv.fold_count = folds;
        }
        if let Some(repeats) = env_value(&format!("{}REPEATS", ENV_PREFIX))? {
            self.cv.repeat_count = repeats;
        }
        if let Some(top_k) = env_value(&format!("{}TOP_K", ENV_PREFIX))? {
            self.selection.top_k = top_k;
        }
        if let Some(threads) = env_value(&format!("{}THREADS", ENV_PREFIX))? {
            self.cv.threads = threads;
        }
        self.validate()
    }
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set folds per round
    pub fn fold_count(mut self, fold_count: usize) -> Self {
        if fold_count < 2 {
            self.validation_errors
                .push(format!("fold_count must be at least 2, got {}", fold_count));
        }
        self.config.cv.fold_count = fold_count;
        self
    }

    /// Set number of rounds
    pub fn repeat_count(mut self, repeat_count: usize) -> Self {
        if repeat_count == 0 {
            self.validation_errors.push("repeat_count must be at least 1".to_string());
        }
        self.config.cv.repeat_count = repeat_count;
        self
    }

    /// Set base seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.cv.seed = seed;
        self
    }

    /// Set measures by name
    pub fn measures<S: AsRef<str>>(mut self, measures: &[S]) -> Self {
        if let Err(e) = MeasureType::parse_list(measures) {
            self.validation_errors.push(e.to_string());
        }
        self.config.cv.measures = measures.iter().map(|m| m.as_ref().to_string()).collect();
        self
    }

    /// Enable parallel fold training
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.cv.parallel = parallel;
        self
    }

    /// Set worker threads, 0 = one per core
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.cv.threads = threads;
        self
    }

    /// Set features kept per strategy
    pub fn top_k(mut self, top_k: usize) -> Self {
        if top_k == 0 {
            self.validation_errors.push("top_k must be at least 1".to_string());
        }
        self.config.selection.top_k = top_k;
        self
    }

    /// Set trainer parameters
    pub fn trainer(mut self, trainer: LogisticRegressionTrainer) -> Self {
        if let Err(e) = trainer.validate() {
            self.validation_errors.push(e.to_string());
        }
        self.config.trainer = trainer;
        self
    }

    /// Replace the strategy list
    pub fn strategies(mut self, strategies: Vec<Strategy>) -> Self {
        self.config.strategies = strategies;
        self
    }

    /// Add a task
    pub fn task(mut self, task: ClassificationTask) -> Self {
        if let Err(e) = task.validate() {
            self.validation_errors.push(e.to_string());
        }
        self.config.tasks.push(task);
        self
    }

    /// Set expression table location
    pub fn dataset<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.input.dataset = Some(path.into());
        self
    }

    /// Add a gene list
    pub fn gene_list<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.input.gene_lists.push(path.into());
        self
    }

    /// Set ranking report directory
    pub fn ranking_dir<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.output.ranking_dir = Some(path.into());
        self
    }

    /// Set measure report file
    pub fn measure_report<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.config.output.measure_report = Some(path.into());
        self
    }

    /// Append to existing reports
    pub fn append(mut self, append: bool) -> Self {
        self.config.output.append = append;
        self
    }

    /// Set verbosity
    pub fn verbosity(mut self, verbosity: VerbosityLevel) -> Self {
        self.config.verbosity = verbosity;
        self
    }

    /// Keep going after a failed unit
    pub fn continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.config.continue_on_error = continue_on_error;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        if !self.validation_errors.is_empty() {
            return Err(RankerError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
