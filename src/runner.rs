//! Driver over tasks × gene lists × strategies.
//!
//! Every strategy of a (task, gene list) pair is scored on the same features,
//! cut to the top K and cross-validated with the same seed, so measured
//! differences come from the selected features alone.

use crate::config::Config;
use crate::core::error::{RankerError, Result};
use crate::core::traits::{LinearModel, Trainer};
use crate::core::types::{FeatureIndex, FeatureScore};
use crate::cv::{CrossValidationEvaluator, EvaluationMeasure};
use crate::dataset::{load_gene_list, BinaryDataset, ClassificationTask, Dataset};
use crate::elimination::FeatureWeight;
use crate::report::{MeasureReportWriter, MeasureRow, ReportWriter};
use crate::selection::{top_k, Strategy};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Gene list name used when no list restricts the features
pub const ALL_FEATURES: &str = "all";

/// A named list of feature identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneList {
    /// Name used in reports
    pub name: String,
    /// Feature identifiers
    pub features: Vec<String>,
}

impl GeneList {
    /// Create a gene list
    pub fn new<S: Into<String>>(name: S, features: Vec<String>) -> Self {
        GeneList {
            name: name.into(),
            features,
        }
    }

    /// Load a gene list file, named after its file stem
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(GeneList::new(name, load_gene_list(path)?))
    }
}

/// Result of one (task, gene list, strategy) unit
#[derive(Debug, Clone, Serialize)]
pub struct StrategyOutcome {
    /// Task name
    pub task: String,
    /// Gene list name
    pub gene_list: String,
    /// Strategy label, unique within a run
    pub strategy: String,
    /// Selected features, best first
    pub ranked: Vec<FeatureScore>,
    /// Terminal model weights of an elimination strategy
    pub final_weights: Option<Vec<FeatureWeight>>,
    /// Names of the selected features, aligned with `ranked`
    pub feature_names: Vec<String>,
    /// Cross-validated measures of the selected features
    pub measures: Option<EvaluationMeasure>,
    /// Error that stopped the unit
    pub error: Option<String>,
}

impl StrategyOutcome {
    fn failed(task: &str, gene_list: &str, strategy: &str, error: &RankerError) -> Self {
        StrategyOutcome {
            task: task.to_string(),
            gene_list: gene_list.to_string(),
            strategy: strategy.to_string(),
            ranked: Vec::new(),
            final_weights: None,
            feature_names: Vec::new(),
            measures: None,
            error: Some(error.to_string()),
        }
    }

    /// Whether the unit completed
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Outcomes of a full run, in execution order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// One entry per unit
    pub outcomes: Vec<StrategyOutcome>,
}

impl RunSummary {
    /// Completed units
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    /// Failed units
    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// Outcome of a unit
    pub fn find(&self, task: &str, gene_list: &str, strategy: &str) -> Option<&StrategyOutcome> {
        self.outcomes
            .iter()
            .find(|o| o.task == task && o.gene_list == gene_list && o.strategy == strategy)
    }
}

/// Runs every configured unit with one trainer
#[derive(Debug)]
pub struct Runner<T> {
    config: Config,
    trainer: T,
    evaluator: CrossValidationEvaluator,
    pool: Option<rayon::ThreadPool>,
}

impl<T> Runner<T>
where
    T: Trainer,
    T::Model: LinearModel,
{
    /// Validate the configuration and prepare the worker pool
    pub fn new(config: Config, trainer: T) -> Result<Self> {
        config.validate()?;
        if config.tasks.is_empty() {
            return Err(RankerError::config("no classification task configured"));
        }

        let evaluator = CrossValidationEvaluator::new(config.cv_config()?);
        let pool = if config.cv.parallel {
            let threads = config.effective_threads();
            log::info!("Training folds on {} threads", threads);
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| RankerError::config(format!("Failed to create thread pool: {}", e)))?;
            Some(pool)
        } else {
            None
        };

        Ok(Runner {
            config,
            trainer,
            evaluator,
            pool,
        })
    }

    /// Run configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every task × gene list × strategy.
    ///
    /// With no gene lists every feature of the dataset is a candidate.
    pub fn run(&self, dataset: &Dataset, gene_lists: &[GeneList]) -> Result<RunSummary> {
        let all;
        let gene_lists = if gene_lists.is_empty() {
            all = [GeneList::new(ALL_FEATURES, dataset.feature_names().to_vec())];
            &all[..]
        } else {
            gene_lists
        };

        let mut measure_writer = match &self.config.output.measure_report {
            Some(path) => Some(MeasureReportWriter::open(
                path,
                &self.config.measure_types()?,
                self.config.output.append,
            )?),
            None => None,
        };

        let mut summary = RunSummary::default();
        for task in &self.config.tasks {
            log::info!("Task {}: {:?} vs {:?}", task.name, task.negative, task.positive);

            let data = match task.bind(dataset) {
                Ok(data) => data,
                Err(e) => {
                    self.give_up_or_record(e, &mut summary, task, gene_lists)?;
                    continue;
                }
            };

            for gene_list in gene_lists {
                let features = dataset.resolve_features(&gene_list.features);
                for strategy in &self.config.strategies {
                    let outcome = self.run_unit(task, &data, gene_list, &features, strategy, measure_writer.as_mut());
                    match outcome {
                        Ok(outcome) => summary.outcomes.push(outcome),
                        Err(e) if self.config.continue_on_error && e.is_recoverable() => {
                            log::error!(
                                "{} / {} / {} failed [{}]: {}",
                                task.name,
                                gene_list.name,
                                strategy.label(),
                                e.category(),
                                e
                            );
                            summary
                                .outcomes
                                .push(StrategyOutcome::failed(&task.name, &gene_list.name, &strategy.label(), &e));
                        }
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        log::info!(
            "Run finished: {} units succeeded, {} failed",
            summary.succeeded(),
            summary.failed()
        );
        Ok(summary)
    }

    fn give_up_or_record(
        &self,
        error: RankerError,
        summary: &mut RunSummary,
        task: &ClassificationTask,
        gene_lists: &[GeneList],
    ) -> Result<()> {
        if !(self.config.continue_on_error && error.is_recoverable()) {
            return Err(error);
        }
        log::error!("Task {} skipped: {}", task.name, error);
        for gene_list in gene_lists {
            for strategy in &self.config.strategies {
                summary
                    .outcomes
                    .push(StrategyOutcome::failed(&task.name, &gene_list.name, &strategy.label(), &error));
            }
        }
        Ok(())
    }

    fn run_unit(
        &self,
        task: &ClassificationTask,
        data: &BinaryDataset,
        gene_list: &GeneList,
        features: &[FeatureIndex],
        strategy: &Strategy,
        measure_writer: Option<&mut MeasureReportWriter>,
    ) -> Result<StrategyOutcome> {
        if features.is_empty() {
            return Err(RankerError::dataset(format!(
                "no feature of gene list {} is in the dataset",
                gene_list.name
            )));
        }
        log::info!(
            "{} / {} / {}: scoring {} features",
            task.name,
            gene_list.name,
            strategy,
            features.len()
        );

        let label = strategy.label();
        let scored = strategy.score_with_weights(&self.trainer, data, features)?;
        let ranked = top_k(scored.scores, self.config.selection.top_k)?;
        let selected: Vec<FeatureIndex> = ranked.iter().map(|s| s.feature).collect();

        let measures = match &self.pool {
            Some(pool) => pool.install(|| self.evaluator.evaluate(&self.trainer, data, &selected))?,
            None => self.evaluator.evaluate(&self.trainer, data, &selected)?,
        };

        if let Some(dir) = &self.config.output.ranking_dir {
            let path = ranking_path(dir, &task.name, &gene_list.name, &label);
            let mut writer = ReportWriter::open(&path, self.config.output.append)?;
            writer.write_ranking(&ranked, data.feature_names())?;
            log::debug!("Wrote {} ranked features to {}", writer.rows_written(), path.display());

            if let Some(weights) = &scored.final_weights {
                let path = weights_path(dir, &task.name, &gene_list.name, &label);
                let mut writer = ReportWriter::open(&path, self.config.output.append)?;
                writer.write_weights(weights, data.feature_names())?;
                log::debug!("Wrote {} final weights to {}", writer.rows_written(), path.display());
            }
        }
        if let Some(writer) = measure_writer {
            writer.write_row(&MeasureRow {
                task: &task.name,
                gene_list: &gene_list.name,
                strategy: &label,
                features: selected.len(),
                measures: &measures,
            })?;
        }

        Ok(StrategyOutcome {
            task: task.name.clone(),
            gene_list: gene_list.name.clone(),
            strategy: label,
            feature_names: selected.iter().map(|&f| data.feature_name(f).to_string()).collect(),
            ranked,
            final_weights: scored.final_weights,
            measures: Some(measures),
            error: None,
        })
    }
}

fn unit_file(dir: &Path, task: &str, gene_list: &str, strategy: &str, suffix: &str) -> PathBuf {
    let sanitize = |s: &str| -> String {
        s.chars()
            .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect()
    };
    dir.join(format!(
        "{}.{}.{}{}",
        sanitize(task),
        sanitize(gene_list),
        sanitize(strategy),
        suffix
    ))
}

/// Ranking report location of one unit
pub fn ranking_path(dir: &Path, task: &str, gene_list: &str, strategy: &str) -> PathBuf {
    unit_file(dir, task, gene_list, strategy, ".tsv")
}

/// Terminal weight report location of one elimination unit
pub fn weights_path(dir: &Path, task: &str, gene_list: &str, strategy: &str) -> PathBuf {
    unit_file(dir, task, gene_list, strategy, ".weights.tsv")
}
