//! Repeated, seeded cross-validation of a fixed feature set.

use crate::core::constants::*;
use crate::core::error::{RankerError, Result};
use crate::core::traits::{Model, Trainer};
use crate::core::types::{FeatureIndex, MeasureType, Prediction, SampleIndex};
use crate::cv::partition::{FoldAssignment, FoldPartitioner};
use crate::dataset::BinaryDataset;
use crate::metrics_eval::compute_measure;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Cross-validation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationConfig {
    /// Number of folds per round
    pub fold_count: usize,
    /// Number of rounds, each with its own partition
    pub repeat_count: usize,
    /// Base seed; round `r` partitions with `seed + r`
    pub seed: u64,
    /// Measures to compute, in report order
    pub measures: Vec<MeasureType>,
    /// Train the folds of a round on the rayon pool
    pub parallel: bool,
}

impl CrossValidationConfig {
    /// Create a configuration with default settings
    pub fn new() -> Self {
        CrossValidationConfig {
            fold_count: DEFAULT_FOLD_COUNT,
            repeat_count: DEFAULT_REPEAT_COUNT,
            seed: DEFAULT_SEED,
            measures: vec![MeasureType::Auc, MeasureType::Accuracy, MeasureType::FMeasure],
            parallel: false,
        }
    }

    /// Set the number of folds
    pub fn with_fold_count(mut self, fold_count: usize) -> Self {
        self.fold_count = fold_count;
        self
    }

    /// Set the number of rounds
    pub fn with_repeat_count(mut self, repeat_count: usize) -> Self {
        self.repeat_count = repeat_count;
        self
    }

    /// Set the base seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the measures to compute
    pub fn with_measures(mut self, measures: Vec<MeasureType>) -> Self {
        self.measures = measures;
        self
    }

    /// Enable or disable parallel fold training
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for CrossValidationConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate of one measure over all evaluations of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureValue {
    /// Measure
    pub measure: MeasureType,
    /// Arithmetic mean over all evaluations
    pub mean: f64,
    /// Population standard deviation over all evaluations
    pub std_dev: f64,
    /// Evaluations whose raw value was NaN and was replaced by the sentinel
    pub normalized: usize,
    /// Value of every evaluation, round-major then fold order
    pub values: Vec<f64>,
}

impl MeasureValue {
    fn from_values(measure: MeasureType, values: Vec<f64>, normalized: usize) -> Self {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
        MeasureValue {
            measure,
            mean,
            std_dev: variance.sqrt(),
            normalized,
            values,
        }
    }
}

/// Aggregated result of a cross-validation run.
///
/// Measures keep the order they were requested in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMeasure {
    entries: Vec<MeasureValue>,
    evaluations: usize,
    leave_one_out: bool,
}

impl EvaluationMeasure {
    /// Mean value of a measure by name
    pub fn get(&self, name: &str) -> Option<f64> {
        let measure: MeasureType = name.parse().ok()?;
        self.value(measure)
    }

    /// Mean value of a measure
    pub fn value(&self, measure: MeasureType) -> Option<f64> {
        self.entry(measure).map(|e| e.mean)
    }

    /// Full aggregate of a measure
    pub fn entry(&self, measure: MeasureType) -> Option<&MeasureValue> {
        self.entries.iter().find(|e| e.measure == measure)
    }

    /// Number of NaN values normalised for a measure
    pub fn normalized(&self, measure: MeasureType) -> usize {
        self.entry(measure).map_or(0, |e| e.normalized)
    }

    /// `(name, mean)` pairs in request order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.entries.iter().map(|e| (e.measure.name(), e.mean))
    }

    /// Every aggregate in request order
    pub fn entries(&self) -> &[MeasureValue] {
        &self.entries
    }

    /// Measures in request order
    pub fn measures(&self) -> Vec<MeasureType> {
        self.entries.iter().map(|e| e.measure).collect()
    }

    /// Number of evaluations averaged per measure
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Whether the run pooled leave-one-out predictions
    pub fn is_leave_one_out(&self) -> bool {
        self.leave_one_out
    }
}

/// Runs repeated cross-validation with a borrowed trainer
#[derive(Debug, Clone, Default)]
pub struct CrossValidationEvaluator {
    config: CrossValidationConfig,
}

impl CrossValidationEvaluator {
    /// Create an evaluator
    pub fn new(config: CrossValidationConfig) -> Self {
        CrossValidationEvaluator { config }
    }

    /// Evaluator configuration
    pub fn config(&self) -> &CrossValidationConfig {
        &self.config
    }

    /// Cross-validate `features` on `data`.
    ///
    /// Every round partitions with a stratified [`FoldPartitioner`] seeded
    /// with `seed + round`, trains a fresh model on each fold complement and
    /// scores the held-out fold. The same seed always yields the same folds,
    /// whatever feature set is evaluated.
    pub fn evaluate<T: Trainer>(
        &self,
        trainer: &T,
        data: &BinaryDataset,
        features: &[FeatureIndex],
    ) -> Result<EvaluationMeasure> {
        let config = &self.config;
        self.validate(data, features)?;

        let classes = data.classes();
        let positives: Vec<bool> = (0..data.num_samples()).map(|s| data.is_positive(s)).collect();
        let leave_one_out = config.fold_count == data.num_samples();

        let mut repeat_count = config.repeat_count;
        if leave_one_out && repeat_count > 1 {
            log::warn!(
                "Leave-one-out partitions do not depend on the seed, running 1 round instead of {}",
                repeat_count
            );
            repeat_count = 1;
        }

        log::info!(
            "Cross-validating {} features with {}: {} folds × {} rounds, seed {}",
            features.len(),
            trainer.name(),
            config.fold_count,
            repeat_count,
            config.seed
        );

        let mut collected: Vec<Vec<f64>> = vec![Vec::new(); config.measures.len()];
        let mut normalized = vec![0usize; config.measures.len()];

        for round in 0..repeat_count {
            let round_seed = config.seed.wrapping_add(round as u64);
            let folds = FoldPartitioner::partition_stratified(&classes, config.fold_count, round_seed)?;
            let fold_predictions = self.predict_folds(trainer, data, features, &folds, round)?;

            if leave_one_out {
                // single-sample folds: score the pooled predictions of the round
                let mut pooled = Vec::with_capacity(data.num_samples());
                let mut pooled_truth = Vec::with_capacity(data.num_samples());
                for (fold, predictions) in fold_predictions.iter().enumerate() {
                    pooled.extend_from_slice(predictions);
                    pooled_truth.extend(folds.test_indices(fold).iter().map(|&s| positives[s]));
                }
                self.record(&pooled, &pooled_truth, round, None, &mut collected, &mut normalized);
            } else {
                for (fold, predictions) in fold_predictions.iter().enumerate() {
                    let truth: Vec<bool> = folds.test_indices(fold).iter().map(|&s| positives[s]).collect();
                    self.record(predictions, &truth, round, Some(fold), &mut collected, &mut normalized);
                }
            }
        }

        let entries: Vec<MeasureValue> = config
            .measures
            .iter()
            .zip(collected)
            .zip(normalized)
            .map(|((&measure, values), nan_count)| {
                if nan_count > 0 {
                    log::warn!(
                        "{}: {} of {} evaluations undefined, counted as {}",
                        measure,
                        nan_count,
                        values.len(),
                        measure.nan_sentinel()
                    );
                }
                MeasureValue::from_values(measure, values, nan_count)
            })
            .collect();
        let evaluations = entries.first().map_or(0, |e| e.values.len());

        let result = EvaluationMeasure {
            entries,
            evaluations,
            leave_one_out,
        };
        for (name, value) in result.iter() {
            log::info!("  {} = {:.4}", name, value);
        }
        Ok(result)
    }

    fn validate(&self, data: &BinaryDataset, features: &[FeatureIndex]) -> Result<()> {
        let config = &self.config;
        if features.is_empty() {
            return Err(RankerError::invalid_argument(
                "features",
                "[]",
                "at least one feature is required",
            ));
        }
        data.check_features(features)?;
        if config.repeat_count == 0 {
            return Err(RankerError::invalid_argument(
                "repeat_count",
                "0",
                "at least one round is required",
            ));
        }
        if config.measures.is_empty() {
            return Err(RankerError::invalid_argument(
                "measures",
                "[]",
                "at least one measure is required",
            ));
        }
        Ok(())
    }

    /// Train and predict every fold of one round, in fold order
    fn predict_folds<T: Trainer>(
        &self,
        trainer: &T,
        data: &BinaryDataset,
        features: &[FeatureIndex],
        folds: &FoldAssignment,
        round: usize,
    ) -> Result<Vec<Vec<Prediction>>> {
        let run_fold = |fold: usize| -> Result<Vec<Prediction>> {
            let train_rows = folds.train_indices(fold);
            let test_rows = folds.test_indices(fold);
            log::debug!(
                "Round {} fold {}: {} training, {} held out",
                round,
                fold,
                train_rows.len(),
                test_rows.len()
            );
            let model = trainer
                .train(data, &train_rows, features)
                .map_err(|e| e.in_training(round, Some(fold)))?;
            Ok(predict_rows(&model, data, test_rows))
        };

        let results: Vec<Result<Vec<Prediction>>> = if self.config.parallel {
            (0..folds.fold_count()).into_par_iter().map(run_fold).collect()
        } else {
            (0..folds.fold_count()).map(run_fold).collect()
        };
        // collected in fold order: the lowest failing fold is reported
        results.into_iter().collect()
    }

    fn record(
        &self,
        predictions: &[Prediction],
        truth: &[bool],
        round: usize,
        fold: Option<usize>,
        collected: &mut [Vec<f64>],
        normalized: &mut [usize],
    ) {
        for (i, &measure) in self.config.measures.iter().enumerate() {
            let raw = compute_measure(measure, predictions, truth);
            let value = if raw.is_nan() {
                normalized[i] += 1;
                log::debug!(
                    "Round {}{}: {} undefined, using {}",
                    round,
                    fold.map(|f| format!(" fold {}", f)).unwrap_or_default(),
                    measure,
                    measure.nan_sentinel()
                );
                measure.nan_sentinel()
            } else {
                raw
            };
            collected[i].push(value);
        }
    }
}

fn predict_rows<M: Model>(model: &M, data: &BinaryDataset, rows: &[SampleIndex]) -> Vec<Prediction> {
    rows.iter().map(|&row| model.predict(data.row(row))).collect()
}

/// Cross-validate with explicit parameters.
///
/// Shorthand for building a [`CrossValidationEvaluator`] and calling
/// [`CrossValidationEvaluator::evaluate`] sequentially.
pub fn cross_validate<T: Trainer>(
    trainer: &T,
    data: &BinaryDataset,
    features: &[FeatureIndex],
    fold_count: usize,
    repeat_count: usize,
    seed: u64,
    measures: &[MeasureType],
) -> Result<EvaluationMeasure> {
    let config = CrossValidationConfig::new()
        .with_fold_count(fold_count)
        .with_repeat_count(repeat_count)
        .with_seed(seed)
        .with_measures(measures.to_vec());
    CrossValidationEvaluator::new(config).evaluate(trainer, data, features)
}
