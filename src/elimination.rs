//! Recursive feature elimination.
//!
//! Each round trains a linear model on the current candidates, ranks them by
//! absolute weight and keeps the best `max(target, floor(count × ratio))`.
//! The round whose survivors fit the target is the last one.

use crate::core::error::{RankerError, Result};
use crate::core::traits::{LinearModel, Trainer};
use crate::core::types::{FeatureIndex, FeatureScore};
use crate::dataset::BinaryDataset;
use crate::selection::ScoreBoundedSelector;
use serde::{Deserialize, Serialize};

/// A surviving feature of the terminal round
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedFeature {
    /// 1-based rank by absolute weight
    pub rank: usize,
    /// Feature column
    pub feature: FeatureIndex,
    /// Signed weight in the terminal model
    pub weight: f64,
}

/// Weight of one candidate in the terminal model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureWeight {
    /// Feature column
    pub feature: FeatureIndex,
    /// Signed weight
    pub weight: f64,
}

/// Outcome of an elimination run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EliminationResult {
    /// Survivors by descending absolute weight
    pub ranked: Vec<RankedFeature>,
    /// Survivors in ascending column order
    pub retained: Vec<FeatureIndex>,
    /// Every candidate of the terminal round with its weight
    pub final_weights: Vec<FeatureWeight>,
    /// Number of trainings performed
    pub rounds: usize,
}

impl EliminationResult {
    /// Survivors as scores: `|weight|` with the signed weight as auxiliary
    pub fn feature_scores(&self) -> Vec<FeatureScore> {
        self.ranked
            .iter()
            .map(|r| FeatureScore::with_aux(r.feature, r.weight.abs(), r.weight))
            .collect()
    }
}

/// Elimination schedule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecursiveEliminationLoop {
    target_count: usize,
    shrink_ratio: f64,
}

impl RecursiveEliminationLoop {
    /// Create a schedule; `target_count ≥ 1` and `shrink_ratio ∈ (0, 1]`
    pub fn new(target_count: usize, shrink_ratio: f64) -> Result<Self> {
        if target_count == 0 {
            return Err(RankerError::invalid_argument(
                "target_count",
                "0",
                "at least one feature must be retained",
            ));
        }
        if !(shrink_ratio > 0.0 && shrink_ratio <= 1.0) {
            return Err(RankerError::invalid_argument(
                "shrink_ratio",
                shrink_ratio.to_string(),
                "must be in (0, 1]",
            ));
        }
        Ok(RecursiveEliminationLoop {
            target_count,
            shrink_ratio,
        })
    }

    /// Number of features to keep
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// Fraction of candidates kept per round
    pub fn shrink_ratio(&self) -> f64 {
        self.shrink_ratio
    }

    /// Survivors allowed after a round that starts with `current` candidates
    pub fn capacity_for(&self, current: usize) -> usize {
        if current <= self.target_count {
            return current;
        }
        let shrunk = (current as f64 * self.shrink_ratio).floor() as usize;
        let capacity = shrunk.max(self.target_count);
        if capacity >= current {
            self.target_count
        } else {
            capacity
        }
    }

    /// Eliminate from `initial_features` down to the target count.
    ///
    /// Trains on every sample of `data`. An initial set already within the
    /// target is trained once so its weights can be reported.
    pub fn run<T>(&self, trainer: &T, data: &BinaryDataset, initial_features: &[FeatureIndex]) -> Result<EliminationResult>
    where
        T: Trainer,
        T::Model: LinearModel,
    {
        if initial_features.is_empty() {
            return Err(RankerError::invalid_argument(
                "initial_features",
                "[]",
                "the candidate set is empty",
            ));
        }
        data.check_features(initial_features)?;

        let rows = data.all_rows();
        let mut candidates = initial_features.to_vec();
        let mut round = 0;

        log::info!(
            "Eliminating {} features to {} (ratio {}) with {}",
            candidates.len(),
            self.target_count,
            self.shrink_ratio,
            trainer.name()
        );

        loop {
            let model = trainer
                .train(data, &rows, &candidates)
                .map_err(|e| e.in_training(round, None))?;
            let weights = model.weights();
            if weights.len() != candidates.len() {
                return Err(RankerError::training_failure(
                    round,
                    None,
                    format!(
                        "model returned {} weights for {} features",
                        weights.len(),
                        candidates.len()
                    ),
                ));
            }

            let capacity = self.capacity_for(candidates.len());
            let mut selector = ScoreBoundedSelector::new(capacity)?;
            for (&feature, &weight) in candidates.iter().zip(weights) {
                selector.offer_score(FeatureScore::with_aux(feature, weight.abs(), weight));
            }
            let survivors: Vec<FeatureScore> = selector.pop_all().collect();

            log::debug!(
                "Elimination round {}: {} -> {} features",
                round,
                candidates.len(),
                survivors.len()
            );

            if survivors.len() <= self.target_count {
                let final_weights = candidates
                    .iter()
                    .zip(weights)
                    .map(|(&feature, &weight)| FeatureWeight { feature, weight })
                    .collect();
                return Ok(finish(survivors, final_weights, round + 1));
            }

            candidates = survivors.iter().map(|s| s.feature).collect();
            candidates.sort_unstable();
            round += 1;
        }
    }
}

fn finish(survivors: Vec<FeatureScore>, final_weights: Vec<FeatureWeight>, rounds: usize) -> EliminationResult {
    let ranked: Vec<RankedFeature> = survivors
        .iter()
        .enumerate()
        .map(|(i, s)| RankedFeature {
            rank: i + 1,
            feature: s.feature,
            weight: s.aux.unwrap_or(s.score),
        })
        .collect();
    let mut retained: Vec<FeatureIndex> = ranked.iter().map(|r| r.feature).collect();
    retained.sort_unstable();

    log::info!("Elimination kept {} features after {} rounds", retained.len(), rounds);
    EliminationResult {
        ranked,
        retained,
        final_weights,
        rounds,
    }
}

/// Run recursive elimination with explicit parameters
pub fn eliminate<T>(
    trainer: &T,
    data: &BinaryDataset,
    initial_features: &[FeatureIndex],
    target_count: usize,
    shrink_ratio: f64,
) -> Result<EliminationResult>
where
    T: Trainer,
    T::Model: LinearModel,
{
    RecursiveEliminationLoop::new(target_count, shrink_ratio)?.run(trainer, data, initial_features)
}
