//! Feature scoring strategies.
//!
//! A strategy turns a feature subset into [`FeatureScore`]s, higher meaning
//! more predictive. Missing values are left out of the per-feature
//! statistics.

use crate::core::constants::{DEFAULT_SHRINK_RATIO, DEFAULT_TARGET_COUNT, NAN_P_VALUE};
use crate::core::error::{RankerError, Result};
use crate::core::traits::{LinearModel, Trainer};
use crate::core::types::{FeatureIndex, FeatureScore};
use crate::dataset::BinaryDataset;
use crate::elimination::{FeatureWeight, RecursiveEliminationLoop};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;
use std::str::FromStr;

/// A feature scoring strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Strategy {
    /// Welch two-sample t-test: score `1 - p`, aux the t statistic
    TTest,
    /// Kendall tau-b against the class: score `|tau|`, aux tau
    KendallTau,
    /// Class separation gap: score the gap, aux its direction
    MinMax,
    /// Weight of a linear model on all features: score `|w|`, aux w
    LinearWeight,
    /// Recursive elimination: survivors scored by `|w|`, aux w
    Elimination {
        /// Features left when elimination stops
        #[serde(default = "default_target_count")]
        target_count: usize,
        /// Fraction of features kept per round
        #[serde(default = "default_shrink_ratio")]
        shrink_ratio: f64,
    },
}

fn default_target_count() -> usize {
    DEFAULT_TARGET_COUNT
}

fn default_shrink_ratio() -> f64 {
    DEFAULT_SHRINK_RATIO
}

impl Strategy {
    /// Name used in logs and reports
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::TTest => "t_test",
            Strategy::KendallTau => "kendall_tau",
            Strategy::MinMax => "min_max",
            Strategy::LinearWeight => "linear_weight",
            Strategy::Elimination { .. } => "elimination",
        }
    }

    /// Label that tells apart every configured strategy.
    ///
    /// Equal to [`Strategy::name`] except for elimination, which also carries
    /// its schedule: `elimination_t10_r0.5`.
    pub fn label(&self) -> String {
        match self {
            Strategy::Elimination {
                target_count,
                shrink_ratio,
            } => format!("elimination_t{}_r{}", target_count, shrink_ratio),
            other => other.name().to_string(),
        }
    }

    /// Whether scoring trains the classifier
    pub fn uses_trainer(&self) -> bool {
        matches!(self, Strategy::LinearWeight | Strategy::Elimination { .. })
    }

    /// Score `features` of `data`.
    ///
    /// Statistical strategies return one score per feature in input order.
    /// `Elimination` only returns its survivors, best first.
    pub fn score<T>(&self, trainer: &T, data: &BinaryDataset, features: &[FeatureIndex]) -> Result<Vec<FeatureScore>>
    where
        T: Trainer,
        T::Model: LinearModel,
    {
        Ok(self.score_with_weights(trainer, data, features)?.scores)
    }

    /// Like [`Strategy::score`], keeping the terminal model weights of an
    /// elimination run
    pub fn score_with_weights<T>(
        &self,
        trainer: &T,
        data: &BinaryDataset,
        features: &[FeatureIndex],
    ) -> Result<StrategyScores>
    where
        T: Trainer,
        T::Model: LinearModel,
    {
        data.check_features(features)?;
        log::debug!("Scoring {} features with {}", features.len(), self.name());

        let scores = match *self {
            Strategy::TTest => per_feature(data, features, welch_t_test),
            Strategy::KendallTau => per_feature(data, features, kendall_tau_b),
            Strategy::MinMax => per_feature(data, features, min_max_gap),
            Strategy::LinearWeight => {
                let model = trainer
                    .train(data, &data.all_rows(), features)
                    .map_err(|e| e.in_training(0, None))?;
                features
                    .iter()
                    .zip(model.weights())
                    .map(|(&feature, &w)| FeatureScore::with_aux(feature, w.abs(), w))
                    .collect()
            }
            Strategy::Elimination {
                target_count,
                shrink_ratio,
            } => {
                let result = RecursiveEliminationLoop::new(target_count, shrink_ratio)?.run(trainer, data, features)?;
                return Ok(StrategyScores {
                    scores: result.feature_scores(),
                    final_weights: Some(result.final_weights),
                });
            }
        };
        Ok(StrategyScores {
            scores,
            final_weights: None,
        })
    }
}

/// Scores produced by one strategy
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyScores {
    /// Feature scores, see [`Strategy::score`]
    pub scores: Vec<FeatureScore>,
    /// Every candidate of the last elimination round with its weight
    pub final_weights: Option<Vec<FeatureWeight>>,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Elimination {
                target_count,
                shrink_ratio,
            } => write!(f, "elimination(target={}, ratio={})", target_count, shrink_ratio),
            other => write!(f, "{}", other.name()),
        }
    }
}

impl FromStr for Strategy {
    type Err = RankerError;

    /// Parse a strategy name; `elimination` takes the default schedule
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "t_test" | "ttest" => Ok(Strategy::TTest),
            "kendall_tau" | "kendall" => Ok(Strategy::KendallTau),
            "min_max" | "minmax" => Ok(Strategy::MinMax),
            "linear_weight" | "weight" => Ok(Strategy::LinearWeight),
            "elimination" | "rfe" => Ok(Strategy::Elimination {
                target_count: DEFAULT_TARGET_COUNT,
                shrink_ratio: DEFAULT_SHRINK_RATIO,
            }),
            other => Err(RankerError::invalid_argument(
                "strategy",
                other,
                "unknown scoring strategy",
            )),
        }
    }
}

/// Feature values split by class, missing values dropped
struct ClassValues {
    negative: Vec<f64>,
    positive: Vec<f64>,
}

impl ClassValues {
    fn of(data: &BinaryDataset, feature: FeatureIndex) -> Self {
        let mut negative = Vec::new();
        let mut positive = Vec::new();
        for (sample, &value) in data.column(feature).iter().enumerate() {
            if value.is_nan() {
                continue;
            }
            if data.is_positive(sample) {
                positive.push(value);
            } else {
                negative.push(value);
            }
        }
        ClassValues { negative, positive }
    }
}

fn per_feature<F>(data: &BinaryDataset, features: &[FeatureIndex], statistic: F) -> Vec<FeatureScore>
where
    F: Fn(&BinaryDataset, FeatureIndex) -> FeatureScore + Sync,
{
    features.par_iter().map(|&feature| statistic(data, feature)).collect()
}

fn mean_and_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    (mean, variance)
}

/// Welch t statistic (positive minus negative mean) and two-sided p-value.
///
/// The p-value is NaN when either class has fewer than two values or both
/// classes have zero variance.
pub fn welch_t(negative: &[f64], positive: &[f64]) -> (f64, f64) {
    if negative.len() < 2 || positive.len() < 2 {
        return (f64::NAN, f64::NAN);
    }
    let (mean_neg, var_neg) = mean_and_variance(negative);
    let (mean_pos, var_pos) = mean_and_variance(positive);
    let se_neg = var_neg / negative.len() as f64;
    let se_pos = var_pos / positive.len() as f64;
    let se = (se_neg + se_pos).sqrt();
    if !(se > 0.0) {
        return (f64::NAN, f64::NAN);
    }

    let t = (mean_pos - mean_neg) / se;
    // Welch–Satterthwaite
    let df = (se_neg + se_pos).powi(2)
        / (se_neg.powi(2) / (negative.len() as f64 - 1.0) + se_pos.powi(2) / (positive.len() as f64 - 1.0));
    let p = match StudentsT::new(0.0, 1.0, df) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    };
    (t, p)
}

fn welch_t_test(data: &BinaryDataset, feature: FeatureIndex) -> FeatureScore {
    let values = ClassValues::of(data, feature);
    let (t, p) = welch_t(&values.negative, &values.positive);
    let p = if p.is_nan() { NAN_P_VALUE } else { p };
    FeatureScore::with_aux(feature, 1.0 - p, t)
}

/// Kendall tau-b between two paired samples; NaN when either is constant
pub fn kendall_tau(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    let (mut concordant, mut discordant) = (0i64, 0i64);
    let (mut ties_x, mut ties_y) = (0i64, 0i64);
    for i in 0..n {
        for j in (i + 1)..n {
            let dx = x[i] - x[j];
            let dy = y[i] - y[j];
            if dx == 0.0 {
                ties_x += 1;
            }
            if dy == 0.0 {
                ties_y += 1;
            }
            if dx == 0.0 || dy == 0.0 {
                continue;
            }
            if (dx > 0.0) == (dy > 0.0) {
                concordant += 1;
            } else {
                discordant += 1;
            }
        }
    }
    let pairs = (n * n.saturating_sub(1) / 2) as i64;
    let denominator = (((pairs - ties_x) * (pairs - ties_y)) as f64).sqrt();
    if denominator == 0.0 {
        return f64::NAN;
    }
    (concordant - discordant) as f64 / denominator
}

fn kendall_tau_b(data: &BinaryDataset, feature: FeatureIndex) -> FeatureScore {
    let (x, y): (Vec<f64>, Vec<f64>) = data
        .column(feature)
        .iter()
        .zip(data.targets().iter())
        .filter(|(x, _)| !x.is_nan())
        .map(|(&x, &y)| (x, y))
        .unzip();
    let tau = kendall_tau(&x, &y);
    let tau = if tau.is_nan() { 0.0 } else { tau };
    FeatureScore::with_aux(feature, tau.abs(), tau)
}

/// Signed separation between the classes.
///
/// Positive when the value ranges do not overlap; the returned direction is
/// `1.0` when positives lie above negatives, `-1.0` otherwise.
pub fn separation_gap(negative: &[f64], positive: &[f64]) -> (f64, f64) {
    if negative.is_empty() || positive.is_empty() {
        return (f64::NAN, f64::NAN);
    }
    let min = |v: &[f64]| v.iter().copied().fold(f64::INFINITY, f64::min);
    let max = |v: &[f64]| v.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let up = min(positive) - max(negative);
    let down = min(negative) - max(positive);
    if up >= down {
        (up, 1.0)
    } else {
        (down, -1.0)
    }
}

fn min_max_gap(data: &BinaryDataset, feature: FeatureIndex) -> FeatureScore {
    let values = ClassValues::of(data, feature);
    let (gap, direction) = separation_gap(&values.negative, &values.positive);
    FeatureScore::with_aux(feature, gap, direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::LogisticRegressionTrainer;
    use approx::assert_relative_eq;
    use ndarray::array;

    /// Feature 0 separates, feature 1 is constant, feature 2 is inverted and
    /// overlapping
    fn dataset() -> BinaryDataset {
        let features = array![
            [1.0, 3.0, 9.0],
            [2.0, 3.0, 7.0],
            [3.0, 3.0, 8.0],
            [7.0, 3.0, 2.0],
            [8.0, 3.0, 8.5],
            [9.0, 3.0, 1.0],
        ];
        let targets = array![0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
        BinaryDataset::new(features, targets, vec!["a".into(), "b".into(), "c".into()]).unwrap()
    }

    #[test]
    fn test_welch_t_matches_reference() {
        // equal variances and sizes: t = 6 / sqrt(2/3), df = 4
        let (t, p) = welch_t(&[1.0, 2.0, 3.0], &[7.0, 8.0, 9.0]);
        assert_relative_eq!(t, 6.0 / (2.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert!(p > 0.0 && p < 0.01);

        let (t, p) = welch_t(&[1.0], &[2.0, 3.0]);
        assert!(t.is_nan() && p.is_nan());
    }

    #[test]
    fn test_t_test_nan_p_value_is_worst() {
        let scores = Strategy::TTest
            .score(&LogisticRegressionTrainer::new(), &dataset(), &[0, 1])
            .unwrap();
        assert!(scores[0].score > 0.99);
        // constant feature: p undefined, counted as 1
        assert_eq!(scores[1].score, 0.0);
        assert_eq!(scores[1].feature, 1);
    }

    #[test]
    fn test_kendall_tau() {
        assert_relative_eq!(kendall_tau(&[1.0, 2.0, 3.0], &[0.0, 0.0, 1.0]), 2.0 / 6.0f64.sqrt());
        assert!(kendall_tau(&[1.0, 1.0], &[0.0, 1.0]).is_nan());

        let scores = Strategy::KendallTau
            .score(&LogisticRegressionTrainer::new(), &dataset(), &[0, 2])
            .unwrap();
        // perfect separation: 9 concordant pairs, 6 tied in y
        assert_relative_eq!(scores[0].aux.unwrap(), 9.0 / (15.0f64 * 9.0).sqrt());
        assert!(scores[1].aux.unwrap() < 0.0);
        assert_relative_eq!(scores[1].score, -scores[1].aux.unwrap());
    }

    #[test]
    fn test_separation_gap() {
        assert_eq!(separation_gap(&[1.0, 2.0, 3.0], &[7.0, 9.0]), (4.0, 1.0));
        assert_eq!(separation_gap(&[7.0, 9.0], &[1.0, 3.0]), (4.0, -1.0));
        assert_eq!(separation_gap(&[1.0, 5.0], &[3.0, 9.0]), (-2.0, 1.0));

        let scores = Strategy::MinMax
            .score(&LogisticRegressionTrainer::new(), &dataset(), &[0, 1, 2])
            .unwrap();
        assert_eq!(scores[0].score, 4.0);
        assert_eq!(scores[1].score, 0.0);
        assert!(scores[2].score < 0.0);
    }

    #[test]
    fn test_linear_weight_scores_every_feature() {
        let scores = Strategy::LinearWeight
            .score(&LogisticRegressionTrainer::new(), &dataset(), &[0, 2])
            .unwrap();
        assert_eq!(scores.len(), 2);
        assert!(scores[0].aux.unwrap() > 0.0);
        assert_relative_eq!(scores[0].score, scores[0].aux.unwrap().abs());
    }

    #[test]
    fn test_elimination_returns_survivors() {
        let strategy = Strategy::Elimination {
            target_count: 1,
            shrink_ratio: 0.5,
        };
        let scores = strategy
            .score(&LogisticRegressionTrainer::new(), &dataset(), &[0, 1, 2])
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].feature, 0);

        let detailed = strategy
            .score_with_weights(&LogisticRegressionTrainer::new(), &dataset(), &[0, 1, 2])
            .unwrap();
        assert_eq!(detailed.scores, scores);
        let weights = detailed.final_weights.unwrap();
        assert_eq!(weights.last().unwrap().feature, 2);
        assert!(weights.iter().any(|w| w.feature == 0));
    }

    #[test]
    fn test_statistical_strategies_have_no_weights() {
        let detailed = Strategy::TTest
            .score_with_weights(&LogisticRegressionTrainer::new(), &dataset(), &[0, 1])
            .unwrap();
        assert_eq!(detailed.scores.len(), 2);
        assert!(detailed.final_weights.is_none());
    }

    #[test]
    fn test_strategy_serde_names() {
        let strategies: Vec<Strategy> = serde_json::from_str(
            r#"[{"type": "t_test"}, {"type": "elimination", "target_count": 5, "shrink_ratio": 0.5}]"#,
        )
        .unwrap();
        assert_eq!(strategies[0], Strategy::TTest);
        assert_eq!(strategies[1].name(), "elimination");
        assert_eq!(strategies[1].to_string(), "elimination(target=5, ratio=0.5)");
        assert_eq!(strategies[1].label(), "elimination_t5_r0.5");
        assert_eq!(strategies[0].label(), "t_test");

        let defaulted: Strategy = serde_json::from_str(r#"{"type": "elimination"}"#).unwrap();
        assert_eq!(defaulted, "rfe".parse::<Strategy>().unwrap());
    }

    #[test]
    fn test_strategy_from_name() {
        assert_eq!("TTest".parse::<Strategy>().unwrap(), Strategy::TTest);
        assert_eq!("kendall".parse::<Strategy>().unwrap(), Strategy::KendallTau);
        assert!(matches!("rfe".parse::<Strategy>().unwrap(), Strategy::Elimination { .. }));
        assert!("svm".parse::<Strategy>().is_err());
    }
}
