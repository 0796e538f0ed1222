//! Core data types for the probeset ranker.

use crate::core::error::{RankerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Column index of a feature (probeset) in the dataset.
pub type FeatureIndex = usize;

/// Row index of a sample in the dataset.
pub type SampleIndex = usize;

/// A feature together with the score it was ranked by.
///
/// `aux` is the auxiliary statistic reported next to the score, for example
/// the t statistic behind a p-value derived score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    /// Column index of the feature
    pub feature: FeatureIndex,
    /// Ranking key, higher is better
    pub score: f64,
    /// Auxiliary statistic for reporting
    pub aux: Option<f64>,
}

impl FeatureScore {
    /// Create a score without an auxiliary statistic
    pub fn new(feature: FeatureIndex, score: f64) -> Self {
        FeatureScore {
            feature,
            score,
            aux: None,
        }
    }

    /// Create a score carrying an auxiliary statistic
    pub fn with_aux(feature: FeatureIndex, score: f64, aux: f64) -> Self {
        FeatureScore {
            feature,
            score,
            aux: Some(aux),
        }
    }
}

/// Output of a trained model for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Raw decision function value
    pub decision_value: f64,
    /// Estimated probability of the positive class
    pub probability: f64,
}

impl Prediction {
    /// Create a new prediction
    pub fn new(decision_value: f64, probability: f64) -> Self {
        Prediction {
            decision_value,
            probability,
        }
    }

    /// Predicted class, positive when the probability reaches the threshold
    pub fn is_positive(&self) -> bool {
        self.probability >= crate::core::constants::PROBABILITY_THRESHOLD
    }
}

/// Named performance measures computed by cross-validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureType {
    /// Area under the ROC curve
    Auc,
    /// Accuracy
    Accuracy,
    /// F-measure (F1)
    FMeasure,
    /// Precision (positive predictive value)
    Precision,
    /// Recall
    Recall,
    /// Sensitivity (true positive rate)
    Sensitivity,
    /// Specificity (true negative rate)
    Specificity,
    /// Root mean squared error of the probability estimates
    Rmse,
    /// Matthews correlation coefficient
    Mcc,
}

impl MeasureType {
    /// All supported measures in canonical order
    pub const ALL: [MeasureType; 9] = [
        MeasureType::Auc,
        MeasureType::Accuracy,
        MeasureType::FMeasure,
        MeasureType::Precision,
        MeasureType::Recall,
        MeasureType::Sensitivity,
        MeasureType::Specificity,
        MeasureType::Rmse,
        MeasureType::Mcc,
    ];

    /// Short name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            MeasureType::Auc => "auc",
            MeasureType::Accuracy => "acc",
            MeasureType::FMeasure => "f",
            MeasureType::Precision => "precision",
            MeasureType::Recall => "recall",
            MeasureType::Sensitivity => "sensitivity",
            MeasureType::Specificity => "specificity",
            MeasureType::Rmse => "rmse",
            MeasureType::Mcc => "mcc",
        }
    }

    /// Value substituted when the measure is undefined for a fold.
    ///
    /// AUC falls back to a random ranking, RMSE to the worst error of a
    /// probability, every rate to zero.
    pub fn nan_sentinel(&self) -> f64 {
        match self {
            MeasureType::Auc => 0.5,
            MeasureType::Rmse => 1.0,
            _ => 0.0,
        }
    }

    /// Parse a list of measure names, keeping request order
    pub fn parse_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<MeasureType>> {
        if names.is_empty() {
            return Err(RankerError::invalid_argument(
                "measures",
                "[]",
                "at least one measure is required",
            ));
        }
        let mut parsed = Vec::with_capacity(names.len());
        for name in names {
            let measure: MeasureType = name.as_ref().parse()?;
            if parsed.contains(&measure) {
                return Err(RankerError::invalid_argument(
                    "measures",
                    name.as_ref(),
                    "measure requested twice",
                ));
            }
            parsed.push(measure);
        }
        Ok(parsed)
    }
}

impl fmt::Display for MeasureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for MeasureType {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auc" | "roc_auc" => Ok(MeasureType::Auc),
            "acc" | "accuracy" => Ok(MeasureType::Accuracy),
            "f" | "f1" | "fmeasure" | "f_measure" => Ok(MeasureType::FMeasure),
            "precision" | "ppv" => Ok(MeasureType::Precision),
            "recall" => Ok(MeasureType::Recall),
            "sensitivity" | "tpr" => Ok(MeasureType::Sensitivity),
            "specificity" | "tnr" => Ok(MeasureType::Specificity),
            "rmse" => Ok(MeasureType::Rmse),
            "mcc" | "matthews" => Ok(MeasureType::Mcc),
            other => Err(RankerError::invalid_argument(
                "measure",
                other,
                "unknown performance measure",
            )),
        }
    }
}

/// Verbosity level mapped onto the `log` filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerbosityLevel {
    /// Only errors
    Silent,
    /// Warnings and errors
    Warning,
    /// General progress information
    Info,
    /// Per-fold and per-round detail
    Debug,
}

impl Default for VerbosityLevel {
    fn default() -> Self {
        VerbosityLevel::Info
    }
}

impl VerbosityLevel {
    /// Filter string understood by `env_logger`
    pub fn as_filter(&self) -> &'static str {
        match self {
            VerbosityLevel::Silent => "error",
            VerbosityLevel::Warning => "warn",
            VerbosityLevel::Info => "info",
            VerbosityLevel::Debug => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_parsing() {
        assert_eq!("AUC".parse::<MeasureType>().unwrap(), MeasureType::Auc);
        assert_eq!("accuracy".parse::<MeasureType>().unwrap(), MeasureType::Accuracy);
        assert_eq!(" f ".parse::<MeasureType>().unwrap(), MeasureType::FMeasure);
        assert!("kappa".parse::<MeasureType>().is_err());
    }

    #[test]
    fn test_measure_list_keeps_order() {
        let parsed = MeasureType::parse_list(&["mcc", "auc", "acc"]).unwrap();
        assert_eq!(parsed, vec![MeasureType::Mcc, MeasureType::Auc, MeasureType::Accuracy]);

        assert!(MeasureType::parse_list::<&str>(&[]).is_err());
        assert!(MeasureType::parse_list(&["auc", "AUC"]).is_err());
    }

    #[test]
    fn test_measure_names_round_trip() {
        for measure in MeasureType::ALL {
            assert_eq!(measure.name().parse::<MeasureType>().unwrap(), measure);
        }
    }

    #[test]
    fn test_prediction_threshold() {
        assert!(Prediction::new(0.0, 0.5).is_positive());
        assert!(!Prediction::new(-1.0, 0.2).is_positive());
    }
}
