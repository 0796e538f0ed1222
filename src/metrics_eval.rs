//! Performance measures for binary predictions.
//!
//! Every function returns the raw value, NaN when the measure is undefined for
//! the given predictions (no positives for recall, a single class for AUC and
//! so on). Callers decide how undefined values are normalised.

use crate::core::types::{MeasureType, Prediction};
use serde::{Deserialize, Serialize};

/// Confusion matrix of thresholded predictions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    /// True positives
    pub tp: usize,
    /// False positives
    pub fp: usize,
    /// True negatives
    pub tn: usize,
    /// False negatives
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Count outcomes of predictions against true classes
    pub fn from_predictions(predictions: &[Prediction], positives: &[bool]) -> Self {
        let mut matrix = ConfusionMatrix::default();
        for (prediction, &actual) in predictions.iter().zip(positives) {
            match (prediction.is_positive(), actual) {
                (true, true) => matrix.tp += 1,
                (true, false) => matrix.fp += 1,
                (false, false) => matrix.tn += 1,
                (false, true) => matrix.fn_ += 1,
            }
        }
        matrix
    }

    /// Total number of predictions
    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Fraction of positive predictions that are correct
    pub fn precision(&self) -> f64 {
        ratio(self.tp, self.tp + self.fp)
    }

    /// Fraction of positives predicted positive
    pub fn recall(&self) -> f64 {
        ratio(self.tp, self.tp + self.fn_)
    }

    /// Fraction of negatives predicted negative
    pub fn specificity(&self) -> f64 {
        ratio(self.tn, self.tn + self.fp)
    }

    /// Harmonic mean of precision and recall
    pub fn f_measure(&self) -> f64 {
        ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_)
    }

    /// Matthews correlation coefficient
    pub fn mcc(&self) -> f64 {
        let (tp, fp, tn, fn_) = (self.tp as f64, self.fp as f64, self.tn as f64, self.fn_ as f64);
        let denominator = ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();
        if denominator == 0.0 {
            return f64::NAN;
        }
        (tp * tn - fp * fn_) / denominator
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        f64::NAN
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Area under the ROC curve from decision values.
///
/// Computed as the Mann-Whitney statistic with tied decision values sharing
/// their average rank. NaN when either class is absent, a decision value is
/// NaN or the slices differ in length.
pub fn auc(decision_values: &[f64], positives: &[bool]) -> f64 {
    if decision_values.len() != positives.len() || decision_values.iter().any(|v| v.is_nan()) {
        return f64::NAN;
    }
    let total_pos = positives.iter().filter(|&&p| p).count();
    let total_neg = positives.len() - total_pos;
    if total_pos == 0 || total_neg == 0 {
        return f64::NAN;
    }

    let mut order: Vec<usize> = (0..decision_values.len()).collect();
    order.sort_by(|&a, &b| decision_values[a].total_cmp(&decision_values[b]));

    let mut positive_rank_sum = 0.0;
    let mut start = 0;
    while start < order.len() {
        let mut end = start + 1;
        while end < order.len() && decision_values[order[end]] == decision_values[order[start]] {
            end += 1;
        }
        // ranks are 1-based; the tie group [start, end) shares the mean rank
        let average_rank = (start + end + 1) as f64 / 2.0;
        let tied_positives = order[start..end].iter().filter(|&&i| positives[i]).count();
        positive_rank_sum += average_rank * tied_positives as f64;
        start = end;
    }

    let pos = total_pos as f64;
    let neg = total_neg as f64;
    (positive_rank_sum - pos * (pos + 1.0) / 2.0) / (pos * neg)
}

/// Root mean squared error of probabilities against 0/1 targets
pub fn rmse(probabilities: &[f64], positives: &[bool]) -> f64 {
    if probabilities.is_empty() || probabilities.len() != positives.len() {
        return f64::NAN;
    }
    let sum_squared: f64 = probabilities
        .iter()
        .zip(positives)
        .map(|(&p, &actual)| {
            let target = if actual { 1.0 } else { 0.0 };
            (p - target) * (p - target)
        })
        .sum();
    (sum_squared / probabilities.len() as f64).sqrt()
}

/// Raw value of one measure for a set of predictions
pub fn compute_measure(measure: MeasureType, predictions: &[Prediction], positives: &[bool]) -> f64 {
    let matrix = || ConfusionMatrix::from_predictions(predictions, positives);
    match measure {
        MeasureType::Auc => {
            let decisions: Vec<f64> = predictions.iter().map(|p| p.decision_value).collect();
            auc(&decisions, positives)
        }
        MeasureType::Rmse => {
            let probabilities: Vec<f64> = predictions.iter().map(|p| p.probability).collect();
            rmse(&probabilities, positives)
        }
        MeasureType::Accuracy => matrix().accuracy(),
        MeasureType::FMeasure => matrix().f_measure(),
        MeasureType::Precision => matrix().precision(),
        MeasureType::Recall | MeasureType::Sensitivity => matrix().recall(),
        MeasureType::Specificity => matrix().specificity(),
        MeasureType::Mcc => matrix().mcc(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn predictions(probabilities: &[f64]) -> Vec<Prediction> {
        probabilities
            .iter()
            .map(|&p| Prediction::new((p / (1.0 - p)).ln(), p))
            .collect()
    }

    #[test]
    fn test_confusion_matrix_rates() {
        let preds = predictions(&[0.9, 0.8, 0.3, 0.2, 0.6]);
        let actual = [true, false, true, false, true];
        let matrix = ConfusionMatrix::from_predictions(&preds, &actual);
        assert_eq!(matrix, ConfusionMatrix { tp: 2, fp: 1, tn: 1, fn_: 1 });

        assert_relative_eq!(matrix.accuracy(), 0.6);
        assert_relative_eq!(matrix.precision(), 2.0 / 3.0);
        assert_relative_eq!(matrix.recall(), 2.0 / 3.0);
        assert_relative_eq!(matrix.specificity(), 0.5);
        assert_relative_eq!(matrix.f_measure(), 2.0 / 3.0);
        assert_relative_eq!(matrix.mcc(), 1.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_undefined_rates_are_nan() {
        let preds = predictions(&[0.1, 0.2]);
        let matrix = ConfusionMatrix::from_predictions(&preds, &[false, false]);
        assert!(matrix.precision().is_nan());
        assert!(matrix.recall().is_nan());
        assert!(matrix.mcc().is_nan());
        assert_relative_eq!(matrix.accuracy(), 1.0);
    }

    #[test]
    fn test_auc_perfect_and_inverted() {
        assert_relative_eq!(auc(&[0.1, 0.4, 0.35, 0.8], &[false, false, true, true]), 0.75);
        assert_relative_eq!(auc(&[1.0, 2.0, 3.0], &[false, true, true]), 1.0);
        assert_relative_eq!(auc(&[3.0, 2.0, 1.0], &[false, true, true]), 0.0);
    }

    #[test]
    fn test_auc_ties_count_half() {
        assert_relative_eq!(auc(&[0.5, 0.5], &[false, true]), 0.5);
        assert_relative_eq!(auc(&[0.2, 0.5, 0.5], &[false, false, true]), 0.75);
    }

    #[test]
    fn test_auc_single_class_is_nan() {
        assert!(auc(&[0.1, 0.9], &[true, true]).is_nan());
        assert!(auc(&[0.3], &[false]).is_nan());
    }

    #[test]
    fn test_auc_rejects_nan_and_length_mismatch() {
        assert!(auc(&[0.1, f64::NAN, 0.9, 0.4], &[false, false, true, true]).is_nan());
        assert!(auc(&[0.1, 0.9], &[false, true, true]).is_nan());
        assert!(auc(&[0.1, 0.9, 0.5], &[false, true]).is_nan());
    }

    #[test]
    fn test_auc_orders_infinite_values() {
        let values = [f64::NEG_INFINITY, 0.0, f64::INFINITY, f64::INFINITY];
        assert_relative_eq!(auc(&values, &[false, false, true, true]), 1.0);
        // the two infinities tie and share a rank
        assert_relative_eq!(auc(&values, &[false, true, false, true]), 0.625);
    }

    #[test]
    fn test_nan_decision_value_makes_auc_undefined() {
        let preds = vec![
            Prediction::new(f64::NAN, 0.5),
            Prediction::new(1.0, 0.7),
            Prediction::new(-1.0, 0.3),
        ];
        let value = compute_measure(MeasureType::Auc, &preds, &[true, true, false]);
        assert!(value.is_nan());
    }

    #[test]
    fn test_rmse() {
        assert_relative_eq!(rmse(&[1.0, 0.0], &[true, false]), 0.0);
        assert_relative_eq!(rmse(&[0.5, 0.5], &[true, false]), 0.5);
        assert!(rmse(&[], &[]).is_nan());
        assert!(rmse(&[0.5], &[true, false]).is_nan());
    }

    #[test]
    fn test_sensitivity_is_recall() {
        let preds = predictions(&[0.9, 0.2, 0.7]);
        let actual = [true, true, false];
        assert_eq!(
            compute_measure(MeasureType::Sensitivity, &preds, &actual),
            compute_measure(MeasureType::Recall, &preds, &actual)
        );
    }
}
