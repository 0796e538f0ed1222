//! L2-regularised logistic regression fitted by full-batch gradient descent.

use crate::core::constants::*;
use crate::core::error::{RankerError, Result};
use crate::core::traits::{LinearModel, Model, Trainer};
use crate::core::types::{FeatureIndex, Prediction, SampleIndex};
use crate::dataset::BinaryDataset;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Logistic regression trainer.
///
/// Starts from zero weights and runs `epochs` full-batch gradient steps, so
/// the same rows and features always give the same model. Missing values
/// are imputed with the training mean of their column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticRegressionTrainer {
    /// Gradient step size
    pub learning_rate: f64,
    /// Number of full-batch steps
    pub epochs: usize,
    /// L2 penalty on the weights (the bias is not penalised)
    pub l2: f64,
    /// Fit on z-scored features and map the weights back to raw scale
    pub standardize: bool,
}

impl Default for LogisticRegressionTrainer {
    fn default() -> Self {
        LogisticRegressionTrainer {
            learning_rate: DEFAULT_LEARNING_RATE,
            epochs: DEFAULT_EPOCHS,
            l2: DEFAULT_L2,
            standardize: true,
        }
    }
}

impl LogisticRegressionTrainer {
    /// Create a trainer with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set gradient step size
    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    /// Set number of gradient steps
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Set L2 penalty
    pub fn with_l2(mut self, l2: f64) -> Self {
        self.l2 = l2;
        self
    }

    /// Enable or disable standardisation
    pub fn with_standardize(mut self, standardize: bool) -> Self {
        self.standardize = standardize;
        self
    }

    /// Check trainer parameters
    pub fn validate(&self) -> Result<()> {
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(RankerError::invalid_argument(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be a positive number",
            ));
        }
        if self.epochs == 0 {
            return Err(RankerError::invalid_argument("epochs", "0", "must be at least 1"));
        }
        if !(self.l2.is_finite() && self.l2 >= 0.0) {
            return Err(RankerError::invalid_argument(
                "l2",
                self.l2.to_string(),
                "must be a non-negative number",
            ));
        }
        Ok(())
    }

    fn check_inputs(&self, data: &BinaryDataset, rows: &[SampleIndex], features: &[FeatureIndex]) -> Result<()> {
        self.validate()?;
        if features.is_empty() {
            return Err(RankerError::training_failure(0, None, "no features to train on"));
        }
        data.check_features(features)?;
        if let Some(&bad) = rows.iter().find(|&&r| r >= data.num_samples()) {
            return Err(RankerError::invalid_argument(
                "rows",
                bad.to_string(),
                format!("sample index out of range for {} samples", data.num_samples()),
            ));
        }
        let positives = rows.iter().filter(|&&r| data.is_positive(r)).count();
        if positives == 0 || positives == rows.len() {
            return Err(RankerError::training_failure(
                0,
                None,
                format!(
                    "training rows contain a single class ({} positive of {})",
                    positives,
                    rows.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Per-column statistics of the training matrix
struct ColumnStats {
    fill: Array1<f64>,
    center: Array1<f64>,
    scale: Array1<f64>,
}

impl ColumnStats {
    fn compute(x: &Array2<f64>, standardize: bool) -> Self {
        let ncols = x.ncols();
        let mut fill = Array1::zeros(ncols);
        let mut center = Array1::zeros(ncols);
        let mut scale = Array1::ones(ncols);

        for (j, column) in x.axis_iter(Axis(1)).enumerate() {
            let observed: Vec<f64> = column.iter().copied().filter(|v| !v.is_nan()).collect();
            if observed.is_empty() {
                continue;
            }
            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
            fill[j] = mean;
            if standardize {
                // imputed cells sit at the mean and add nothing to the variance
                let variance =
                    observed.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / x.nrows() as f64;
                center[j] = mean;
                if variance > 0.0 {
                    scale[j] = variance.sqrt();
                }
            }
        }
        ColumnStats { fill, center, scale }
    }
}

impl Trainer for LogisticRegressionTrainer {
    type Model = LogisticModel;

    fn train(&self, data: &BinaryDataset, rows: &[SampleIndex], features: &[FeatureIndex]) -> Result<LogisticModel> {
        self.check_inputs(data, rows, features)?;

        let mut x = data.features().select(Axis(0), rows).select(Axis(1), features);
        let y = data.targets().select(Axis(0), rows);
        let stats = ColumnStats::compute(&x, self.standardize);

        for mut row in x.axis_iter_mut(Axis(0)) {
            for (j, value) in row.iter_mut().enumerate() {
                if value.is_nan() {
                    *value = stats.fill[j];
                }
                *value = (*value - stats.center[j]) / stats.scale[j];
            }
        }

        let n = rows.len() as f64;
        let mut weights = Array1::<f64>::zeros(features.len());
        let mut bias = 0.0;
        for _ in 0..self.epochs {
            let logits = x.dot(&weights) + bias;
            let residual = logits.mapv(sigmoid) - &y;
            let gradient = x.t().dot(&residual) / n + &weights * self.l2;
            weights = weights - gradient * self.learning_rate;
            bias -= self.learning_rate * residual.sum() / n;
        }

        // back to raw feature scale: w_raw = w / s, b_raw = b - Σ w·c / s
        let raw_weights = &weights / &stats.scale;
        let raw_bias = bias - raw_weights.dot(&stats.center);

        if raw_weights.iter().any(|w| !w.is_finite()) || !raw_bias.is_finite() {
            return Err(RankerError::training_failure(
                0,
                None,
                "gradient descent diverged; lower the learning rate",
            ));
        }

        log::debug!(
            "{}: trained on {} rows × {} features, bias {:.4}",
            self.name(),
            rows.len(),
            features.len(),
            raw_bias
        );

        Ok(LogisticModel {
            features: features.to_vec(),
            weights: raw_weights.to_vec(),
            bias: raw_bias,
            fill: stats.fill.to_vec(),
        })
    }

    fn name(&self) -> &str {
        "logistic_regression"
    }
}

/// Trained logistic regression model on raw feature scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    features: Vec<FeatureIndex>,
    weights: Vec<f64>,
    bias: f64,
    fill: Vec<f64>,
}

impl LogisticModel {
    /// Decision function value for a full dataset row
    pub fn decision_value(&self, sample: ArrayView1<'_, f64>) -> f64 {
        self.features
            .iter()
            .zip(&self.weights)
            .zip(&self.fill)
            .map(|((&feature, &w), &fill)| {
                let value = sample[feature];
                w * if value.is_nan() { fill } else { value }
            })
            .sum::<f64>()
            + self.bias
    }
}

impl Model for LogisticModel {
    fn predict(&self, sample: ArrayView1<'_, f64>) -> Prediction {
        let decision = self.decision_value(sample);
        Prediction::new(decision, sigmoid(decision))
    }
}

impl LinearModel for LogisticModel {
    fn weights(&self) -> &[f64] {
        &self.weights
    }

    fn bias(&self) -> f64 {
        self.bias
    }

    fn features(&self) -> &[FeatureIndex] {
        &self.features
    }
}
