//! Binary classification tasks defined by two groups of sample labels.

use crate::core::error::{RankerError, Result};
use crate::dataset::dataset::{BinaryDataset, Dataset};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Negative (group 0) and positive (group 1) label sets of one task.
///
/// For example `normal` versus `tumor`, or `{stage_1, stage_2}` versus
/// `{stage_3, stage_4}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTask {
    /// Task name used in reports
    pub name: String,
    /// Labels of the negative group
    pub negative: Vec<String>,
    /// Labels of the positive group
    pub positive: Vec<String>,
}

impl ClassificationTask {
    /// Create and validate a task
    pub fn new<S: Into<String>>(name: S, negative: Vec<String>, positive: Vec<String>) -> Result<Self> {
        let task = ClassificationTask {
            name: name.into(),
            negative,
            positive,
        };
        task.validate()?;
        Ok(task)
    }

    /// Both groups must be non-empty and disjoint
    pub fn validate(&self) -> Result<()> {
        if self.negative.is_empty() || self.positive.is_empty() {
            return Err(RankerError::invalid_argument(
                "task",
                &self.name,
                "both label groups must be non-empty",
            ));
        }
        if let Some(shared) = self.negative.iter().find(|l| self.positive.contains(l)) {
            return Err(RankerError::invalid_argument(
                "task",
                &self.name,
                format!("label '{}' appears in both groups", shared),
            ));
        }
        Ok(())
    }

    /// Class of a sample label: `false` negative, `true` positive
    pub fn class_of(&self, label: &str) -> Result<bool> {
        let negative = self.negative.iter().any(|l| l == label);
        let positive = self.positive.iter().any(|l| l == label);
        match (negative, positive) {
            (true, false) => Ok(false),
            (false, true) => Ok(true),
            (true, true) => Err(RankerError::invalid_argument(
                "label",
                label,
                format!("belongs to both groups of task '{}'", self.name),
            )),
            (false, false) => Err(RankerError::invalid_argument(
                "label",
                label,
                format!("belongs to no group of task '{}'", self.name),
            )),
        }
    }

    /// Map every sample label to a 0/1 target
    pub fn bind(&self, dataset: &Dataset) -> Result<BinaryDataset> {
        self.validate()?;
        let targets = dataset
            .sample_labels()
            .iter()
            .map(|label| self.class_of(label).map(|positive| if positive { 1.0 } else { 0.0 }))
            .collect::<Result<Vec<f64>>>()?;

        let data = BinaryDataset::new(
            dataset.features().to_owned(),
            Array1::from_vec(targets),
            dataset.feature_names().to_vec(),
        )?;

        let (negatives, positives) = data.class_counts();
        log::info!(
            "Task '{}': {} negative and {} positive samples, {} features",
            self.name,
            negatives,
            positives,
            data.num_features()
        );
        Ok(data)
    }
}
