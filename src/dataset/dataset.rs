//! Expression matrix structures.
//!
//! A [`Dataset`] is the table as loaded: one string label and one row of
//! measurements per sample, one named column per probeset. Binding it to a
//! [`ClassificationTask`](crate::dataset::ClassificationTask) yields a
//! [`BinaryDataset`], the form every trainer and strategy consumes.

use crate::core::error::{RankerError, Result};
use crate::core::types::*;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::collections::HashMap;

/// Labeled expression matrix (num_samples × num_features)
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Class label of each sample
    sample_labels: Vec<String>,
    /// Feature matrix
    features: Array2<f64>,
    /// Probeset identifier of each column
    feature_names: Vec<String>,
    /// Lookup from identifier to column
    name_index: HashMap<String, FeatureIndex>,
}

impl Dataset {
    /// Create a dataset from labels, a feature matrix and column names
    pub fn new(
        sample_labels: Vec<String>,
        features: Array2<f64>,
        feature_names: Vec<String>,
    ) -> Result<Self> {
        if sample_labels.len() != features.nrows() {
            return Err(RankerError::dataset(format!(
                "{} labels for {} feature rows",
                sample_labels.len(),
                features.nrows()
            )));
        }
        if feature_names.len() != features.ncols() {
            return Err(RankerError::dataset(format!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                features.ncols()
            )));
        }

        let mut name_index = HashMap::with_capacity(feature_names.len());
        for (index, name) in feature_names.iter().enumerate() {
            if name_index.insert(name.clone(), index).is_some() {
                return Err(RankerError::dataset(format!(
                    "duplicate feature name '{}'",
                    name
                )));
            }
        }

        Ok(Dataset {
            sample_labels,
            features,
            feature_names,
            name_index,
        })
    }

    /// Number of samples
    pub fn num_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of features
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Feature matrix
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Sample labels in row order
    pub fn sample_labels(&self) -> &[String] {
        &self.sample_labels
    }

    /// Feature identifiers in column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Column of a feature identifier
    pub fn feature_index(&self, name: &str) -> Option<FeatureIndex> {
        self.name_index.get(name).copied()
    }

    /// Map identifiers to columns, in the given order.
    ///
    /// Unknown identifiers are skipped with a warning and repeated ones are
    /// kept once, so a gene list never fails on a probeset missing from the
    /// platform.
    pub fn resolve_features<S: AsRef<str>>(&self, names: &[S]) -> Vec<FeatureIndex> {
        let mut resolved = Vec::with_capacity(names.len());
        let mut skipped = 0usize;
        for name in names {
            match self.feature_index(name.as_ref()) {
                Some(index) if !resolved.contains(&index) => resolved.push(index),
                Some(_) => {}
                None => {
                    skipped += 1;
                    log::debug!("feature '{}' not present in dataset", name.as_ref());
                }
            }
        }
        if skipped > 0 {
            log::warn!(
                "{} of {} requested features are not present in the dataset",
                skipped,
                names.len()
            );
        }
        resolved
    }
}

/// Feature matrix with 0/1 targets for one classification task
#[derive(Debug, Clone)]
pub struct BinaryDataset {
    /// Feature matrix
    features: Array2<f64>,
    /// 1.0 for the positive group, 0.0 for the negative group
    targets: Array1<f64>,
    /// Probeset identifier of each column
    feature_names: Vec<String>,
}

impl BinaryDataset {
    /// Create a binary dataset; targets must be exactly 0.0 or 1.0
    pub fn new(features: Array2<f64>, targets: Array1<f64>, feature_names: Vec<String>) -> Result<Self> {
        if targets.len() != features.nrows() {
            return Err(RankerError::dataset(format!(
                "{} targets for {} feature rows",
                targets.len(),
                features.nrows()
            )));
        }
        if feature_names.len() != features.ncols() {
            return Err(RankerError::dataset(format!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                features.ncols()
            )));
        }
        if let Some((row, value)) = targets
            .iter()
            .enumerate()
            .find(|(_, &t)| t != 0.0 && t != 1.0)
        {
            return Err(RankerError::dataset(format!(
                "target of sample {} is {}, expected 0 or 1",
                row, value
            )));
        }

        Ok(BinaryDataset {
            features,
            targets,
            feature_names,
        })
    }

    /// Number of samples
    pub fn num_samples(&self) -> usize {
        self.features.nrows()
    }

    /// Number of features
    pub fn num_features(&self) -> usize {
        self.features.ncols()
    }

    /// Feature matrix
    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    /// Full feature row of a sample
    pub fn row(&self, sample: SampleIndex) -> ArrayView1<'_, f64> {
        self.features.row(sample)
    }

    /// One feature across all samples
    pub fn column(&self, feature: FeatureIndex) -> ArrayView1<'_, f64> {
        self.features.column(feature)
    }

    /// Targets in row order
    pub fn targets(&self) -> ArrayView1<'_, f64> {
        self.targets.view()
    }

    /// Whether a sample belongs to the positive group
    pub fn is_positive(&self, sample: SampleIndex) -> bool {
        self.targets[sample] > 0.5
    }

    /// Class id of each sample (0 negative, 1 positive)
    pub fn classes(&self) -> Vec<usize> {
        self.targets.iter().map(|&t| if t > 0.5 { 1 } else { 0 }).collect()
    }

    /// Number of (negative, positive) samples
    pub fn class_counts(&self) -> (usize, usize) {
        let positives = self.targets.iter().filter(|&&t| t > 0.5).count();
        (self.num_samples() - positives, positives)
    }

    /// Every sample index
    pub fn all_rows(&self) -> Vec<SampleIndex> {
        (0..self.num_samples()).collect()
    }

    /// Every feature index
    pub fn all_features(&self) -> Vec<FeatureIndex> {
        (0..self.num_features()).collect()
    }

    /// Feature identifiers in column order
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Identifier of one column
    pub fn feature_name(&self, feature: FeatureIndex) -> &str {
        &self.feature_names[feature]
    }

    /// Check that every index addresses a column, exactly once
    pub fn check_features(&self, features: &[FeatureIndex]) -> Result<()> {
        let mut seen = vec![false; self.num_features()];
        for &feature in features {
            if feature >= self.num_features() {
                return Err(RankerError::invalid_argument(
                    "feature",
                    feature.to_string(),
                    format!("dataset has {} features", self.num_features()),
                ));
            }
            if std::mem::replace(&mut seen[feature], true) {
                return Err(RankerError::invalid_argument(
                    "feature",
                    feature.to_string(),
                    "feature listed twice",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("probe_{}", i)).collect()
    }

    #[test]
    fn test_dataset_dimension_checks() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        assert!(Dataset::new(vec!["a".into()], features.clone(), names(2)).is_err());
        assert!(Dataset::new(vec!["a".into(), "b".into()], features.clone(), names(3)).is_err());

        let dup = vec!["x".to_string(), "x".to_string()];
        assert!(Dataset::new(vec!["a".into(), "b".into()], features.clone(), dup).is_err());

        let dataset = Dataset::new(vec!["a".into(), "b".into()], features, names(2)).unwrap();
        assert_eq!(dataset.num_samples(), 2);
        assert_eq!(dataset.num_features(), 2);
        assert_eq!(dataset.feature_index("probe_1"), Some(1));
    }

    #[test]
    fn test_resolve_features_skips_unknown_and_duplicates() {
        let features = Array2::zeros((2, 3));
        let dataset = Dataset::new(vec!["a".into(), "b".into()], features, names(3)).unwrap();
        let resolved = dataset.resolve_features(&["probe_2", "missing", "probe_0", "probe_2"]);
        assert_eq!(resolved, vec![2, 0]);
    }

    #[test]
    fn test_binary_dataset_rejects_non_binary_targets() {
        let features = Array2::zeros((2, 1));
        assert!(BinaryDataset::new(features.clone(), array![0.0, 2.0], names(1)).is_err());

        let data = BinaryDataset::new(features, array![0.0, 1.0], names(1)).unwrap();
        assert_eq!(data.class_counts(), (1, 1));
        assert_eq!(data.classes(), vec![0, 1]);
        assert!(data.is_positive(1));
    }

    #[test]
    fn test_check_features() {
        let data = BinaryDataset::new(Array2::zeros((2, 3)), array![0.0, 1.0], names(3)).unwrap();
        assert!(data.check_features(&[0, 2]).is_ok());
        assert!(data.check_features(&[0, 3]).is_err());
        assert!(data.check_features(&[1, 1]).is_err());
    }
}
