//! Trait seams between the core algorithms and their collaborators.
//!
//! The core never trains a classifier itself. Cross-validation and recursive
//! elimination consume a [`Trainer`], and elimination additionally needs the
//! trained model to expose per-feature weights through [`LinearModel`].

use crate::core::error::Result;
use crate::core::types::*;
use crate::dataset::BinaryDataset;
use ndarray::ArrayView1;

/// A trained binary classifier.
pub trait Model {
    /// Predict one sample. `sample` holds the full feature row of the
    /// dataset; the model picks the columns it was trained on.
    fn predict(&self, sample: ArrayView1<'_, f64>) -> Prediction;
}

/// A model whose decision function is linear in its features.
pub trait LinearModel: Model {
    /// One weight per training feature, aligned with the feature subset the
    /// model was trained on
    fn weights(&self) -> &[f64];

    /// Intercept of the decision function
    fn bias(&self) -> f64;

    /// Feature subset the weights are aligned with
    fn features(&self) -> &[FeatureIndex];
}

/// Capability to train a binary classifier.
///
/// Calls must be independent: training one fold never observes another, so
/// folds may be trained concurrently from a shared reference.
pub trait Trainer: Sync {
    /// Model produced by this trainer
    type Model: Model + Send;

    /// Train on the given rows restricted to the given feature columns
    fn train(
        &self,
        data: &BinaryDataset,
        rows: &[SampleIndex],
        features: &[FeatureIndex],
    ) -> Result<Self::Model>;

    /// Trainer name for logging
    fn name(&self) -> &str;
}
