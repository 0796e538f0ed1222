//! Linear classifiers usable by cross-validation and recursive elimination.

pub mod logistic;

pub use logistic::{LogisticModel, LogisticRegressionTrainer};
