//! Cross-validation: seeded fold partitioning and repeated evaluation.

pub mod evaluator;
pub mod partition;

pub use evaluator::{
    cross_validate, CrossValidationConfig, CrossValidationEvaluator, EvaluationMeasure, MeasureValue,
};
pub use partition::{FoldAssignment, FoldPartitioner};
