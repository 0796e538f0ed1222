//! Feature scoring and bounded top-K selection.

pub mod bounded;
pub mod strategy;

pub use bounded::{top_k, PopAll, ScoreBoundedSelector};
pub use strategy::{Strategy, StrategyScores};
