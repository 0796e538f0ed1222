//! System constants and configuration defaults for the probeset ranker.

/// Default seed for fold partitioning. Reused verbatim across strategies so
/// that fold membership is identical for every compared feature set.
pub const DEFAULT_SEED: u64 = 42;

/// Default number of cross-validation folds.
pub const DEFAULT_FOLD_COUNT: usize = 5;

/// Default number of cross-validation repeats.
pub const DEFAULT_REPEAT_COUNT: usize = 1;

/// Default number of features kept by the bounded selector.
pub const DEFAULT_TOP_K: usize = 50;

/// Default final feature count for recursive elimination.
pub const DEFAULT_TARGET_COUNT: usize = 10;

/// Default fraction of candidates surviving one elimination round.
pub const DEFAULT_SHRINK_RATIO: f64 = 0.5;

/// Default learning rate for the logistic regression trainer.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default number of full-batch gradient steps for the logistic regression trainer.
pub const DEFAULT_EPOCHS: usize = 200;

/// Default L2 penalty for the logistic regression trainer.
pub const DEFAULT_L2: f64 = 0.01;

/// Default measures computed by cross-validation.
pub const DEFAULT_MEASURES: &[&str] = &["auc", "acc", "f"];

/// A p-value that cannot be computed is treated as the worst possible outcome.
pub const NAN_P_VALUE: f64 = 1.0;

/// Decision threshold applied to predicted probabilities.
pub const PROBABILITY_THRESHOLD: f64 = 0.5;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "PROBESET_";

/// Library version.
pub const PROBESET_RANKER_VERSION: &str = env!("CARGO_PKG_VERSION");
