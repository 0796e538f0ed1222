//! Error handling and error types for the probeset ranker.
//!
//! Every fallible operation in the crate returns [`Result`]. Errors are fatal
//! to the (task, gene list) unit that raised them; nothing in the library
//! retries. The driver decides whether to continue with the next unit.

use std::io;
use thiserror::Error;

/// Main error type for the probeset ranker.
#[derive(Error, Debug)]
pub enum RankerError {
    /// Invalid argument supplied to a core operation
    #[error("Invalid argument: {parameter} = {value}, {reason}")]
    InvalidArgument {
        /// Parameter name
        parameter: String,
        /// Rejected value as text
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The external trainer failed; carries the cross-validation round and
    /// fold (or the elimination round) that was being trained
    #[error("Training failure (round {round}{}): {message}", fold_suffix(.fold))]
    TrainingFailure {
        /// Round being trained
        round: usize,
        /// Fold within the round; `None` outside cross-validation
        fold: Option<usize>,
        /// Trainer message
        message: String,
    },

    /// A performance measure could not be computed
    #[error("Evaluation error: {message}")]
    Evaluation {
        /// Error description
        message: String,
    },

    /// Dataset consistency errors (labels, dimensions, unknown features)
    #[error("Dataset error: {message}")]
    Dataset {
        /// Error description
        message: String,
    },

    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Error description
        message: String,
    },

    /// Table and gene-list loading errors
    #[error("Data loading error: {message}")]
    DataLoading {
        /// Error description
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        /// Underlying error
        #[from]
        source: io::Error,
    },

    /// Delimited table parsing and writing errors
    #[error("CSV error: {source}")]
    Csv {
        /// Underlying error
        #[from]
        source: csv::Error,
    },

    /// JSON configuration files that fail to parse or serialize
    #[error("JSON error: {source}")]
    Json {
        /// Underlying error
        #[from]
        source: serde_json::Error,
    },

    /// TOML configuration files that fail to parse
    #[error("TOML error: {source}")]
    Toml {
        /// Underlying error
        #[from]
        source: toml::de::Error,
    },
}

fn fold_suffix(fold: &Option<usize>) -> String {
    fold.map(|f| format!(", fold {}", f)).unwrap_or_default()
}

/// Type alias for Results using RankerError
pub type Result<T> = std::result::Result<T, RankerError>;

impl RankerError {
    /// Create an invalid argument error
    pub fn invalid_argument<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        RankerError::InvalidArgument {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a training failure for a cross-validation fold or an
    /// elimination round (`fold == None`)
    pub fn training_failure<S: Into<String>>(round: usize, fold: Option<usize>, message: S) -> Self {
        RankerError::TrainingFailure {
            round,
            fold,
            message: message.into(),
        }
    }

    /// Wrap an error raised by a trainer with round/fold context.
    ///
    /// A trainer error that already carries context keeps its message verbatim.
    pub fn in_training(self, round: usize, fold: Option<usize>) -> Self {
        let message = match self {
            RankerError::TrainingFailure { message, .. } => message,
            other => other.to_string(),
        };
        RankerError::TrainingFailure {
            round,
            fold,
            message,
        }
    }

    /// Create an evaluation error
    pub fn evaluation<S: Into<String>>(message: S) -> Self {
        RankerError::Evaluation {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        RankerError::Dataset {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        RankerError::Config {
            message: message.into(),
        }
    }

    /// Create a data loading error
    pub fn data_loading<S: Into<String>>(message: S) -> Self {
        RankerError::DataLoading {
            message: message.into(),
        }
    }

    /// Check if the driver may move on to the next unit after this error.
    ///
    /// Input and configuration problems affect every unit, so they are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RankerError::InvalidArgument { .. } => true,
            RankerError::TrainingFailure { .. } => true,
            RankerError::Evaluation { .. } => true,
            RankerError::Dataset { .. } => true,
            RankerError::Config { .. } => false,
            RankerError::DataLoading { .. } => false,
            RankerError::Io { .. } => false,
            RankerError::Csv { .. } => false,
            RankerError::Json { .. } => false,
            RankerError::Toml { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            RankerError::InvalidArgument { .. } => "invalid_argument",
            RankerError::TrainingFailure { .. } => "training_failure",
            RankerError::Evaluation { .. } => "evaluation",
            RankerError::Dataset { .. } => "dataset",
            RankerError::Config { .. } => "config",
            RankerError::DataLoading { .. } => "data_loading",
            RankerError::Io { .. } => "io",
            RankerError::Csv { .. } => "csv",
            RankerError::Json { .. } => "json",
            RankerError::Toml { .. } => "toml",
        }
    }
}
