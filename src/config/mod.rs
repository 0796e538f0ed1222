//! Configuration management for the probeset ranker.
//!
//! Configuration comes from a TOML or JSON file, environment overrides
//! (`PROBESET_SEED`, `PROBESET_FOLDS`, `PROBESET_REPEATS`, `PROBESET_TOP_K`,
//! `PROBESET_THREADS`) or flat key-value pairs.

pub mod core;

pub use self::core::{Config, ConfigBuilder, CvSection, InputSection, OutputSection, SelectionSection};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "probeset-ranker.toml";

/// Utility functions for configuration management
pub mod utils {
    use super::*;
    use crate::core::error::{RankerError, Result};
    use crate::core::types::VerbosityLevel;
    use crate::selection::Strategy;
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::str::FromStr;

    fn parse<T: FromStr>(key: &str, value: &str) -> Result<T> {
        value
            .trim()
            .parse()
            .map_err(|_| RankerError::config(format!("Invalid {}: {}", key, value)))
    }

    fn list(value: &str) -> Vec<String> {
        value
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Parse configuration from key-value pairs.
    ///
    /// List values are comma separated. Strategies are given by name;
    /// `elimination` takes the default schedule. Unknown keys are logged and
    /// ignored.
    pub fn parse_config_from_map(map: HashMap<String, String>) -> Result<Config> {
        let mut config = Config::default();

        for (key, value) in map {
            match key.as_str() {
                "fold_count" => config.cv.fold_count = parse(&key, &value)?,
                "repeat_count" => config.cv.repeat_count = parse(&key, &value)?,
                "seed" => config.cv.seed = parse(&key, &value)?,
                "measures" => config.cv.measures = list(&value),
                "parallel" => config.cv.parallel = parse(&key, &value)?,
                "threads" => config.cv.threads = parse(&key, &value)?,
                "top_k" => config.selection.top_k = parse(&key, &value)?,
                "learning_rate" => config.trainer.learning_rate = parse(&key, &value)?,
                "epochs" => config.trainer.epochs = parse(&key, &value)?,
                "l2" => config.trainer.l2 = parse(&key, &value)?,
                "standardize" => config.trainer.standardize = parse(&key, &value)?,
                "strategies" => {
                    config.strategies = list(&value)
                        .iter()
                        .map(|name| name.parse::<Strategy>())
                        .collect::<Result<Vec<_>>>()
                        .map_err(|e| RankerError::config(e.to_string()))?;
                }
                "dataset" => config.input.dataset = Some(PathBuf::from(value)),
                "gene_lists" => config.input.gene_lists = list(&value).into_iter().map(PathBuf::from).collect(),
                "ranking_dir" => config.output.ranking_dir = Some(PathBuf::from(value)),
                "measure_report" => config.output.measure_report = Some(PathBuf::from(value)),
                "append" => config.output.append = parse(&key, &value)?,
                "verbosity" => {
                    config.verbosity = match value.trim() {
                        "silent" => VerbosityLevel::Silent,
                        "warning" => VerbosityLevel::Warning,
                        "info" => VerbosityLevel::Info,
                        "debug" => VerbosityLevel::Debug,
                        _ => return Err(RankerError::config(format!("Invalid verbosity: {}", value))),
                    }
                }
                "continue_on_error" => config.continue_on_error = parse(&key, &value)?,
                _ => {
                    log::warn!("Unknown configuration parameter: {}", key);
                }
            }
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::VerbosityLevel;
    use crate::selection::Strategy;
    use std::collections::HashMap;

    #[test]
    fn test_parse_config_from_map() {
        let mut map = HashMap::new();
        map.insert("fold_count".to_string(), "4".to_string());
        map.insert("seed".to_string(), "1234".to_string());
        map.insert("measures".to_string(), "auc, mcc".to_string());
        map.insert("strategies".to_string(), "ttest,rfe".to_string());
        map.insert("verbosity".to_string(), "debug".to_string());
        map.insert("unknown_key".to_string(), "ignored".to_string());

        let config = utils::parse_config_from_map(map).unwrap();
        assert_eq!(config.cv.fold_count, 4);
        assert_eq!(config.cv.seed, 1234);
        assert_eq!(config.cv.measures, vec!["auc".to_string(), "mcc".to_string()]);
        assert_eq!(config.strategies[0], Strategy::TTest);
        assert_eq!(config.strategies[1].name(), "elimination");
        assert_eq!(config.verbosity, VerbosityLevel::Debug);
    }

    #[test]
    fn test_parse_config_rejects_bad_values() {
        let mut map = HashMap::new();
        map.insert("repeat_count".to_string(), "twice".to_string());
        assert!(utils::parse_config_from_map(map).is_err());

        let mut map = HashMap::new();
        map.insert("strategies".to_string(), "svm".to_string());
        assert!(utils::parse_config_from_map(map).is_err());

        let mut map = HashMap::new();
        map.insert("fold_count".to_string(), "1".to_string());
        assert!(utils::parse_config_from_map(map).is_err());
    }
}
