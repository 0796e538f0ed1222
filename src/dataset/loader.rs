//! Delimited table and gene-list loading.
//!
//! The expression table has a header row. Column 0 carries the sample label,
//! every other header cell names a probeset. Missing measurements (`NA`,
//! `NaN`, empty cells) load as NaN.

use crate::core::error::{RankerError, Result};
use crate::dataset::dataset::Dataset;
use csv::{ReaderBuilder, StringRecord};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Table parsing options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Field delimiter
    pub delimiter: char,
    /// Comment character, lines starting with it are skipped
    pub comment_char: Option<char>,
    /// Trim whitespace from fields
    pub trim: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            delimiter: '\t',
            comment_char: Some('#'),
            trim: true,
        }
    }
}

/// Loader for labeled expression tables
#[derive(Debug, Clone, Default)]
pub struct TableLoader {
    config: TableConfig,
}

impl TableLoader {
    /// Create a loader with the given options
    pub fn new(config: TableConfig) -> Self {
        TableLoader { config }
    }

    /// Set delimiter character
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.config.delimiter = delimiter;
        self
    }

    /// Loader options
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Load a table from a file
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        log::info!("Loading expression table: {}", path.display());

        if !path.is_file() {
            return Err(RankerError::data_loading(format!(
                "Not a readable file: {}",
                path.display()
            )));
        }
        let file = File::open(path)?;
        let dataset = self.load_from_reader(file)?;
        log::info!(
            "Loaded {} samples × {} features from {}",
            dataset.num_samples(),
            dataset.num_features(),
            path.display()
        );
        Ok(dataset)
    }

    /// Load a table from any reader
    pub fn load_from_reader<R: std::io::Read>(&self, reader: R) -> Result<Dataset> {
        let delimiter = u8::try_from(self.config.delimiter).map_err(|_| {
            RankerError::config(format!(
                "delimiter '{}' is not a single-byte character",
                self.config.delimiter
            ))
        })?;
        let comment = self
            .config
            .comment_char
            .map(|c| {
                u8::try_from(c).map_err(|_| {
                    RankerError::config(format!("comment character '{}' is not a single-byte character", c))
                })
            })
            .transpose()?;

        let mut reader = ReaderBuilder::new()
            .delimiter(delimiter)
            .comment(comment)
            .has_headers(true)
            .trim(if self.config.trim { csv::Trim::All } else { csv::Trim::None })
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        if headers.len() < 2 {
            return Err(RankerError::data_loading(
                "table needs a label column and at least one feature column",
            ));
        }
        let feature_names: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        let num_features = feature_names.len();

        let mut labels = Vec::new();
        let mut values = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            self.parse_record(&record, row, num_features, &mut labels, &mut values)?;
        }

        if labels.is_empty() {
            return Err(RankerError::data_loading("table has no sample rows"));
        }

        let features = Array2::from_shape_vec((labels.len(), num_features), values)
            .map_err(|e| RankerError::data_loading(format!("inconsistent table shape: {}", e)))?;
        Dataset::new(labels, features, feature_names)
    }

    fn parse_record(
        &self,
        record: &StringRecord,
        row: usize,
        num_features: usize,
        labels: &mut Vec<String>,
        values: &mut Vec<f64>,
    ) -> Result<()> {
        if record.len() != num_features + 1 {
            return Err(RankerError::data_loading(format!(
                "row {} has {} fields, expected {}",
                row + 1,
                record.len(),
                num_features + 1
            )));
        }
        let label = &record[0];
        if label.is_empty() {
            return Err(RankerError::data_loading(format!("row {} has an empty label", row + 1)));
        }
        labels.push(label.to_string());

        for (col, field) in record.iter().enumerate().skip(1) {
            values.push(parse_value(field).ok_or_else(|| {
                RankerError::data_loading(format!(
                    "row {}, column {}: cannot parse '{}' as a number",
                    row + 1,
                    col,
                    field
                ))
            })?);
        }
        Ok(())
    }
}

fn parse_value(field: &str) -> Option<f64> {
    match field {
        "" | "NA" | "NaN" | "nan" | "null" => Some(f64::NAN),
        other => other.parse::<f64>().ok(),
    }
}

/// Read a gene list: one probeset identifier per line.
///
/// Blank lines and lines starting with `#` are skipped; only the first
/// whitespace-separated token of a line is used.
pub fn load_gene_list<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| {
        RankerError::data_loading(format!("cannot open gene list {}: {}", path.display(), e))
    })?;

    let mut genes = Vec::new();
    for line in BufReader::new(file).lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(token) = line.split_whitespace().next() {
            genes.push(token.to_string());
        }
    }

    if genes.is_empty() {
        return Err(RankerError::data_loading(format!(
            "gene list {} is empty",
            path.display()
        )));
    }
    log::debug!("Gene list {}: {} entries", path.display(), genes.len());
    Ok(genes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TABLE: &str = "label\tp1\tp2\tp3\n\
                         tumor\t1.5\t2.0\tNA\n\
                         # excluded sample\n\
                         normal\t0.5\t-1\t3e-1\n";

    #[test]
    fn test_load_from_reader() {
        let dataset = TableLoader::default().load_from_reader(TABLE.as_bytes()).unwrap();
        assert_eq!(dataset.num_samples(), 2);
        assert_eq!(dataset.num_features(), 3);
        assert_eq!(dataset.sample_labels(), &["tumor".to_string(), "normal".to_string()]);
        assert_eq!(dataset.feature_names()[2], "p3");
        assert!(dataset.features()[[0, 2]].is_nan());
        assert_eq!(dataset.features()[[1, 2]], 0.3);
    }

    #[test]
    fn test_ragged_row_is_rejected() {
        let table = "label\tp1\tp2\ntumor\t1.0\n";
        let err = TableLoader::default().load_from_reader(table.as_bytes());
        assert!(err.is_err());
    }

    #[test]
    fn test_unparseable_value_is_rejected() {
        let table = "label\tp1\ntumor\thigh\n";
        let err = TableLoader::default().load_from_reader(table.as_bytes()).unwrap_err();
        assert_eq!(err.category(), "data_loading");
    }

    #[test]
    fn test_comma_delimited_table() {
        let table = "label,p1\nnormal,4.0\n";
        let dataset = TableLoader::default()
            .with_delimiter(',')
            .load_from_reader(table.as_bytes())
            .unwrap();
        assert_eq!(dataset.features()[[0, 0]], 4.0);
    }

    #[test]
    fn test_load_gene_list() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# immune panel").unwrap();
        writeln!(file, "p1 interleukin").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "p3").unwrap();

        let genes = load_gene_list(file.path()).unwrap();
        assert_eq!(genes, vec!["p1".to_string(), "p3".to_string()]);
    }

    #[test]
    fn test_empty_gene_list_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        assert!(load_gene_list(file.path()).is_err());
    }
}
