//! Tab-separated report writers.
//!
//! A header row is written when a report file is created or empty, and left
//! out when rows are appended to a file that already has content.

use crate::core::error::{RankerError, Result};
use crate::core::types::{FeatureScore, MeasureType};
use crate::cv::EvaluationMeasure;
use crate::elimination::FeatureWeight;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Open `path` for writing; returns the file and whether it already has content
fn open_report(path: &Path, append: bool) -> Result<(File, bool)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let has_content = append && path.metadata().map(|m| m.len() > 0).unwrap_or(false);
    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    Ok((file, has_content))
}

fn tsv_writer(file: File) -> Writer<File> {
    WriterBuilder::new().delimiter(b'\t').has_headers(false).from_writer(file)
}

#[derive(Debug, Serialize)]
struct RankingRow<'a> {
    rank: usize,
    feature: &'a str,
    score: f64,
    aux: Option<f64>,
}

#[derive(Debug, Serialize)]
struct WeightRow<'a> {
    feature: &'a str,
    weight: f64,
}

/// Writes ranked features (`rank`, `feature`, `score`, `aux`) or model
/// weights (`feature`, `weight`); one kind per file
#[derive(Debug)]
pub struct ReportWriter {
    path: PathBuf,
    writer: Writer<File>,
    header_pending: bool,
    rows: usize,
}

impl ReportWriter {
    /// Column names of a ranking report
    pub const HEADER: [&'static str; 4] = ["rank", "feature", "score", "aux"];

    /// Column names of a weight report
    pub const WEIGHT_HEADER: [&'static str; 2] = ["feature", "weight"];

    /// Create or truncate a report
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, false)
    }

    /// Open a report, appending to existing content when `append` is set
    pub fn open<P: AsRef<Path>>(path: P, append: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (file, has_content) = open_report(&path, append)?;
        Ok(ReportWriter {
            writer: tsv_writer(file),
            header_pending: !has_content,
            rows: 0,
            path,
        })
    }

    /// Report location
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows written through this writer
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    fn write_header(&mut self, header: &[&str]) -> Result<()> {
        if self.header_pending {
            self.writer.write_record(header)?;
            self.header_pending = false;
        }
        Ok(())
    }

    /// Write ranked scores, best first; `names[feature]` labels each row
    pub fn write_ranking<S: AsRef<str>>(&mut self, scores: &[FeatureScore], names: &[S]) -> Result<()> {
        self.write_header(&Self::HEADER)?;
        for (i, score) in scores.iter().enumerate() {
            let feature = feature_name(names, score.feature)?;
            self.writer.serialize(RankingRow {
                rank: i + 1,
                feature,
                score: score.score,
                aux: score.aux,
            })?;
            self.rows += 1;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Write model weights in the given order
    pub fn write_weights<S: AsRef<str>>(&mut self, weights: &[FeatureWeight], names: &[S]) -> Result<()> {
        self.write_header(&Self::WEIGHT_HEADER)?;
        for weight in weights {
            self.writer.serialize(WeightRow {
                feature: feature_name(names, weight.feature)?,
                weight: weight.weight,
            })?;
            self.rows += 1;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn feature_name<S: AsRef<str>>(names: &[S], feature: usize) -> Result<&str> {
    names.get(feature).map(AsRef::as_ref).ok_or_else(|| {
        RankerError::invalid_argument(
            "feature",
            feature.to_string(),
            format!("no name among {} features", names.len()),
        )
    })
}

/// One row of a measure report
#[derive(Debug, Clone, Copy)]
pub struct MeasureRow<'a> {
    /// Classification task name
    pub task: &'a str,
    /// Gene list name
    pub gene_list: &'a str,
    /// Strategy name
    pub strategy: &'a str,
    /// Number of evaluated features
    pub features: usize,
    /// Aggregated measures
    pub measures: &'a EvaluationMeasure,
}

/// Writes one row per evaluation: `task`, `gene_list`, `strategy`,
/// `features`, then one column per measure
#[derive(Debug)]
pub struct MeasureReportWriter {
    writer: Writer<File>,
    measures: Vec<MeasureType>,
}

impl MeasureReportWriter {
    /// Open a measure report for a fixed set of measure columns.
    ///
    /// When appending to an existing report its header must list the same
    /// columns.
    pub fn open<P: AsRef<Path>>(path: P, measures: &[MeasureType], append: bool) -> Result<Self> {
        let path = path.as_ref();
        let header = Self::header(measures);

        if append && path.metadata().map(|m| m.len() > 0).unwrap_or(false) {
            let existing = read_header(path)?;
            if existing != header {
                return Err(RankerError::config(format!(
                    "cannot append to {}: header [{}] does not match [{}]",
                    path.display(),
                    existing.join(", "),
                    header.join(", ")
                )));
            }
        }

        let (file, has_content) = open_report(path, append)?;
        let mut writer = tsv_writer(file);
        if !has_content {
            writer.write_record(&header)?;
            writer.flush()?;
        }
        Ok(MeasureReportWriter {
            writer,
            measures: measures.to_vec(),
        })
    }

    fn header(measures: &[MeasureType]) -> Vec<String> {
        ["task", "gene_list", "strategy", "features"]
            .iter()
            .map(|s| s.to_string())
            .chain(measures.iter().map(|m| m.name().to_string()))
            .collect()
    }

    /// Append one evaluation
    pub fn write_row(&mut self, row: &MeasureRow<'_>) -> Result<()> {
        let mut record = vec![
            row.task.to_string(),
            row.gene_list.to_string(),
            row.strategy.to_string(),
            row.features.to_string(),
        ];
        for &measure in &self.measures {
            let value = row.measures.value(measure).ok_or_else(|| {
                RankerError::evaluation(format!("measure {} was not computed", measure))
            })?;
            record.push(value.to_string());
        }
        self.writer.write_record(&record)?;
        self.writer.flush()?;
        Ok(())
    }
}

fn read_header(path: &Path) -> Result<Vec<String>> {
    let mut line = String::new();
    BufReader::new(File::open(path)?).read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).split('\t').map(str::to_string).collect())
}
