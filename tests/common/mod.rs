//! Common test utilities for probeset ranker integration tests.
#![allow(dead_code)]

use ndarray::{Array1, Array2};
use probeset_ranker::*;
use rand::prelude::*;
use std::fs;
use std::path::Path;

/// Samples per class in the standard fixture
pub const SAMPLES_PER_CLASS: usize = 10;

/// Features in the standard fixture
pub const NUM_FEATURES: usize = 100;

/// Features whose mean differs between classes
pub const INFORMATIVE: [usize; 5] = [3, 17, 42, 64, 88];

/// Feature identifier of column `j`
pub fn probeset_name(j: usize) -> String {
    format!("PS_{:04}", j)
}

/// Sample labels: `normal` first, then `tumor`
pub fn sample_labels(per_class: usize) -> Vec<String> {
    (0..2 * per_class)
        .map(|i| if i < per_class { "normal" } else { "tumor" }.to_string())
        .collect()
}

/// Create an expression matrix where the informative features shift by
/// `effect` in the second half of the rows
pub fn create_expression(num_samples: usize, num_features: usize, effect: f64, seed: u64) -> Array2<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut features = Array2::zeros((num_samples, num_features));

    for i in 0..num_samples {
        let shifted = i >= num_samples / 2;
        for j in 0..num_features {
            let mut value: f64 = rng.gen_range(-1.0..1.0);
            if shifted && INFORMATIVE.contains(&j) {
                value += effect;
            }
            features[[i, j]] = value;
        }
    }

    features
}

/// Labeled dataset: 10 normal and 10 tumor samples over 100 probesets
pub fn create_labeled_dataset(seed: u64) -> Dataset {
    let num_samples = 2 * SAMPLES_PER_CLASS;
    let features = create_expression(num_samples, NUM_FEATURES, 3.0, seed);
    let names = (0..NUM_FEATURES).map(probeset_name).collect();
    Dataset::new(sample_labels(SAMPLES_PER_CLASS), features, names).unwrap()
}

/// The standard tumor-vs-normal task
pub fn tumor_vs_normal() -> ClassificationTask {
    ClassificationTask::new("tumor_vs_normal", vec!["normal".to_string()], vec!["tumor".to_string()]).unwrap()
}

/// The standard fixture bound to the tumor-vs-normal task
pub fn create_binary_dataset(seed: u64) -> BinaryDataset {
    tumor_vs_normal().bind(&create_labeled_dataset(seed)).unwrap()
}

/// Binary dataset with `positives` positive rows after `negatives` negative
/// rows and no class signal
pub fn create_noise_dataset(negatives: usize, positives: usize, num_features: usize, seed: u64) -> BinaryDataset {
    let mut rng = StdRng::seed_from_u64(seed);
    let num_samples = negatives + positives;
    let features = Array2::from_shape_fn((num_samples, num_features), |_| rng.gen_range(-1.0..1.0));
    let targets = Array1::from_shape_fn(num_samples, |i| if i < negatives { 0.0 } else { 1.0 });
    let names = (0..num_features).map(probeset_name).collect();
    BinaryDataset::new(features, targets, names).unwrap()
}

/// Write a dataset as a tab-separated table
pub fn write_table(dataset: &Dataset, path: &Path) {
    let mut content = String::from("label");
    for name in dataset.feature_names() {
        content.push('\t');
        content.push_str(name);
    }
    content.push('\n');
    for (i, label) in dataset.sample_labels().iter().enumerate() {
        content.push_str(label);
        for value in dataset.features().row(i) {
            content.push_str(&format!("\t{}", value));
        }
        content.push('\n');
    }
    fs::write(path, content).unwrap();
}

/// Write one identifier per line
pub fn write_gene_list(names: &[String], path: &Path) {
    fs::write(path, names.join("\n") + "\n").unwrap();
}

/// Trainer with a fast schedule for tests
pub fn test_trainer() -> LogisticRegressionTrainer {
    LogisticRegressionTrainer::new().with_epochs(100).with_learning_rate(0.5)
}
