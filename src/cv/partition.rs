//! Seeded partitioning of samples into cross-validation folds.
//!
//! A partition is a pure function of (class of each sample, fold count,
//! seed): the generator is created inside the call from the seed alone, so
//! every strategy compared on the same task sees exactly the same folds.

use crate::core::error::{RankerError, Result};
use crate::core::types::SampleIndex;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Assignment of every sample to exactly one fold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FoldAssignment {
    /// Fold id of each sample
    fold_of: Vec<usize>,
    /// Sample indices of each fold, ascending
    folds: Vec<Vec<SampleIndex>>,
}

impl FoldAssignment {
    fn from_fold_of(fold_of: Vec<usize>, fold_count: usize) -> Self {
        let mut folds = vec![Vec::new(); fold_count];
        for (sample, &fold) in fold_of.iter().enumerate() {
            folds[fold].push(sample);
        }
        FoldAssignment { fold_of, folds }
    }

    /// Number of folds
    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }

    /// Number of partitioned samples
    pub fn sample_count(&self) -> usize {
        self.fold_of.len()
    }

    /// Fold id of a sample
    pub fn fold_of(&self, sample: SampleIndex) -> usize {
        self.fold_of[sample]
    }

    /// Fold id of every sample
    pub fn assignments(&self) -> &[usize] {
        &self.fold_of
    }

    /// Held-out samples of a fold
    pub fn test_indices(&self, fold: usize) -> &[SampleIndex] {
        &self.folds[fold]
    }

    /// Training samples of a fold: every sample not held out by it
    pub fn train_indices(&self, fold: usize) -> Vec<SampleIndex> {
        self.fold_of
            .iter()
            .enumerate()
            .filter(|(_, &f)| f != fold)
            .map(|(sample, _)| sample)
            .collect()
    }

    /// Size of every fold
    pub fn fold_sizes(&self) -> Vec<usize> {
        self.folds.iter().map(Vec::len).collect()
    }

    /// One sample per fold
    pub fn is_leave_one_out(&self) -> bool {
        self.fold_count() == self.sample_count()
    }
}

/// Stateless seed-to-partition functions
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldPartitioner;

impl FoldPartitioner {
    /// Partition `sample_count` samples into `fold_count` folds.
    ///
    /// All samples form a single stratum. `fold_count == sample_count` is
    /// leave-one-out.
    pub fn partition(sample_count: usize, fold_count: usize, seed: u64) -> Result<FoldAssignment> {
        Self::partition_stratified(&vec![0; sample_count], fold_count, seed)
    }

    /// Partition samples preserving class proportions.
    ///
    /// `classes[i]` is the class id of sample `i`. Each class is shuffled on
    /// its own, the shuffled classes are laid end to end in class-id order,
    /// and the sequence is dealt round-robin with one cursor. Fold sizes
    /// therefore differ by at most one and each class is spread as evenly as
    /// the fold count allows.
    pub fn partition_stratified(classes: &[usize], fold_count: usize, seed: u64) -> Result<FoldAssignment> {
        let sample_count = classes.len();
        if fold_count < 2 || fold_count > sample_count {
            return Err(RankerError::invalid_argument(
                "fold_count",
                fold_count.to_string(),
                format!("must be in [2, {}] for {} samples", sample_count, sample_count),
            ));
        }

        if fold_count == sample_count {
            return Ok(FoldAssignment::from_fold_of((0..sample_count).collect(), fold_count));
        }

        let num_classes = classes.iter().copied().max().map_or(0, |c| c + 1);
        let mut strata: Vec<Vec<SampleIndex>> = vec![Vec::new(); num_classes];
        for (sample, &class) in classes.iter().enumerate() {
            strata[class].push(sample);
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut fold_of = vec![0; sample_count];
        let mut cursor = 0usize;
        for stratum in strata.iter_mut() {
            stratum.shuffle(&mut rng);
            for &sample in stratum.iter() {
                fold_of[sample] = cursor % fold_count;
                cursor += 1;
            }
        }

        Ok(FoldAssignment::from_fold_of(fold_of, fold_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_count_bounds() {
        assert!(FoldPartitioner::partition(10, 1, 0).is_err());
        assert!(FoldPartitioner::partition(10, 11, 0).is_err());
        assert!(FoldPartitioner::partition(1, 1, 0).is_err());
        assert!(FoldPartitioner::partition(10, 2, 0).is_ok());
        assert!(FoldPartitioner::partition(10, 10, 0).is_ok());
    }

    #[test]
    fn test_partition_is_deterministic() {
        let a = FoldPartitioner::partition(37, 5, 42).unwrap();
        let b = FoldPartitioner::partition(37, 5, 42).unwrap();
        assert_eq!(a, b);

        let c = FoldPartitioner::partition(37, 5, 43).unwrap();
        assert_ne!(a.assignments(), c.assignments());
    }

    #[test]
    fn test_leave_one_out_is_identity() {
        let loo = FoldPartitioner::partition(6, 6, 1234).unwrap();
        assert!(loo.is_leave_one_out());
        for sample in 0..6 {
            assert_eq!(loo.fold_of(sample), sample);
            assert_eq!(loo.test_indices(sample), &[sample]);
        }
    }

    #[test]
    fn test_stratification_spreads_classes() {
        // 6 negatives, 9 positives into 3 folds
        let classes: Vec<usize> = (0..15).map(|i| usize::from(i >= 6)).collect();
        let folds = FoldPartitioner::partition_stratified(&classes, 3, 7).unwrap();

        assert_eq!(folds.fold_sizes(), vec![5, 5, 5]);
        for fold in 0..3 {
            let positives = folds
                .test_indices(fold)
                .iter()
                .filter(|&&s| classes[s] == 1)
                .count();
            assert_eq!(positives, 3);
        }
    }

    #[test]
    fn test_uneven_strata_keep_sizes_within_one() {
        // 3 + 3 samples into 2 folds would be 4/2 with per-class cursors
        let classes = vec![0, 0, 0, 1, 1, 1];
        let folds = FoldPartitioner::partition_stratified(&classes, 2, 99).unwrap();
        assert_eq!(folds.fold_sizes(), vec![3, 3]);
    }

    #[test]
    fn test_train_and_test_are_complementary() {
        let folds = FoldPartitioner::partition(11, 4, 5).unwrap();
        for fold in 0..folds.fold_count() {
            let mut all: Vec<usize> = folds.train_indices(fold);
            all.extend_from_slice(folds.test_indices(fold));
            all.sort_unstable();
            assert_eq!(all, (0..11).collect::<Vec<_>>());
        }
    }
}
