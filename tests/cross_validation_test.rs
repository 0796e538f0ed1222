//! Fold partitioning and cross-validation integration tests.

use probeset_ranker::{
    cross_validate, CrossValidationConfig, CrossValidationEvaluator, FoldPartitioner, MeasureType, RankerError,
};
use proptest::prelude::*;

mod common;
use common::*;

proptest! {
    #[test]
    fn prop_folds_cover_every_sample_once(
        sample_count in 2usize..80,
        fold_seed in any::<u64>(),
        fold_frac in 0.0..1.0f64,
    ) {
        let fold_count = 2 + ((sample_count - 2) as f64 * fold_frac) as usize;
        let folds = FoldPartitioner::partition(sample_count, fold_count, fold_seed).unwrap();

        let mut seen = vec![0usize; sample_count];
        for fold in 0..fold_count {
            for &sample in folds.test_indices(fold) {
                seen[sample] += 1;
                prop_assert_eq!(folds.fold_of(sample), fold);
            }
        }
        prop_assert!(seen.iter().all(|&c| c == 1));

        let sizes = folds.fold_sizes();
        let min = *sizes.iter().min().unwrap();
        let max = *sizes.iter().max().unwrap();
        prop_assert!(max - min <= 1);
        prop_assert!(min >= 1);
    }

    #[test]
    fn prop_stratified_folds_balance_classes(
        negatives in 1usize..30,
        positives in 1usize..30,
        fold_count in 2usize..6,
        seed in any::<u64>(),
    ) {
        prop_assume!(fold_count < negatives + positives);
        let classes: Vec<usize> = (0..negatives + positives).map(|i| usize::from(i >= negatives)).collect();
        let folds = FoldPartitioner::partition_stratified(&classes, fold_count, seed).unwrap();

        for class in 0..2 {
            let counts: Vec<usize> = (0..fold_count)
                .map(|fold| folds.test_indices(fold).iter().filter(|&&s| classes[s] == class).count())
                .collect();
            let min = *counts.iter().min().unwrap();
            let max = *counts.iter().max().unwrap();
            prop_assert!(max - min <= 1, "class {} spread {:?}", class, counts);
        }
    }

    #[test]
    fn prop_partition_depends_only_on_seed(
        sample_count in 4usize..50,
        seed in any::<u64>(),
    ) {
        let a = FoldPartitioner::partition(sample_count, 3.min(sample_count), seed).unwrap();
        let b = FoldPartitioner::partition(sample_count, 3.min(sample_count), seed).unwrap();
        prop_assert_eq!(a, b);
    }
}

fn evaluator(fold_count: usize, repeat_count: usize, seed: u64) -> CrossValidationEvaluator {
    CrossValidationEvaluator::new(
        CrossValidationConfig::new()
            .with_fold_count(fold_count)
            .with_repeat_count(repeat_count)
            .with_seed(seed)
            .with_measures(vec![MeasureType::Auc, MeasureType::Accuracy, MeasureType::Rmse]),
    )
}

#[test]
fn test_informative_features_classify_well() {
    let data = create_binary_dataset(21);
    let measures = evaluator(5, 2, 42)
        .evaluate(&test_trainer(), &data, &INFORMATIVE)
        .unwrap();

    assert_eq!(measures.evaluations(), 10);
    assert!(measures.value(MeasureType::Auc).unwrap() > 0.9);
    assert!(measures.value(MeasureType::Accuracy).unwrap() > 0.9);
    assert!(measures.value(MeasureType::Rmse).unwrap() < 0.4);
}

#[test]
fn test_same_seed_gives_identical_measures() {
    let data = create_binary_dataset(21);
    let features: Vec<usize> = (0..20).collect();
    let first = evaluator(4, 3, 9).evaluate(&test_trainer(), &data, &features).unwrap();
    let second = evaluator(4, 3, 9).evaluate(&test_trainer(), &data, &features).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_parallel_and_sequential_agree() {
    let data = create_binary_dataset(5);
    let features: Vec<usize> = (0..30).collect();
    let base = CrossValidationConfig::new()
        .with_fold_count(5)
        .with_repeat_count(2)
        .with_seed(42)
        .with_measures(MeasureType::ALL.to_vec());

    let sequential = CrossValidationEvaluator::new(base.clone().with_parallel(false))
        .evaluate(&test_trainer(), &data, &features)
        .unwrap();
    let parallel = CrossValidationEvaluator::new(base.with_parallel(true))
        .evaluate(&test_trainer(), &data, &features)
        .unwrap();
    assert_eq!(sequential, parallel);
}

#[test]
fn test_leave_one_out_runs_a_single_round() {
    let data = create_noise_dataset(4, 4, 5, 1);
    let measures = evaluator(8, 5, 42)
        .evaluate(&test_trainer(), &data, &[0, 1, 2])
        .unwrap();
    assert!(measures.is_leave_one_out());
    assert_eq!(measures.evaluations(), 1);
    let auc = measures.value(MeasureType::Auc).unwrap();
    assert!((0.0..=1.0).contains(&auc));
}

#[test]
fn test_too_many_folds_is_rejected() {
    let data = create_noise_dataset(3, 3, 4, 1);
    let result = evaluator(7, 1, 42).evaluate(&test_trainer(), &data, &[0]);
    assert!(matches!(result, Err(RankerError::InvalidArgument { .. })));
}

#[test]
fn test_cross_validate_free_function_matches_evaluator() {
    let data = create_binary_dataset(2);
    let features = [3, 17];
    let measures = [MeasureType::Auc, MeasureType::Accuracy, MeasureType::Rmse];
    let direct = cross_validate(&test_trainer(), &data, &features, 5, 2, 42, &measures).unwrap();
    let through = evaluator(5, 2, 42).evaluate(&test_trainer(), &data, &features).unwrap();
    assert_eq!(direct, through);
}
