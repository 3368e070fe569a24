use itertools::Itertools;

use super::{quantile_histogram, quantile_means, AnalyticsEngine};
use crate::datastructures::{HistogramBucket, QueryError};
use crate::test_utils::*;

#[test]
fn test_total_elapsed_time() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    assert_eq!(engine.total_elapsed_time(), 7.5);
    let empty = empty_store();
    assert_eq!(AnalyticsEngine::new(&empty).total_elapsed_time(), 0.0);
}

#[test]
fn test_solved_percentage() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    // 2 of 3 status records are optimal
    assert_eq!(engine.solved_percentage().unwrap(), 200.0 / 3.0);
    let empty = empty_store();
    assert_eq!(
        AnalyticsEngine::new(&empty).solved_percentage(),
        Err(QueryError::EmptyDataset)
    );
}

#[test]
fn test_average_time_for_variable() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    // slot 0 is present and non-zero for problems 1 (2.0s) and 3 (1.5s);
    // problem 5 has no status record and does not count
    assert_eq!(engine.average_time_for_variable(0), 1.75);
    // slot 1 is absent for problem 1 and zero for problem 3
    assert_eq!(engine.average_time_for_variable(1), 0.0);
    // out of range is no match, not an error
    assert_eq!(engine.average_time_for_variable(4000), 0.0);
}

#[test]
fn test_problems_solved_within_time() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let all = engine
        .problems_solved_within_time(10.0, 0.0)
        .into_iter()
        .sorted()
        .collect_vec();
    assert_eq!(all, vec![1, 2, 3]);
    let fast = engine
        .problems_solved_within_time(2.0, 0.0)
        .into_iter()
        .sorted()
        .collect_vec();
    assert_eq!(fast, vec![1, 3]);
    // bounds are inclusive on both ends
    let exact = engine.problems_solved_within_time(2.0, 2.0);
    assert_eq!(exact, vec![1]);
    // negative lower bound clamps to 0.0
    assert_eq!(engine.problems_solved_within_time(2.0, -5.0), fast);
}

#[test]
fn test_window_with_lower_bound_is_subset() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let full = engine.problems_solved_within_time(4.0, 0.0);
    let bounded = engine.problems_solved_within_time(4.0, 1.6);
    assert!(bounded.iter().all(|id| full.contains(id)));
}

#[test]
fn test_profit_for_problem() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    assert_eq!(engine.profit_for_problem(4), Some(0.12));
    assert_eq!(engine.profit_for_problem(99), None);
    // known to the status map but not the value map
    assert_eq!(engine.profit_for_problem(5), None);
}

#[test]
fn test_sorted_profits_and_risks() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let profits = engine.sorted_profits();
    assert_eq!(profits, vec![0.07, 0.10, 0.10, 0.12]);
    assert!(profits.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(profits.len(), store.values().count());
    assert_eq!(engine.sorted_risks(), vec![0.02, 0.02, 0.05, 0.08]);
}

#[test]
fn test_rank_by_profit_groups_ties() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let ranking = engine.rank_by_profit();
    let groups = ranking
        .iter()
        .map(|(profit, ids)| (profit, ids.iter().copied().sorted().collect_vec()))
        .collect_vec();
    assert_eq!(
        groups,
        vec![
            (0.12, vec![4]),
            (0.10, vec![1, 3]),
            (0.07, vec![2]),
        ]
    );
    // the tie bucket at 0.10 is never split
    let top = ranking.top_n(2).into_iter().sorted().collect_vec();
    assert_eq!(top, vec![1, 3, 4]);
}

#[test]
fn test_rank_by_risk_is_ascending() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let keys = engine.rank_by_risk().iter().map(|(risk, _)| risk).collect_vec();
    assert_eq!(keys, vec![0.02, 0.05, 0.08]);
}

#[test]
fn test_top_k_weight() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    // weights of problem 5 are [3.0, -1.0, 3.0, 1.0]: the two occurrences
    // of 3.0 form the rank-group covering k = 1 and k = 2
    assert_eq!(engine.top_k_weight(5, 1).unwrap(), Some(3.0));
    assert_eq!(engine.top_k_weight(5, 2).unwrap(), Some(3.0));
    assert_eq!(engine.top_k_weight(5, 3).unwrap(), Some(1.0));
    assert_eq!(engine.top_k_weight(5, 4).unwrap(), None);
}

#[test]
fn test_top_k_weight_absent_cases() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    // no weight vector at all
    assert_eq!(engine.top_k_weight(4, 1).unwrap(), None);
    // all slots absent
    assert_eq!(engine.top_k_weight(2, 1).unwrap(), None);
    assert_eq!(
        engine.top_k_weight(5, 0),
        Err(QueryError::InvalidArgument("k must be at least 1"))
    );
}

#[test]
fn test_quantile_histogram() {
    let buckets = quantile_histogram(&[1.0, 2.0, 3.0, 4.0], 2).unwrap();
    assert_eq!(
        buckets,
        vec![
            HistogramBucket {
                lower: 1.0,
                upper: 2.5,
                count: 2
            },
            HistogramBucket {
                lower: 2.5,
                upper: 4.0,
                count: 2
            },
        ]
    );
}

#[test]
fn test_quantile_histogram_counts_sum_to_input_length() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let profits = engine.sorted_profits();
    let buckets = quantile_histogram(&profits, 3).unwrap();
    assert_eq!(buckets.len(), 3);
    let total: usize = buckets.iter().map(|bucket| bucket.count).sum();
    assert_eq!(total, profits.len());
    // the maximum lands in the last, inclusive bucket
    assert!(buckets.last().unwrap().count >= 1);
    assert_eq!(buckets.last().unwrap().upper, 0.12);
}

#[test]
fn test_quantile_histogram_all_equal_values() {
    let buckets = quantile_histogram(&[2.0; 5], 4).unwrap();
    assert_eq!(buckets[0].count, 5);
    assert!(buckets[1..].iter().all(|bucket| bucket.count == 0));
}

#[test]
fn test_quantile_histogram_invalid_arguments() {
    assert!(matches!(
        quantile_histogram(&[], 2),
        Err(QueryError::InvalidArgument(_))
    ));
    assert!(matches!(
        quantile_histogram(&[1.0], 0),
        Err(QueryError::InvalidArgument(_))
    ));
}

#[test]
fn test_quantile_means() {
    let means = quantile_means(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3).unwrap();
    assert_eq!(means, vec![1.5, 3.5, 5.5]);
    // the last chunk absorbs the remainder
    let means = quantile_means(&[1.0, 2.0, 3.0, 4.0, 5.0], 2).unwrap();
    assert_eq!(means, vec![1.5, 4.0]);
    assert!(matches!(
        quantile_means(&[], 2),
        Err(QueryError::InvalidArgument(_))
    ));
}

#[test]
fn test_risk_return_points() {
    let store = small_store();
    let engine = AnalyticsEngine::new(&store);
    let (risks, returns) = engine.risk_return_points();
    assert_eq!(risks.len(), 4);
    assert_eq!(risks.len(), returns.len());
}
