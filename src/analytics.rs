use itertools::Itertools;
use ndarray::Array1;

use crate::csv_parser::DatasetStore;
use crate::datastructures::*;
use crate::ranking::{Direction, GroupedRanking};

#[cfg(test)]
mod tests;

/// Stateless query layer over a loaded [`DatasetStore`].
///
/// Every operation is a pure, idempotent, in-memory computation; there is no
/// lifecycle beyond "loaded" and "queried".
pub struct AnalyticsEngine<'a> {
    store: &'a DatasetStore,
}

impl<'a> AnalyticsEngine<'a> {
    /// Creates a query view over `store`.
    pub fn new(store: &'a DatasetStore) -> Self {
        Self { store }
    }

    /// Sum of the elapsed solver time over all status records.
    ///
    /// An empty store sums to 0.0.
    pub fn total_elapsed_time(&self) -> f64 {
        self.store
            .statuses()
            .map(|(_, record)| record.time_taken)
            .sum()
    }

    /// Mean elapsed time over the problems whose weight vector has a
    /// present, non-zero value at `index`.
    ///
    /// An out-of-range index matches no problem and yields 0.0, as does an
    /// index no problem has a weight for.
    pub fn average_time_for_variable(&self, index: usize) -> f64 {
        let times = self
            .store
            .statuses()
            .filter(|(id, _)| {
                self.store
                    .weights(*id)
                    .and_then(|weights| weights.get(index))
                    .map_or(false, |weight| weight != 0.0)
            })
            .map(|(_, record)| record.time_taken)
            .collect_vec();
        if times.is_empty() {
            return 0.0;
        }
        times.iter().sum::<f64>() / times.len() as f64
    }

    /// Ids of the problems solved within `[lower_bound, upper_bound]`
    /// inclusive, in unspecified order.
    ///
    /// A negative lower bound is clamped to 0.0.
    pub fn problems_solved_within_time(
        &self,
        upper_bound: f64,
        lower_bound: f64,
    ) -> Vec<ProblemId> {
        let lower_bound = lower_bound.max(0.0);
        self.store
            .statuses()
            .filter(|(_, record)| {
                record.time_taken >= lower_bound
                    && record.time_taken <= upper_bound
            })
            .map(|(id, _)| id)
            .collect()
    }

    /// The return component of the problem's value pair, or `None` for an
    /// unknown id.
    pub fn profit_for_problem(&self, id: ProblemId) -> Option<f64> {
        self.store.value(id).map(|value| value.ret)
    }

    /// Percentage (0-100) of status records that solved to optimality.
    ///
    /// An empty store makes the ratio undefined and is reported as
    /// [`QueryError::EmptyDataset`] rather than a silent 0 or NaN.
    pub fn solved_percentage(&self) -> Result<f64, QueryError> {
        let total = self.store.statuses().count();
        if total == 0 {
            return Err(QueryError::EmptyDataset);
        }
        let solved = self
            .store
            .statuses()
            .filter(|(_, record)| record.optimal)
            .count();
        Ok(100.0 * solved as f64 / total as f64)
    }

    /// Ascending multiset of all return values, duplicates preserved.
    pub fn sorted_profits(&self) -> Vec<f64> {
        self.store
            .values()
            .map(|(_, value)| value.ret)
            .sorted_by(f64::total_cmp)
            .collect()
    }

    /// Ascending multiset of all risk values, duplicates preserved.
    pub fn sorted_risks(&self) -> Vec<f64> {
        self.store
            .values()
            .map(|(_, value)| value.risk)
            .sorted_by(f64::total_cmp)
            .collect()
    }

    /// Problem ids grouped by exact return value, walked profit-descending.
    ///
    /// This is the canonical ordering for top-n selection by profit; consume
    /// it through [`GroupedRanking::top_n`].
    pub fn rank_by_profit(&self) -> GroupedRanking<ProblemId> {
        GroupedRanking::from_entries(
            Direction::Descending,
            self.store.values().map(|(id, value)| (value.ret, id)),
        )
    }

    /// Problem ids grouped by exact risk value, walked risk-ascending.
    pub fn rank_by_risk(&self) -> GroupedRanking<ProblemId> {
        GroupedRanking::from_entries(
            Direction::Ascending,
            self.store.values().map(|(id, value)| (value.risk, id)),
        )
    }

    /// The k-th largest distinct positive weight of the problem's vector.
    ///
    /// Occurrences of the same weight form one rank-group, consistent with
    /// the grouped-ranking policy: counts accumulate by descending distinct
    /// value until they reach `k`. Returns `None` if the vector is missing
    /// or empty, holds no positive weight, or `k` exceeds the number of
    /// positive weight occurrences. `k < 1` is an argument error.
    pub fn top_k_weight(
        &self,
        id: ProblemId,
        k: usize,
    ) -> Result<Option<f64>, QueryError> {
        if k < 1 {
            return Err(QueryError::InvalidArgument("k must be at least 1"));
        }
        let Some(weights) = self.store.weights(id) else {
            return Ok(None);
        };
        let ranking = GroupedRanking::from_entries(
            Direction::Descending,
            weights.positive_weights().map(|weight| (weight, ())),
        );
        Ok(ranking.kth_value(k))
    }

    /// Parallel (risk, return) coordinate arrays for an external scatter
    /// renderer (efficient frontier).
    pub fn risk_return_points(&self) -> (Array1<f64>, Array1<f64>) {
        let (risks, returns): (Vec<f64>, Vec<f64>) = self
            .store
            .values()
            .map(|(_, value)| (value.risk, value.ret))
            .unzip();
        (Array1::from_vec(risks), Array1::from_vec(returns))
    }
}

/// Fixed-bucket-count frequency distribution over `sorted_values`.
///
/// The value range is split into `bucket_count` equal spans; bucket `i`
/// covers `[min + i * range, min + (i + 1) * range)` except the last bucket,
/// whose upper bound is exactly the maximum (inclusive) so the maximum is
/// always counted. All-equal input degenerates to everything in bucket 0.
/// Bucket counts sum to the input length.
pub fn quantile_histogram(
    sorted_values: &[f64],
    bucket_count: usize,
) -> Result<Vec<HistogramBucket>, QueryError> {
    check_quantile_args(sorted_values, bucket_count)?;
    let min = sorted_values[0];
    let max = sorted_values[sorted_values.len() - 1];
    let range = (max - min) / bucket_count as f64;
    let mut buckets = (0..bucket_count)
        .map(|i| {
            let lower = min + i as f64 * range;
            let upper = if i == bucket_count - 1 { max } else { lower + range };
            HistogramBucket {
                lower,
                upper,
                count: 0,
            }
        })
        .collect_vec();
    for &value in sorted_values {
        let index = if range == 0.0 {
            0
        } else {
            // clamp absorbs floating-point overshoot at the top
            (((value - min) / range) as usize).min(bucket_count - 1)
        };
        buckets[index].count += 1;
    }
    Ok(buckets)
}

/// Mean per equal-size chunk of `sorted_values`, split into `divisions`
/// chunks with the last chunk absorbing the remainder.
///
/// A chunk left empty by integer division reports a mean of 0.0.
pub fn quantile_means(
    sorted_values: &[f64],
    divisions: usize,
) -> Result<Vec<f64>, QueryError> {
    check_quantile_args(sorted_values, divisions)?;
    let total = sorted_values.len();
    let chunk_size = total / divisions;
    Ok((0..divisions)
        .map(|i| {
            let start = i * chunk_size;
            let end = if i == divisions - 1 {
                total
            } else {
                start + chunk_size
            };
            let chunk = &sorted_values[start..end];
            if chunk.is_empty() {
                0.0
            } else {
                chunk.iter().sum::<f64>() / chunk.len() as f64
            }
        })
        .collect())
}

fn check_quantile_args(
    sorted_values: &[f64],
    bucket_count: usize,
) -> Result<(), QueryError> {
    if sorted_values.is_empty() {
        return Err(QueryError::InvalidArgument(
            "input values must be non-empty",
        ));
    }
    if bucket_count < 1 {
        return Err(QueryError::InvalidArgument(
            "bucket count must be at least 1",
        ));
    }
    Ok(())
}
