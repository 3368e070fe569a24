use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Key wrapper giving f64 the total order required by [`BTreeMap`].
#[derive(Debug, Clone, Copy, PartialEq)]
struct SortKey(f64);

impl Eq for SortKey {}

impl PartialOrd for SortKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SortKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Walk order of a [`GroupedRanking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Smallest key first (e.g. risk).
    Ascending,
    /// Largest key first (e.g. profit, weight).
    Descending,
}

/// Sorted frequency accumulator: an ordered mapping from distinct f64 key to
/// the bucket of members sharing that exact key.
///
/// Members with equal keys form one rank-group position. Both grouped top-n
/// selection and top-k weight lookup are walks over this structure, so ties
/// are handled consistently: a bucket is always consumed as a whole.
#[derive(Debug, Clone)]
pub struct GroupedRanking<M> {
    buckets: BTreeMap<SortKey, Vec<M>>,
    direction: Direction,
}

impl<M> GroupedRanking<M> {
    /// Creates an empty ranking walked in the given direction.
    pub fn new(direction: Direction) -> Self {
        Self {
            buckets: BTreeMap::new(),
            direction,
        }
    }

    /// Builds a ranking from `(key, member)` pairs.
    pub fn from_entries(
        direction: Direction,
        entries: impl IntoIterator<Item = (f64, M)>,
    ) -> Self {
        let mut ranking = Self::new(direction);
        for (key, member) in entries {
            ranking.insert(key, member);
        }
        ranking
    }

    /// Appends `member` to the bucket of `key`.
    pub fn insert(&mut self, key: f64, member: M) {
        self.buckets.entry(SortKey(key)).or_default().push(member);
    }

    /// Number of distinct keys.
    pub fn num_groups(&self) -> usize {
        self.buckets.len()
    }

    /// Total number of members across all buckets.
    pub fn num_members(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    /// Whether the ranking holds no members.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// `(key, bucket)` pairs in the ranking's walk order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, &[M])> + '_ {
        let buckets: Box<dyn Iterator<Item = (&SortKey, &Vec<M>)> + '_> =
            match self.direction {
                Direction::Ascending => Box::new(self.buckets.iter()),
                Direction::Descending => Box::new(self.buckets.iter().rev()),
            };
        buckets.map(|(key, bucket)| (key.0, bucket.as_slice()))
    }

    /// The members of the best-ranked buckets, accumulated bucket by bucket
    /// until at least `n` members are collected.
    ///
    /// Ties are never split, so the last consumed bucket may push the result
    /// past `n`. Members keep their bucket order.
    pub fn top_n(&self, n: usize) -> Vec<M>
    where
        M: Clone,
    {
        let mut result = Vec::new();
        for (_, bucket) in self.iter() {
            if result.len() >= n {
                break;
            }
            result.extend_from_slice(bucket);
        }
        result
    }

    /// The key of the rank-group containing the k-th member (1-based) by
    /// cumulative bucket size, or `None` if `k` exceeds the member count.
    pub fn kth_value(&self, k: usize) -> Option<f64> {
        if k == 0 {
            return None;
        }
        let mut seen = 0;
        for (key, bucket) in self.iter() {
            seen += bucket.len();
            if seen >= k {
                return Some(key);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profit_ranking() -> GroupedRanking<u32> {
        GroupedRanking::from_entries(
            Direction::Descending,
            [(0.1, 1), (0.3, 2), (0.1, 3), (0.2, 4)],
        )
    }

    #[test]
    fn test_walk_order() {
        let ranking = profit_ranking();
        let keys: Vec<f64> = ranking.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![0.3, 0.2, 0.1]);
        let ascending = GroupedRanking::from_entries(
            Direction::Ascending,
            [(0.1, 1), (0.3, 2), (0.1, 3), (0.2, 4)],
        );
        let keys: Vec<f64> = ascending.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_top_n_never_splits_buckets() {
        let ranking = profit_ranking();
        assert_eq!(ranking.top_n(1), vec![2]);
        assert_eq!(ranking.top_n(2), vec![2, 4]);
        // the tie bucket at 0.1 overshoots n
        assert_eq!(ranking.top_n(3), vec![2, 4, 1, 3]);
        assert_eq!(ranking.top_n(100), vec![2, 4, 1, 3]);
        assert!(ranking.top_n(0).is_empty());
    }

    #[test]
    fn test_kth_value_groups_ties() {
        let ranking = GroupedRanking::from_entries(
            Direction::Descending,
            [(3.0, ()), (3.0, ()), (1.0, ())],
        );
        assert_eq!(ranking.kth_value(1), Some(3.0));
        assert_eq!(ranking.kth_value(2), Some(3.0));
        assert_eq!(ranking.kth_value(3), Some(1.0));
        assert_eq!(ranking.kth_value(4), None);
        assert_eq!(ranking.kth_value(0), None);
    }

    #[test]
    fn test_member_counts() {
        let ranking = profit_ranking();
        assert_eq!(ranking.num_groups(), 3);
        assert_eq!(ranking.num_members(), 4);
        assert!(!ranking.is_empty());
        assert!(GroupedRanking::<u32>::new(Direction::Ascending).is_empty());
    }
}
