use std::collections::HashMap;

use crate::csv_parser::DatasetStore;
use crate::datastructures::*;

/// A small store covering all three datasets.
///
/// Problem 5 only has weights, problem 4 only has a value pair, so lookups
/// across maps exercise the absent cases.
pub fn small_store() -> DatasetStore {
    let status = HashMap::from([
        (1, StatusRecord::new(true, 2.0, 3)),
        (2, StatusRecord::new(false, 4.0, 1)),
        (3, StatusRecord::new(true, 1.5, 2)),
    ]);
    let weights = HashMap::from([
        (
            1,
            WeightVector::new(vec![Some(0.5), None, Some(0.25), Some(0.25)]),
        ),
        (2, WeightVector::new(vec![None, None, None, None])),
        (
            3,
            WeightVector::new(vec![Some(0.4), Some(0.0), Some(0.6), None]),
        ),
        (
            5,
            WeightVector::new(vec![
                Some(3.0),
                Some(-1.0),
                Some(3.0),
                Some(1.0),
            ]),
        ),
    ]);
    let values = HashMap::from([
        (1, ValuePair::new(0.02, 0.10)),
        (2, ValuePair::new(0.05, 0.07)),
        (3, ValuePair::new(0.02, 0.10)),
        (4, ValuePair::new(0.08, 0.12)),
    ]);
    DatasetStore::from_maps(status, weights, values)
}

/// A store with nothing loaded.
pub fn empty_store() -> DatasetStore {
    DatasetStore::from_maps(HashMap::new(), HashMap::new(), HashMap::new())
}
