use core::fmt;
use std::collections::HashMap;
use std::path::Path;

use polars::prelude::*;

use crate::datastructures::*;


/// Status records keyed by problem id.
pub type StatusMap = HashMap<ProblemId, StatusRecord>;
/// Weight vectors keyed by problem id.
pub type WeightMap = HashMap<ProblemId, WeightVector>;
/// Risk/return pairs keyed by problem id.
pub type ValueMap = HashMap<ProblemId, ValuePair>;

/// The three per-problem datasets of one experiment run.
///
/// Populated exactly once from the three record sources and read-only
/// afterwards. A problem id present in one map is not guaranteed present in
/// the others; lookups of unknown ids return `None`.
pub struct DatasetStore {
    status: StatusMap,
    weights: WeightMap,
    values: ValueMap,
}

impl DatasetStore {
    /// Loads the three record sources named by `config`.
    ///
    /// The loads are independent and order-insensitive: a failed source
    /// leaves its map empty (or partially populated up to the first bad row)
    /// and contributes a [`LoadError`], without affecting the other two.
    pub fn load(config: &Config) -> (Self, Vec<LoadError>) {
        let mut errors = Vec::new();
        let (status, status_error) = load_status_csv(&config.status_path);
        let (weights, weight_error) = load_weight_csv(&config.weight_path);
        let (values, value_error) = load_value_csv(&config.value_path);
        errors.extend(status_error);
        errors.extend(weight_error);
        errors.extend(value_error);
        (Self::from_maps(status, weights, values), errors)
    }

    /// Builds a store from already-populated maps.
    pub fn from_maps(
        status: StatusMap,
        weights: WeightMap,
        values: ValueMap,
    ) -> Self {
        Self {
            status,
            weights,
            values,
        }
    }

    /// The status record of `id`, if known.
    pub fn status(&self, id: ProblemId) -> Option<&StatusRecord> {
        self.status.get(&id)
    }

    /// The weight vector of `id`, if known.
    pub fn weights(&self, id: ProblemId) -> Option<&WeightVector> {
        self.weights.get(&id)
    }

    /// The risk/return pair of `id`, if known.
    pub fn value(&self, id: ProblemId) -> Option<&ValuePair> {
        self.values.get(&id)
    }

    /// All status records, in unspecified order.
    pub fn statuses(
        &self,
    ) -> impl Iterator<Item = (ProblemId, &StatusRecord)> + '_ {
        self.status.iter().map(|(&id, record)| (id, record))
    }

    /// All weight vectors, in unspecified order.
    pub fn weight_vectors(
        &self,
    ) -> impl Iterator<Item = (ProblemId, &WeightVector)> + '_ {
        self.weights.iter().map(|(&id, vector)| (id, vector))
    }

    /// All risk/return pairs, in unspecified order.
    pub fn values(&self) -> impl Iterator<Item = (ProblemId, &ValuePair)> + '_ {
        self.values.iter().map(|(&id, value)| (id, value))
    }

    /// Slot count of the loaded weight dataset (0 if none was loaded).
    pub fn vector_length(&self) -> usize {
        self.weights.values().map(WeightVector::len).max().unwrap_or(0)
    }
}

impl fmt::Display for DatasetStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} status records, {} weight vectors ({} slots), {} value pairs",
            self.status.len(),
            self.weights.len(),
            self.vector_length(),
            self.values.len()
        )
    }
}

/// Loads a status source: `problem (int), status (str), time (float),
/// variables (int)` under a header row. A problem counts as solved iff its
/// status column reads `optimal`.
pub fn load_status_csv(path: &Path) -> (StatusMap, Option<LoadError>) {
    let df = match read_source(path) {
        Ok(df) => df,
        Err(error) => return (StatusMap::new(), Some(error)),
    };
    let parsed = (|| -> PolarsResult<(StatusMap, Option<usize>)> {
        let id_series = df.column("problem")?.cast(&DataType::Int64)?;
        let status_series = df.column("status")?.cast(&DataType::Utf8)?;
        let time_series = df.column("time")?.cast(&DataType::Float64)?;
        let vars_series = df.column("variables")?.cast(&DataType::Float64)?;
        let ids = id_series.i64()?;
        let statuses = status_series.utf8()?;
        let times = time_series.f64()?;
        let variables = vars_series.f64()?;
        let mut map = StatusMap::new();
        let mut bad_row = None;
        for row in 0..df.height() {
            let record = match (
                ids.get(row).and_then(parse_problem_id),
                statuses.get(row),
                times.get(row).filter(|&t| t >= 0.0),
                variables.get(row).filter(|&v| v >= 0.0),
            ) {
                (Some(id), Some(status), Some(time), Some(vars)) => Some((
                    id,
                    StatusRecord::new(status == "optimal", time, vars as u32),
                )),
                _ => None,
            };
            match record {
                Some((id, record)) => {
                    map.insert(id, record);
                }
                None => {
                    bad_row = Some(row);
                    break;
                }
            }
        }
        Ok((map, bad_row))
    })();
    finish_load(path, parsed)
}

/// Loads a weight source: `problem (int)` followed by one float column per
/// slot under a header row. An empty cell is an absent slot, not a zero
/// weight; only an unparseable problem id counts as a malformed row.
pub fn load_weight_csv(path: &Path) -> (WeightMap, Option<LoadError>) {
    let df = match read_source(path) {
        Ok(df) => df,
        Err(error) => return (WeightMap::new(), Some(error)),
    };
    let parsed = (|| -> PolarsResult<(WeightMap, Option<usize>)> {
        let columns = df.get_columns();
        let id_series = columns[0].cast(&DataType::Int64)?;
        let ids = id_series.i64()?;
        let slot_series = columns[1..]
            .iter()
            .map(|series| series.cast(&DataType::Float64))
            .collect::<PolarsResult<Vec<_>>>()?;
        let slots = slot_series
            .iter()
            .map(|series| series.f64())
            .collect::<PolarsResult<Vec<_>>>()?;
        let mut map = WeightMap::new();
        let mut bad_row = None;
        for row in 0..df.height() {
            match ids.get(row).and_then(parse_problem_id) {
                Some(id) => {
                    let vector = WeightVector::new(
                        slots.iter().map(|slot| slot.get(row)).collect(),
                    );
                    map.insert(id, vector);
                }
                None => {
                    bad_row = Some(row);
                    break;
                }
            }
        }
        Ok((map, bad_row))
    })();
    finish_load(path, parsed)
}

/// Loads a value source: `problem (int), risk (float), return (float)` under
/// a header row.
pub fn load_value_csv(path: &Path) -> (ValueMap, Option<LoadError>) {
    let df = match read_source(path) {
        Ok(df) => df,
        Err(error) => return (ValueMap::new(), Some(error)),
    };
    let parsed = (|| -> PolarsResult<(ValueMap, Option<usize>)> {
        let id_series = df.column("problem")?.cast(&DataType::Int64)?;
        let risk_series = df.column("risk")?.cast(&DataType::Float64)?;
        let return_series = df.column("return")?.cast(&DataType::Float64)?;
        let ids = id_series.i64()?;
        let risks = risk_series.f64()?;
        let returns = return_series.f64()?;
        let mut map = ValueMap::new();
        let mut bad_row = None;
        for row in 0..df.height() {
            match (
                ids.get(row).and_then(parse_problem_id),
                risks.get(row),
                returns.get(row),
            ) {
                (Some(id), Some(risk), Some(ret)) => {
                    map.insert(id, ValuePair::new(risk, ret));
                }
                _ => {
                    bad_row = Some(row);
                    break;
                }
            }
        }
        Ok((map, bad_row))
    })();
    finish_load(path, parsed)
}

fn read_source(path: &Path) -> Result<DataFrame, LoadError> {
    CsvReader::from_path(path)
        .and_then(|reader| reader.has_header(true).finish())
        .map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_problem_id(raw: i64) -> Option<ProblemId> {
    ProblemId::try_from(raw).ok().filter(|&id| id > 0)
}

fn finish_load<T: Default>(
    path: &Path,
    parsed: PolarsResult<(T, Option<usize>)>,
) -> (T, Option<LoadError>) {
    match parsed {
        Ok((map, None)) => (map, None),
        Ok((map, Some(row))) => {
            let error = LoadError::MalformedRow {
                path: path.to_path_buf(),
                // data row index -> 1-based file line behind the header
                line: row + 2,
                kept: row,
            };
            (map, Some(error))
        }
        Err(source) => (
            T::default(),
            Some(LoadError::Unreadable {
                path: path.to_path_buf(),
                source,
            }),
        ),
    }
}
