use core::fmt;
use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use once_cell::sync::OnceCell;
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a single portfolio-optimization problem, unique within a run.
pub type ProblemId = u32;

/// Solver outcome for one problem.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    /// Whether the solver terminated with an optimal solution.
    pub optimal: bool,
    /// Elapsed solver time in seconds.
    pub time_taken: f64,
    /// Number of decision variables of the problem.
    pub variable_count: u32,
}

impl StatusRecord {
    /// Creates a status record.
    pub fn new(optimal: bool, time_taken: f64, variable_count: u32) -> Self {
        Self {
            optimal,
            time_taken,
            variable_count,
        }
    }
}

/// Solved decision-variable weights of one problem.
///
/// Slots are index-addressed and fixed-length per dataset. An absent slot is
/// distinct from a zero weight: zero is a valid (excluded) weight under the
/// top-k ranking rule, absent means the source recorded no value at all.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WeightVector(Vec<Option<f64>>);

impl WeightVector {
    /// Wraps the per-slot weights, `None` marking absent slots.
    pub fn new(slots: Vec<Option<f64>>) -> Self {
        Self(slots)
    }

    /// The weight at `index`, or `None` if the slot is absent or out of range.
    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied().flatten()
    }

    /// Number of slots, absent ones included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the vector has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// All present, strictly positive weights in slot order.
    pub fn positive_weights(&self) -> impl Iterator<Item = f64> + '_ {
        self.0.iter().filter_map(|w| *w).filter(|&w| w > 0.0)
    }
}

/// Risk/return outcome recorded for one problem.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValuePair {
    /// Risk metric of the portfolio.
    pub risk: f64,
    /// Return (profit) metric of the portfolio.
    pub ret: f64,
}

impl ValuePair {
    /// Creates a risk/return pair.
    pub fn new(risk: f64, ret: f64) -> Self {
        Self { risk, ret }
    }
}

/// One bucket of a quantile histogram, handed to an external renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistogramBucket {
    /// Inclusive lower bound of the bucket.
    pub lower: f64,
    /// Upper bound, exclusive except for the last bucket.
    pub upper: f64,
    /// Number of values falling into the bucket.
    pub count: usize,
}

/// Failure to load one record source. Sources load independently, so an
/// error affects only its own dataset.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The source file is missing, unreadable or structurally broken.
    #[error("could not read {path}: {source}")]
    Unreadable {
        /// Path of the affected source.
        path: PathBuf,
        /// Underlying reader error.
        #[source]
        source: PolarsError,
    },
    /// A row failed to parse. Loading stops at the first bad row and keeps
    /// the rows parsed so far.
    #[error("malformed row in {path} at line {line}, keeping {kept} rows")]
    MalformedRow {
        /// Path of the affected source.
        path: PathBuf,
        /// 1-based line number, header included.
        line: usize,
        /// Number of rows kept from before the bad row.
        kept: usize,
    },
}

/// Failure of an analytical query due to a caller-supplied argument or an
/// empty dataset.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum QueryError {
    /// A parameter is outside the operation's contract.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    /// The queried dataset has no records, so the ratio is undefined.
    #[error("no status records loaded, solved percentage is undefined")]
    EmptyDataset,
}

/// Runtime configuration of the report front end, read from json.
#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// Path to the status record source.
    pub status_path: PathBuf,
    /// Path to the weight vector source.
    pub weight_path: PathBuf,
    /// Path to the risk/return value source.
    pub value_path: PathBuf,
    /// Number of histogram buckets.
    #[serde(default = "default_buckets")]
    pub buckets: usize,
    /// Number of top-ranked problems to report.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Solved-time window to report, in seconds.
    #[serde(default)]
    pub time_limit: Option<f64>,
    /// Directory for the rendered csv outputs.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
}

/// Global configuration, set once by the binaries.
pub static CONFIG: OnceCell<Config> = OnceCell::new();

impl Config {
    /// Reads the json config and applies the command line overrides.
    pub fn from_cli(args: &Args) -> Result<Config> {
        let config_str = fs::read_to_string(&args.config)?;
        let mut config: Config = serde_json::from_str(&config_str)?;
        if let Some(buckets) = args.buckets {
            config.buckets = buckets;
        }
        if let Some(top_n) = args.top_n {
            config.top_n = top_n;
        }
        if let Some(time_limit) = args.time_limit {
            config.time_limit = Some(time_limit);
        }
        if let Some(out_dir) = &args.out_dir {
            config.out_dir = out_dir.to_path_buf();
        }
        Ok(config)
    }

    /// The process-wide configuration. Must be set before first use.
    pub fn global() -> &'static Config {
        CONFIG.get().expect("config is not initialized")
    }
}

fn default_buckets() -> usize {
    20
}

fn default_top_n() -> usize {
    5
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("output")
}

/// Command line arguments of the report front end.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Path to the json config
    #[arg(short, long)]
    pub config: PathBuf,
    /// Override the number of histogram buckets
    #[arg(short, long)]
    pub buckets: Option<usize>,
    /// Override the number of top-ranked problems to report
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,
    /// Override the solved-time window in seconds
    #[arg(short, long)]
    pub time_limit: Option<f64>,
    /// Override the output directory
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,
    #[command(flatten)]
    #[allow(missing_docs)]
    pub verbosity: Verbosity,
}

impl fmt::Display for StatusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "optimal: {}, time: {}s, variables: {}",
            self.optimal, self.time_taken, self.variable_count
        )
    }
}
