#![warn(missing_docs)]
//! Analytical queries over the datasets of a portfolio-optimization
//! experiment.
//!
//! Three parallel record sources, all keyed by problem id, describe one
//! experiment run: solver status (solved flag, elapsed time, variable
//! count), decision-variable weight vectors, and risk/return outcomes. This
//! crate loads them into an in-memory [`csv_parser::DatasetStore`] and
//! answers queries over it through the [`analytics::AnalyticsEngine`]:
//! timing aggregates, solved-time windows, profit/risk rankings with
//! tie-consistent top-n selection, quantile histograms, and per-problem
//! top-k weight extraction.
//!
//! Rendering and interactive menus are external collaborators: the engine
//! hands finished histogram buckets and parallel scatter coordinates to
//! whatever wants to draw them. The `report` executable included here is
//! such a collaborator; it writes its charts as csv files.
//!
//! Example
//! ```rust
//! use portfolio_analytics::analytics::{self, AnalyticsEngine};
//! use portfolio_analytics::csv_parser::DatasetStore;
//! use portfolio_analytics::datastructures::Config;
//! # use anyhow::Result;
//!
//! fn example() -> Result<()> {
//!     // each source is a csv with a header row and a problem id column:
//!     // status:  problem(int),status(str),time(float),variables(int)
//!     // weights: problem(int),w1(float),...,wN(float), empty cell = absent
//!     // values:  problem(int),risk(float),return(float)
//!     let config: Config = serde_json::from_str(
//!         r#"{
//!             "status_path": "result_status.csv",
//!             "weight_path": "result_weight.csv",
//!             "value_path": "result_value.csv"
//!         }"#,
//!     )?;
//!
//!     // a broken source only empties its own dataset
//!     let (store, load_errors) = DatasetStore::load(&config);
//!     for error in &load_errors {
//!         eprintln!("{error}");
//!     }
//!
//!     let engine = AnalyticsEngine::new(&store);
//!     println!("total solver time: {}s", engine.total_elapsed_time());
//!     let safest = engine.rank_by_risk().top_n(5);
//!     println!("safest portfolios: {safest:?}");
//!     let histogram =
//!         analytics::quantile_histogram(&engine.sorted_profits(), 20)?;
//!     println!("{} buckets", histogram.len());
//!     Ok(())
//! }
//! ```

/// The analytical query layer over a loaded dataset store.
pub mod analytics;

/// Csv loaders for the three record sources and the dataset store they
/// populate.
pub mod csv_parser;

/// Core data model, configuration and error types.
pub mod datastructures;

/// Grouped ranking: the sorted frequency accumulator shared by top-n
/// selection and top-k weight lookup.
pub mod ranking;

/// Fixtures shared by unit and integration tests.
#[doc(hidden)]
pub mod test_utils;
