use anyhow::Result;
use clap::Parser;
use itertools::Itertools;
use log::{info, warn};
use ndarray::Array1;
use polars::prelude::*;
use std::fs;
use std::path::Path;

use portfolio_analytics::analytics::{self, AnalyticsEngine};
use portfolio_analytics::csv_parser::DatasetStore;
use portfolio_analytics::datastructures::*;

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbosity.log_level_filter())
        .init();
    let config = {
        let Ok(config) = Config::from_cli(&args) else { std::process::exit(exitcode::CONFIG); };
        CONFIG.set(config).ok();
        Config::global()
    };
    fs::create_dir_all(&config.out_dir)?;
    let (store, load_errors) = DatasetStore::load(config);
    for error in &load_errors {
        warn!("{error}");
    }
    info!("{store}");
    let engine = AnalyticsEngine::new(&store);

    info!("total solver time: {:.6}s", engine.total_elapsed_time());
    match engine.solved_percentage() {
        Ok(percentage) => info!("solved to optimality: {percentage:.2}%"),
        Err(error) => warn!("{error}"),
    }
    if let Some(time_limit) = config.time_limit {
        let solved = engine
            .problems_solved_within_time(time_limit, 0.0)
            .into_iter()
            .sorted()
            .collect_vec();
        info!(
            "{} problems solved within {time_limit}s: {solved:?}",
            solved.len()
        );
    }

    let top_profits = engine.rank_by_profit().top_n(config.top_n);
    info!(
        "top {} problems by return (ties included): {top_profits:?}",
        config.top_n
    );
    let safest = engine.rank_by_risk().top_n(config.top_n);
    info!(
        "top {} problems by lowest risk (ties included): {safest:?}",
        config.top_n
    );

    let profits = engine.sorted_profits();
    let risks = engine.sorted_risks();
    for (name, values) in [("return", &profits), ("risk", &risks)] {
        match analytics::quantile_histogram(values, config.buckets) {
            Ok(histogram) => write_histogram_csv(
                &histogram,
                &config.out_dir.join(format!("{name}_histogram.csv")),
            )?,
            Err(error) => warn!("no {name} histogram: {error}"),
        }
    }

    let (frontier_risks, frontier_returns) = engine.risk_return_points();
    write_scatter_csv(
        &frontier_risks,
        &frontier_returns,
        &config.out_dir.join("efficient_frontier.csv"),
    )?;
    Ok(())
}

fn write_histogram_csv(
    histogram: &[HistogramBucket],
    path: &Path,
) -> Result<()> {
    let mut df = df! {
        "lower" => histogram.iter().map(|bucket| bucket.lower).collect_vec(),
        "upper" => histogram.iter().map(|bucket| bucket.upper).collect_vec(),
        "count" => histogram
            .iter()
            .map(|bucket| bucket.count as u32)
            .collect_vec(),
    }?;
    let mut file = fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}

fn write_scatter_csv(
    risks: &Array1<f64>,
    returns: &Array1<f64>,
    path: &Path,
) -> Result<()> {
    let mut df = df! {
        "risk" => risks.to_vec(),
        "return" => returns.to_vec(),
    }?;
    let mut file = fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(&mut df)?;
    Ok(())
}
