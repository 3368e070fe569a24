use std::{fs, path::Path, path::PathBuf};

use anyhow::{ensure, Result};
use clap::Parser;
use itertools::Itertools;
use polars::prelude::*;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
struct DistributionConfig {
    mean: f64,
    std: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct DataGeneratorConfig {
    num_problems: usize,
    vector_length: usize,
    /// Probability that a weight slot is present.
    weight_density: f64,
    /// Fraction of problems solved to optimality.
    optimal_ratio: f64,
    time: DistributionConfig,
    risk: DistributionConfig,
    ret: DistributionConfig,
    seed: u64,
    out_dir: PathBuf,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    /// Path to the json config
    #[arg(short, long)]
    pub config: PathBuf,
}

struct GeneratedDatasets {
    status: DataFrame,
    weights: DataFrame,
    values: DataFrame,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config: DataGeneratorConfig =
        serde_json::from_str(&fs::read_to_string(args.config)?)?;
    let out_dir = config.out_dir.clone();
    fs::create_dir_all(&out_dir)?;
    let mut datasets = generate_datasets(&config)?;
    write_csv(&mut datasets.status, &out_dir.join("result_status.csv"))?;
    write_csv(&mut datasets.weights, &out_dir.join("result_weight.csv"))?;
    write_csv(&mut datasets.values, &out_dir.join("result_value.csv"))?;
    Ok(())
}

fn generate_datasets(
    config: &DataGeneratorConfig,
) -> Result<GeneratedDatasets> {
    ensure!(
        (0.0..=1.0).contains(&config.weight_density),
        "weight density must be a probability"
    );
    ensure!(
        (0.0..=1.0).contains(&config.optimal_ratio),
        "optimal ratio must be a probability"
    );
    let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
    let time_distribution =
        Normal::new(config.time.mean, config.time.std.abs())?;
    let risk_distribution =
        Normal::new(config.risk.mean, config.risk.std.abs())?;
    let return_distribution =
        Normal::new(config.ret.mean, config.ret.std.abs())?;

    let problems = (1..=config.num_problems as u32).collect_vec();
    let slot_columns = generate_weight_slots(config, &mut rng);
    let variable_counts = (0..config.num_problems)
        .map(|row| {
            slot_columns
                .iter()
                .filter(|column| column[row].is_some())
                .count() as u32
        })
        .collect_vec();

    let status = df! {
        "problem" => problems.clone(),
        "status" => (0..config.num_problems)
            .map(|_| {
                if rng.gen_bool(config.optimal_ratio) {
                    "optimal"
                } else {
                    "timeout"
                }
            })
            .collect_vec(),
        "time" => (0..config.num_problems)
            .map(|_| time_distribution.sample(&mut rng).abs())
            .collect_vec(),
        "variables" => variable_counts,
    }?;

    let weight_series = std::iter::once(Series::new("problem", &problems))
        .chain(slot_columns.iter().enumerate().map(|(slot, column)| {
            Series::new(&format!("w{}", slot + 1), column)
        }))
        .collect_vec();
    let weights = DataFrame::new(weight_series)?;

    let values = df! {
        "problem" => problems,
        "risk" => (0..config.num_problems)
            .map(|_| risk_distribution.sample(&mut rng).abs())
            .collect_vec(),
        "return" => (0..config.num_problems)
            .map(|_| return_distribution.sample(&mut rng))
            .collect_vec(),
    }?;

    Ok(GeneratedDatasets {
        status,
        weights,
        values,
    })
}

/// One column per slot; each problem's present weights are normalized to
/// sum to 1 like a real portfolio allocation.
fn generate_weight_slots(
    config: &DataGeneratorConfig,
    rng: &mut ChaCha8Rng,
) -> Vec<Vec<Option<f64>>> {
    let mut columns =
        vec![vec![None; config.num_problems]; config.vector_length];
    for row in 0..config.num_problems {
        let raw = (0..config.vector_length)
            .map(|_| {
                rng.gen_bool(config.weight_density)
                    .then(|| rng.gen::<f64>())
            })
            .collect_vec();
        let total: f64 = raw.iter().flatten().sum();
        for (slot, weight) in raw.into_iter().enumerate() {
            columns[slot][row] = if total > 0.0 {
                weight.map(|w| w / total)
            } else {
                weight
            };
        }
    }
    columns
}

fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file = fs::File::create(path)?;
    CsvWriter::new(&mut file).finish(df)?;
    Ok(())
}
