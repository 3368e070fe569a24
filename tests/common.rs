use std::path::PathBuf;

use portfolio_analytics::datastructures::Config;

pub fn default_config() -> Config {
    Config {
        status_path: PathBuf::from("data/test/status.csv"),
        weight_path: "data/test/weights.csv".into(),
        value_path: "data/test/values.csv".into(),
        buckets: 2,
        top_n: 2,
        time_limit: None,
        out_dir: std::env::temp_dir(),
    }
}
