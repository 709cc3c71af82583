use std::path::PathBuf;

use anyhow::{Context, Result};

use matchday_features::cli::{has_flag, init_env_and_tracing, path_arg};
use matchday_features::dataset_io::{export_xlsx, load_team_records, save_feature_csv};
use matchday_features::dataset_store;
use matchday_features::pipeline::{PipelineConfig, build_feature_dataset};
use matchday_features::ratings::RatingSeriesStore;
use matchday_features::team_names::team_names;

const DEFAULT_MATCHES: &str = "data/raw/matches.csv";
const DEFAULT_RATINGS_DIR: &str = "data/raw/team_elos";
const DEFAULT_TEAM_MAP: &str = "data/raw/elo_api_name_to_team_map.json";
const DEFAULT_OUT: &str = "data/processed/matches_features.csv";

fn main() -> Result<()> {
    init_env_and_tracing();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let matches = path_arg(&args, "matches").unwrap_or_else(|| PathBuf::from(DEFAULT_MATCHES));
    let ratings_dir =
        path_arg(&args, "ratings-dir").unwrap_or_else(|| PathBuf::from(DEFAULT_RATINGS_DIR));
    let team_map = path_arg(&args, "team-map").unwrap_or_else(|| PathBuf::from(DEFAULT_TEAM_MAP));
    let out = path_arg(&args, "out").unwrap_or_else(|| PathBuf::from(DEFAULT_OUT));

    let mut cfg = match path_arg(&args, "config") {
        Some(path) => PipelineConfig::load(&path)?,
        None => PipelineConfig::default(),
    }
    .with_env_overrides()?;
    if has_flag(&args, "keep-incomplete") {
        cfg.drop_incomplete = false;
    }

    let names = team_names(&team_map)?;
    let store = RatingSeriesStore::load_dir(&ratings_dir, names)?;
    let records = load_team_records(&matches)?;

    let (dataset, report) =
        build_feature_dataset(&records, &store, &cfg).context("build feature dataset")?;
    save_feature_csv(&out, &dataset)?;

    if let Some(path) = path_arg(&args, "xlsx") {
        export_xlsx(&path, &dataset)?;
    }
    let stored = match path_arg(&args, "db") {
        Some(path) => {
            let mut conn = dataset_store::open_db(&path)?;
            Some(dataset_store::save_dataset(&mut conn, &dataset)?)
        }
        None => None,
    };

    println!("Feature dataset complete");
    println!("Output: {}", out.display());
    println!(
        "Team rows: {} (neutral relabeled {}, synthesized {})",
        report.consolidation.records,
        report.consolidation.neutral_relabeled,
        report.consolidation.synthesized
    );
    println!("Fixtures: {}", report.consolidation.fixtures);
    println!(
        "{} fixtures: {} -> {} rows",
        cfg.target_competition, report.target_fixtures, report.output_rows
    );
    println!("Feature columns: {}", report.feature_columns);
    if let Some(rows) = stored {
        println!("SQLite rows upserted: {rows}");
    }

    Ok(())
}
