use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use matchday_features::cli::{arg_value, init_env_and_tracing, path_arg};
use matchday_features::rating_report::{monthly_ratings, write_monthly_csv};
use matchday_features::ratings::RatingSeriesStore;
use matchday_features::team_names::team_names;

const DEFAULT_RATINGS_DIR: &str = "data/raw/team_elos";
const DEFAULT_TEAM_MAP: &str = "data/raw/elo_api_name_to_team_map.json";

fn main() -> Result<()> {
    init_env_and_tracing();
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let teams = parse_teams(&args);
    if teams.is_empty() {
        return Err(anyhow!(
            "usage: rating_report [--from YEAR] [--to YEAR] [--out FILE] TEAM..."
        ));
    }
    let start_year = year_arg(&args, "from")?.unwrap_or(2020);
    let end_year = year_arg(&args, "to")?.unwrap_or(2025);
    if end_year < start_year {
        return Err(anyhow!("--to {end_year} is before --from {start_year}"));
    }

    let ratings_dir =
        path_arg(&args, "ratings-dir").unwrap_or_else(|| PathBuf::from(DEFAULT_RATINGS_DIR));
    let team_map = path_arg(&args, "team-map").unwrap_or_else(|| PathBuf::from(DEFAULT_TEAM_MAP));
    let names = team_names(&team_map)?;
    let store = RatingSeriesStore::load_dir(&ratings_dir, names)?;
    if store.is_empty() {
        return Err(anyhow!("no rating series found in {}", ratings_dir.display()));
    }

    let report = monthly_ratings(&store, &teams, start_year, end_year);
    match path_arg(&args, "out") {
        Some(path) => {
            let file = std::fs::File::create(&path)
                .with_context(|| format!("create report {}", path.display()))?;
            write_monthly_csv(file, &report)?;
        }
        None => write_monthly_csv(std::io::stdout().lock(), &report)?,
    }
    Ok(())
}

fn year_arg(args: &[String], name: &str) -> Result<Option<i32>> {
    arg_value(args, name)
        .map(|raw| {
            raw.parse::<i32>()
                .map_err(|_| anyhow!("--{name} expects a year, got {raw:?}"))
        })
        .transpose()
}

// Positional arguments are team names; flags and their values are skipped.
fn parse_teams(args: &[String]) -> Vec<String> {
    let mut out = Vec::new();
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if let Some(flag) = arg.strip_prefix("--") {
            skip_next = !flag.contains('=');
            continue;
        }
        out.push(arg.clone());
    }
    out
}
