use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::consolidate::{ConsolidationSummary, consolidate_with_summary};
use crate::error::{FeatureError, FeatureResult};
use crate::fixture::FeatureDataset;
use crate::match_context::{add_calendar_details, add_ratio_stats};
use crate::rating_join::join_ratings;
use crate::ratings::RatingSeriesStore;
use crate::rest_days::compute_rest_days;
use crate::rolling::{RollingPass, add_rolling_difference, apply_rolling_pass};
use crate::team_record::TeamMatchRecord;

pub const ENV_TARGET_COMP: &str = "MATCHDAY_TARGET_COMP";
pub const ENV_RATING_CUTOFF: &str = "MATCHDAY_RATING_CUTOFF";
pub const ENV_DROP_INCOMPLETE: &str = "MATCHDAY_DROP_INCOMPLETE";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifferenceSpec {
    pub stat: String,
    pub window: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub target_competition: String,
    /// Rating intervals starting or ending on/before this date are ignored.
    pub rating_cutoff: NaiveDate,
    pub rolling: Vec<RollingPass>,
    pub differences: Vec<DifferenceSpec>,
    pub drop_incomplete: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_competition: "Bundesliga".to_string(),
            rating_cutoff: NaiveDate::from_ymd_opt(2019, 1, 1).unwrap_or_default(),
            rolling: vec![
                RollingPass::new(
                    [
                        "xg",
                        "sh",
                        "sot",
                        "poss",
                        "goal_ratio",
                        "elo",
                        "ga_per_xga",
                        "gf_per_xg",
                    ],
                    3,
                ),
                RollingPass::new(["goal_ratio"], 1),
            ],
            differences: ["elo", "goal_ratio", "ga_per_xga", "gf_per_xg"]
                .into_iter()
                .map(|stat| DifferenceSpec {
                    stat: stat.to_string(),
                    window: 3,
                })
                .collect(),
            drop_incomplete: true,
        }
    }
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read pipeline config {}", path.display()))?;
        serde_json::from_str(raw.trim())
            .with_context(|| format!("parse pipeline config {}", path.display()))
    }

    pub fn with_env_overrides(mut self) -> Result<Self> {
        if let Some(comp) = env_value(ENV_TARGET_COMP) {
            self.target_competition = comp;
        }
        if let Some(raw) = env_value(ENV_RATING_CUTOFF) {
            self.rating_cutoff = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .with_context(|| format!("{ENV_RATING_CUTOFF} must be YYYY-MM-DD, got {raw:?}"))?;
        }
        if let Some(raw) = env_value(ENV_DROP_INCOMPLETE) {
            self.drop_incomplete = parse_flag(&raw)
                .ok_or_else(|| anyhow!("{ENV_DROP_INCOMPLETE} must be a boolean, got {raw:?}"))?;
        }
        Ok(self)
    }

    pub fn validate(&self) -> FeatureResult<()> {
        let windows = self
            .rolling
            .iter()
            .map(|p| p.window)
            .chain(self.differences.iter().map(|d| d.window));
        for window in windows {
            if window == 0 {
                return Err(FeatureError::InvalidWindow(window));
            }
        }
        Ok(())
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineReport {
    pub consolidation: ConsolidationSummary,
    pub target_fixtures: usize,
    pub output_rows: usize,
    pub feature_columns: usize,
}

/// Per-team rows in, one model-ready row per target-competition fixture out.
pub fn build_feature_dataset(
    records: &[TeamMatchRecord],
    ratings: &RatingSeriesStore,
    cfg: &PipelineConfig,
) -> FeatureResult<(FeatureDataset, PipelineReport)> {
    cfg.validate()?;
    let target = cfg.target_competition.as_str();

    let ratings = ratings.restricted_after(cfg.rating_cutoff);
    let (fixtures, consolidation) = consolidate_with_summary(records)?;
    let dataset = FeatureDataset::new(fixtures);
    let dataset = join_ratings(dataset, &ratings, target)?;
    let dataset = compute_rest_days(dataset, target)?;

    let dataset = dataset.retain_competition(target);
    let target_fixtures = dataset.len();
    let dataset = add_ratio_stats(add_calendar_details(dataset));

    let mut dataset = dataset;
    for pass in &cfg.rolling {
        dataset = apply_rolling_pass(dataset, pass)?;
    }
    for diff in &cfg.differences {
        dataset = add_rolling_difference(dataset, &diff.stat, diff.window)?;
    }
    if cfg.drop_incomplete {
        dataset = dataset.drop_incomplete();
    }

    let report = PipelineReport {
        consolidation,
        target_fixtures,
        output_rows: dataset.len(),
        feature_columns: dataset.columns.len(),
    };
    info!(
        target,
        target_fixtures = report.target_fixtures,
        rows = report.output_rows,
        columns = report.feature_columns,
        "feature dataset built"
    );
    Ok((dataset, report))
}
