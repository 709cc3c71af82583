use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{FeatureError, FeatureResult};
use crate::fixture::{FeatureDataset, Fixture, Side};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingPass {
    pub stats: Vec<String>,
    pub window: usize,
}

impl RollingPass {
    pub fn new<S: Into<String>>(stats: impl IntoIterator<Item = S>, window: usize) -> Self {
        Self {
            stats: stats.into_iter().map(Into::into).collect(),
            window,
        }
    }
}

pub fn rolling_column(stat: &str, side: Side, window: usize) -> String {
    format!("{stat}_{}_rolling_{window}", side.suffix())
}

pub fn difference_column(stat: &str, window: usize) -> String {
    format!("{stat}_rolling_{window}_diff")
}

pub fn team_timelines(fixtures: &[Fixture]) -> BTreeMap<&str, Vec<usize>> {
    let mut timelines: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, fixture) in fixtures.iter().enumerate() {
        timelines.entry(fixture.home_team.as_str()).or_default().push(idx);
        timelines.entry(fixture.away_team.as_str()).or_default().push(idx);
    }
    timelines
}

/// Mean of each stat over the team's previous `window` fixtures, read from its
/// own side. Undefined if any of those values is undefined.
pub fn add_rolling_features<S: AsRef<str>>(
    dataset: FeatureDataset,
    stats: &[S],
    window: usize,
) -> FeatureResult<FeatureDataset> {
    if window == 0 {
        return Err(FeatureError::InvalidWindow(window));
    }
    for stat in stats {
        let stat = stat.as_ref();
        if !dataset.knows_stat(stat) {
            return Err(FeatureError::UnknownStatistic(stat.to_string()));
        }
    }
    dataset.ensure_chronological()?;

    let mut updates: Vec<(usize, String, Option<f64>)> = Vec::new();
    {
        let fixtures = &dataset.fixtures;
        for (team, timeline) in team_timelines(fixtures) {
            for (pos, &idx) in timeline.iter().enumerate() {
                let Some(side) = fixtures[idx].side_of(team) else {
                    continue;
                };
                for stat in stats {
                    let stat = stat.as_ref();
                    let value = if pos < window {
                        None
                    } else {
                        trailing_mean(fixtures, team, &timeline[pos - window..pos], stat)
                    };
                    updates.push((idx, rolling_column(stat, side, window), value));
                }
            }
            debug!(team, fixtures = timeline.len(), window, "rolled team timeline");
        }
    }

    let mut dataset = dataset;
    for stat in stats {
        for side in Side::BOTH {
            dataset.declare_column(&rolling_column(stat.as_ref(), side, window));
        }
    }
    let defined = updates.iter().filter(|(_, _, v)| v.is_some()).count();
    for (idx, column, value) in updates {
        dataset.fixtures[idx].set_feature(&column, value);
    }

    info!(
        stats = stats.len(),
        window,
        defined,
        fixtures = dataset.len(),
        "added rolling features"
    );
    Ok(dataset)
}

pub fn apply_rolling_pass(
    dataset: FeatureDataset,
    pass: &RollingPass,
) -> FeatureResult<FeatureDataset> {
    add_rolling_features(dataset, pass.stats.as_slice(), pass.window)
}

fn trailing_mean(fixtures: &[Fixture], team: &str, prior: &[usize], stat: &str) -> Option<f64> {
    let mut sum = 0.0;
    for &idx in prior {
        let fixture = &fixtures[idx];
        sum += fixture.stat(stat, fixture.side_of(team)?)?;
    }
    Some(sum / prior.len() as f64)
}

pub fn add_rolling_difference(
    dataset: FeatureDataset,
    stat: &str,
    window: usize,
) -> FeatureResult<FeatureDataset> {
    let home_col = rolling_column(stat, Side::Home, window);
    let away_col = rolling_column(stat, Side::Away, window);
    for col in [&home_col, &away_col] {
        if !dataset.has_column(col) {
            return Err(FeatureError::MissingFeature(col.clone()));
        }
    }

    let diff_col = difference_column(stat, window);
    let mut dataset = dataset;
    dataset.declare_column(&diff_col);
    for fixture in &mut dataset.fixtures {
        let diff = match (fixture.feature(&home_col), fixture.feature(&away_col)) {
            (Some(h), Some(a)) => Some(h - a),
            _ => None,
        };
        fixture.set_feature(&diff_col, diff);
    }
    Ok(dataset)
}
