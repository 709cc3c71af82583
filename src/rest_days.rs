use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::info;

use crate::error::FeatureResult;
use crate::fixture::FeatureDataset;

/// Only fixtures of `competition` are labeled, but every fixture advances
/// both teams' last-seen date.
pub fn compute_rest_days(
    dataset: FeatureDataset,
    competition: &str,
) -> FeatureResult<FeatureDataset> {
    dataset.ensure_chronological()?;

    let FeatureDataset {
        mut fixtures,
        columns,
    } = dataset;
    let mut last_seen: HashMap<String, NaiveDate> = HashMap::new();
    let mut labeled = 0usize;

    for fixture in &mut fixtures {
        if fixture.competition == competition {
            fixture.home_rest_days = Some(gap(&last_seen, &fixture.home_team, fixture.date));
            fixture.away_rest_days = Some(gap(&last_seen, &fixture.away_team, fixture.date));
            labeled += 1;
        } else {
            fixture.home_rest_days = None;
            fixture.away_rest_days = None;
        }
        last_seen.insert(fixture.home_team.clone(), fixture.date);
        last_seen.insert(fixture.away_team.clone(), fixture.date);
    }

    info!(labeled, teams = last_seen.len(), "computed rest days");
    Ok(FeatureDataset { fixtures, columns })
}

fn gap(last_seen: &HashMap<String, NaiveDate>, team: &str, date: NaiveDate) -> i64 {
    last_seen
        .get(team)
        .map(|prev| (date - *prev).num_days())
        .unwrap_or(0)
}
