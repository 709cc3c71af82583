use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::error::{FeatureError, FeatureResult};
use crate::fixture::Fixture;
use crate::fixture_key::FixtureKey;
use crate::team_record::{TeamMatchRecord, Venue};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsolidationSummary {
    pub records: usize,
    pub neutral_relabeled: usize,
    pub synthesized: usize,
    pub fixtures: usize,
}

pub fn consolidate_fixtures(records: &[TeamMatchRecord]) -> FeatureResult<Vec<Fixture>> {
    consolidate_with_summary(records).map(|(fixtures, _)| fixtures)
}

pub fn consolidate_with_summary(
    records: &[TeamMatchRecord],
) -> FeatureResult<(Vec<Fixture>, ConsolidationSummary)> {
    let keyed: Vec<(FixtureKey, TeamMatchRecord)> = records
        .iter()
        .map(|r| (r.fixture_key(), r.clone()))
        .collect();
    let (keyed, neutral_relabeled) = assign_neutral_venues(keyed);

    let mut groups: BTreeMap<FixtureKey, Vec<TeamMatchRecord>> = BTreeMap::new();
    for (key, record) in keyed {
        groups.entry(key).or_default().push(record);
    }

    let mut synthesized = 0usize;
    let mut fixtures = Vec::with_capacity(groups.len());
    for (key, mut rows) in groups {
        if rows.len() == 1 {
            let counterpart = rows[0].mirrored();
            debug!(%key, team = %counterpart.team, "synthesized missing counterpart row");
            rows.push(counterpart);
            synthesized += 1;
        }
        fixtures.push(pair_rows(key, rows)?);
    }

    let summary = ConsolidationSummary {
        records: records.len(),
        neutral_relabeled,
        synthesized,
        fixtures: fixtures.len(),
    };
    info!(
        records = summary.records,
        neutral = summary.neutral_relabeled,
        synthesized = summary.synthesized,
        fixtures = summary.fixtures,
        "consolidated team rows into fixtures"
    );
    Ok((fixtures, summary))
}

/// Alternately labels neutral-venue rows Home/Away in (key, team) order.
pub fn assign_neutral_venues(
    mut keyed: Vec<(FixtureKey, TeamMatchRecord)>,
) -> (Vec<(FixtureKey, TeamMatchRecord)>, usize) {
    let mut neutral: Vec<usize> = keyed
        .iter()
        .enumerate()
        .filter(|(_, (_, r))| r.venue == Venue::Neutral)
        .map(|(idx, _)| idx)
        .collect();
    neutral.sort_by(|&a, &b| {
        let (ka, ra) = &keyed[a];
        let (kb, rb) = &keyed[b];
        ka.cmp(kb)
            .then_with(|| ra.team.cmp(&rb.team))
            .then_with(|| a.cmp(&b))
    });

    for (i, &idx) in neutral.iter().enumerate() {
        keyed[idx].1.venue = if i % 2 == 0 { Venue::Home } else { Venue::Away };
    }
    let relabeled = neutral.len();
    (keyed, relabeled)
}

fn pair_rows(key: FixtureKey, rows: Vec<TeamMatchRecord>) -> FeatureResult<Fixture> {
    let home_count = rows.iter().filter(|r| r.venue == Venue::Home).count();
    let away_count = rows.iter().filter(|r| r.venue == Venue::Away).count();
    let ambiguous = || FeatureError::AmbiguousFixture {
        key: key.clone(),
        home: home_count,
        away: away_count,
        total: rows.len(),
    };
    if rows.len() != 2 || home_count != 1 || away_count != 1 {
        return Err(ambiguous());
    }
    let (Some(home), Some(away)) = (
        rows.iter().find(|r| r.venue == Venue::Home),
        rows.iter().find(|r| r.venue == Venue::Away),
    ) else {
        return Err(ambiguous());
    };
    if home.team == away.team {
        return Err(ambiguous());
    }
    Ok(merge_pair(key.clone(), home, away))
}

fn merge_pair(key: FixtureKey, home: &TeamMatchRecord, away: &TeamMatchRecord) -> Fixture {
    Fixture {
        key,
        date: home.date,
        season: home.season,
        round: home.round.clone(),
        day: home.day.clone(),
        competition: home.competition.clone(),
        time: home.time.clone(),
        home_team: home.team.clone(),
        away_team: home.opponent.clone(),
        home_goals: home.goals_for,
        away_goals: home.goals_against,
        home_xg: home.expected_goals_for,
        away_xg: home.expected_goals_against,
        home_possession: home.possession,
        away_possession: away.possession,
        home_shots: home.shots,
        away_shots: away.shots,
        home_shots_on_target: home.shots_on_target,
        away_shots_on_target: away.shots_on_target,
        home_shot_distance: home.shot_distance,
        away_shot_distance: away.shot_distance,
        result: home.result,
        home_rating: None,
        away_rating: None,
        home_rest_days: None,
        away_rest_days: None,
        features: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team_record::{MatchResult, Possession};
    use chrono::NaiveDate;

    fn row(team: &str, opponent: &str, venue: Venue, gf: u32, ga: u32) -> TeamMatchRecord {
        TeamMatchRecord {
            date: NaiveDate::from_ymd_opt(2022, 7, 30).unwrap(),
            season: 2023,
            round: "Final".to_string(),
            day: "Sat".to_string(),
            competition: "DFL-Supercup".to_string(),
            time: Some("20:30".to_string()),
            team: team.to_string(),
            opponent: opponent.to_string(),
            venue,
            result: if gf > ga {
                MatchResult::Win
            } else if gf < ga {
                MatchResult::Loss
            } else {
                MatchResult::Draw
            },
            goals_for: gf,
            goals_against: ga,
            expected_goals_for: Some(1.5),
            expected_goals_against: Some(1.1),
            possession: Possession::from_pct(55.0),
            shots: Some(14.0),
            shots_on_target: Some(6.0),
            shot_distance: Some(17.2),
        }
    }

    #[test]
    fn neutral_pair_gets_one_home_and_one_away() {
        let records = vec![
            row("RB Leipzig", "Bayern Munich", Venue::Neutral, 3, 5),
            row("Bayern Munich", "RB Leipzig", Venue::Neutral, 5, 3),
        ];
        let keyed = records.iter().map(|r| (r.fixture_key(), r.clone())).collect();
        let (keyed, relabeled) = assign_neutral_venues(keyed);
        assert_eq!(relabeled, 2);
        let bayern = keyed.iter().find(|(_, r)| r.team == "Bayern Munich").unwrap();
        let leipzig = keyed.iter().find(|(_, r)| r.team == "RB Leipzig").unwrap();
        assert_eq!(bayern.1.venue, Venue::Home);
        assert_eq!(leipzig.1.venue, Venue::Away);
    }

    #[test]
    fn neutral_fixture_consolidates() {
        let records = vec![
            row("RB Leipzig", "Bayern Munich", Venue::Neutral, 3, 5),
            row("Bayern Munich", "RB Leipzig", Venue::Neutral, 5, 3),
        ];
        let fixtures = consolidate_fixtures(&records).unwrap();
        assert_eq!(fixtures.len(), 1);
        assert_eq!(fixtures[0].home_team, "Bayern Munich");
        assert_eq!(fixtures[0].home_goals, 5);
        assert_eq!(fixtures[0].away_goals, 3);
    }

    #[test]
    fn two_home_rows_are_ambiguous() {
        let records = vec![
            row("Bayern Munich", "RB Leipzig", Venue::Home, 5, 3),
            row("RB Leipzig", "Bayern Munich", Venue::Home, 3, 5),
        ];
        let err = consolidate_fixtures(&records).unwrap_err();
        assert!(matches!(
            err,
            FeatureError::AmbiguousFixture {
                home: 2,
                away: 0,
                ..
            }
        ));
    }
}
