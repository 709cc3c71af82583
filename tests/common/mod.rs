#![allow(dead_code)]

use chrono::NaiveDate;
use matchday_features::{MatchResult, Possession, TeamMatchRecord, Venue};

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).expect("valid test date")
}

pub fn record(
    date: NaiveDate,
    comp: &str,
    team: &str,
    opponent: &str,
    venue: Venue,
    goals_for: u32,
    goals_against: u32,
) -> TeamMatchRecord {
    let result = if goals_for > goals_against {
        MatchResult::Win
    } else if goals_for < goals_against {
        MatchResult::Loss
    } else {
        MatchResult::Draw
    };
    TeamMatchRecord {
        date,
        season: 2021,
        round: "Matchweek 1".to_string(),
        day: "Sat".to_string(),
        competition: comp.to_string(),
        time: Some("15:30".to_string()),
        team: team.to_string(),
        opponent: opponent.to_string(),
        venue,
        result,
        goals_for,
        goals_against,
        expected_goals_for: Some(1.2),
        expected_goals_against: Some(0.8),
        possession: Possession::from_pct(55.0),
        shots: Some(12.0),
        shots_on_target: Some(4.0),
        shot_distance: Some(18.0),
    }
}
