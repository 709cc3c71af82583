use chrono::Datelike;

use crate::fixture::{FeatureDataset, Fixture, Side, side_column};

pub const DAY_CODE: &str = "day_code";
pub const WEEK: &str = "week";
pub const MATCH_HOUR: &str = "match_hour";

pub const RATIO_STATS: &[&str] = &["goal_ratio", "ga_per_xga", "gf_per_xg"];

// day_code counts from Monday = 0.
pub fn add_calendar_details(mut dataset: FeatureDataset) -> FeatureDataset {
    for column in [DAY_CODE, WEEK, MATCH_HOUR] {
        dataset.declare_column(column);
    }
    for fixture in &mut dataset.fixtures {
        let day_code = fixture.date.weekday().num_days_from_monday() as f64;
        let week = matchweek(&fixture.round).map(f64::from);
        let hour = fixture.time.as_deref().and_then(kickoff_hour).map(f64::from);
        fixture.set_feature(DAY_CODE, Some(day_code));
        fixture.set_feature(WEEK, week);
        fixture.set_feature(MATCH_HOUR, hour);
    }
    dataset
}

pub fn add_ratio_stats(mut dataset: FeatureDataset) -> FeatureDataset {
    for stat in RATIO_STATS {
        for side in Side::BOTH {
            dataset.declare_column(&side_column(stat, side));
        }
    }
    for fixture in &mut dataset.fixtures {
        for side in Side::BOTH {
            let (goal_ratio, ga_per_xga, gf_per_xg) = ratios(fixture, side);
            fixture.set_feature(&side_column("goal_ratio", side), Some(goal_ratio));
            fixture.set_feature(&side_column("ga_per_xga", side), ga_per_xga);
            fixture.set_feature(&side_column("gf_per_xg", side), gf_per_xg);
        }
    }
    dataset
}

fn ratios(fixture: &Fixture, side: Side) -> (f64, Option<f64>, Option<f64>) {
    let other = match side {
        Side::Home => Side::Away,
        Side::Away => Side::Home,
    };
    let scored = fixture.goals(side) as f64;
    let conceded = fixture.goals(other) as f64;
    let goal_ratio = (scored + 1.0) / (conceded + 1.0);
    let ga_per_xga = per_expected(conceded, fixture.xg(other));
    let gf_per_xg = per_expected(scored, fixture.xg(side));
    (goal_ratio, ga_per_xga, gf_per_xg)
}

fn per_expected(goals: f64, xg: Option<f64>) -> Option<f64> {
    xg.filter(|x| *x > 0.0).map(|x| goals / x)
}

// "Matchweek 12" -> 12
fn matchweek(round: &str) -> Option<u32> {
    round.split_whitespace().last()?.parse().ok()
}

// "20:30" -> 20
fn kickoff_hour(time: &str) -> Option<u32> {
    let hour: u32 = time.split(':').next()?.trim().parse().ok()?;
    (hour < 24).then_some(hour)
}
