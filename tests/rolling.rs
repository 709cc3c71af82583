mod common;

use common::{d, record};
use matchday_features::consolidate::consolidate_fixtures;
use matchday_features::rolling::{
    RollingPass, add_rolling_difference, add_rolling_features, apply_rolling_pass, rolling_column,
    team_timelines,
};
use matchday_features::{FeatureDataset, FeatureError, Side, TeamMatchRecord, Venue};

fn alpha_home_run(shots: &[f64]) -> FeatureDataset {
    let records: Vec<TeamMatchRecord> = shots
        .iter()
        .enumerate()
        .map(|(i, sh)| {
            let mut r = record(
                d(2021, 8, 1) + chrono::Duration::days(7 * i as i64),
                "Bundesliga",
                "Alpha",
                &format!("Opponent {i}"),
                Venue::Home,
                1,
                0,
            );
            r.shots = Some(*sh);
            r
        })
        .collect();
    FeatureDataset::new(consolidate_fixtures(&records).expect("consolidates"))
}

#[test]
fn rolling_values_follow_the_window_boundary() {
    let data = alpha_home_run(&[10.0, 12.0, 8.0, 14.0, 9.0, 11.0]);
    let rolled = add_rolling_features(data, &["sh"], 3).expect("rolls");
    let col = rolling_column("sh", Side::Home, 3);

    for f in &rolled.fixtures[..3] {
        assert_eq!(f.feature(&col), None);
    }
    let at3 = rolled.fixtures[3].feature(&col).expect("defined at position 3");
    let at4 = rolled.fixtures[4].feature(&col).expect("defined at position 4");
    let at5 = rolled.fixtures[5].feature(&col).expect("defined at position 5");
    assert!((at3 - 10.0).abs() < 1e-12);
    assert!((at4 - 34.0 / 3.0).abs() < 1e-12);
    assert!((at5 - 31.0 / 3.0).abs() < 1e-12);

    // Every opponent appears once, so nothing is ever defined for the away side.
    let away = rolling_column("sh", Side::Away, 3);
    assert!(rolled.fixtures.iter().all(|f| f.feature(&away).is_none()));
    assert!(rolled.has_column(&col) && rolled.has_column(&away));
}

#[test]
fn rolling_reads_the_teams_own_side_of_prior_fixtures() {
    let mut c_home = record(d(2021, 8, 8), "Bundesliga", "Gamma", "Alpha", Venue::Home, 2, 2);
    c_home.shots = Some(20.0);
    let mut alpha_away = record(d(2021, 8, 8), "Bundesliga", "Alpha", "Gamma", Venue::Away, 2, 2);
    alpha_away.shots = Some(6.0);
    let mut alpha_first = record(d(2021, 8, 1), "Bundesliga", "Alpha", "Beta", Venue::Home, 1, 0);
    alpha_first.shots = Some(10.0);
    let alpha_third = record(d(2021, 8, 15), "Bundesliga", "Alpha", "Delta", Venue::Home, 0, 0);

    let data = FeatureDataset::new(
        consolidate_fixtures(&[alpha_first, c_home, alpha_away, alpha_third]).expect("consolidates"),
    );
    let rolled = add_rolling_features(data, &["sh"], 2).expect("rolls");

    let third = &rolled.fixtures[2];
    assert_eq!(third.home_team, "Alpha");
    assert_eq!(third.feature(&rolling_column("sh", Side::Home, 2)), Some(8.0));
}

#[test]
fn repeated_passes_accumulate_and_feed_differences() {
    let data = alpha_home_run(&[10.0, 12.0, 8.0, 14.0]);
    let data = apply_rolling_pass(data, &RollingPass::new(["sh", "xg"], 3)).expect("first pass");
    let data = add_rolling_features(data, &["sh"], 1).expect("second pass");

    assert!(data.has_column("sh_home_rolling_3"));
    assert!(data.has_column("xg_away_rolling_3"));
    assert!(data.has_column("sh_home_rolling_1"));
    assert_eq!(data.fixtures[3].feature("sh_home_rolling_1"), Some(8.0));
    assert_eq!(data.fixtures[3].feature("sh_home_rolling_3"), Some(10.0));

    let data = add_rolling_difference(data, "sh", 3).expect("diff");
    assert!(data.has_column("sh_rolling_3_diff"));
    // The away side never has history here, so the difference stays undefined.
    assert!(data.fixtures.iter().all(|f| f.feature("sh_rolling_3_diff").is_none()));
}

#[test]
fn difference_is_home_minus_away() {
    let mut records = Vec::new();
    for (i, (a_sh, b_sh)) in [(10.0, 4.0), (12.0, 6.0)].into_iter().enumerate() {
        let date = d(2021, 8, 1) + chrono::Duration::days(7 * i as i64);
        let mut a = record(date, "Bundesliga", "Alpha", &format!("A{i}"), Venue::Home, 1, 0);
        a.shots = Some(a_sh);
        let mut b = record(date, "Bundesliga", "Beta", &format!("B{i}"), Venue::Home, 1, 0);
        b.shots = Some(b_sh);
        records.push(a);
        records.push(b);
    }
    records.push(record(d(2021, 8, 15), "Bundesliga", "Alpha", "Beta", Venue::Home, 0, 0));

    let data = FeatureDataset::new(consolidate_fixtures(&records).expect("consolidates"));
    let data = add_rolling_features(data, &["sh"], 2).expect("rolls");
    let data = add_rolling_difference(data, "sh", 2).expect("diff");

    let last = data.fixtures.last().expect("derby row");
    assert_eq!(last.feature("sh_home_rolling_2"), Some(11.0));
    assert_eq!(last.feature("sh_away_rolling_2"), Some(5.0));
    assert_eq!(last.feature("sh_rolling_2_diff"), Some(6.0));
}

#[test]
fn undefined_prior_value_leaves_rolling_value_undefined() {
    let mut data = alpha_home_run(&[10.0, 12.0, 8.0]);
    data.fixtures[1].home_shots = None;
    let rolled = add_rolling_features(data, &["sh"], 2).expect("rolls");
    assert_eq!(rolled.fixtures[2].feature("sh_home_rolling_2"), None);
}

#[test]
fn invalid_arguments_are_rejected_before_computing() {
    let data = alpha_home_run(&[10.0, 12.0]);
    assert_eq!(
        add_rolling_features(data.clone(), &["sh"], 0).unwrap_err(),
        FeatureError::InvalidWindow(0)
    );
    assert_eq!(
        add_rolling_features(data.clone(), &["corners"], 2).unwrap_err(),
        FeatureError::UnknownStatistic("corners".to_string())
    );
    assert_eq!(
        add_rolling_difference(data, "sh", 3).unwrap_err(),
        FeatureError::MissingFeature("sh_home_rolling_3".to_string())
    );
}

#[test]
fn timelines_list_each_teams_fixtures_in_order() {
    let data = alpha_home_run(&[1.0, 2.0, 3.0]);
    let timelines = team_timelines(&data.fixtures);
    assert_eq!(timelines.get("Alpha"), Some(&vec![0, 1, 2]));
    assert_eq!(timelines.get("Opponent 1"), Some(&vec![1]));
    assert_eq!(timelines.len(), 4);
}
