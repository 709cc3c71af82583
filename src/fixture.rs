use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, FeatureResult};
use crate::fixture_key::FixtureKey;
use crate::team_record::{MatchResult, Possession};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn suffix(self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }
}

pub const BASE_STATS: &[&str] = &["goals", "xg", "poss", "sh", "sot", "dist", "elo", "rest_days"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub key: FixtureKey,
    pub date: NaiveDate,
    pub season: i32,
    pub round: String,
    pub day: String,
    pub competition: String,
    pub time: Option<String>,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub home_xg: Option<f64>,
    pub away_xg: Option<f64>,
    pub home_possession: Option<Possession>,
    pub away_possession: Option<Possession>,
    pub home_shots: Option<f64>,
    pub away_shots: Option<f64>,
    pub home_shots_on_target: Option<f64>,
    pub away_shots_on_target: Option<f64>,
    pub home_shot_distance: Option<f64>,
    pub away_shot_distance: Option<f64>,
    pub result: MatchResult,
    pub home_rating: Option<f64>,
    pub away_rating: Option<f64>,
    pub home_rest_days: Option<i64>,
    pub away_rest_days: Option<i64>,
    /// Derived columns; a missing entry means the value is undefined.
    #[serde(default)]
    pub features: BTreeMap<String, f64>,
}

impl Fixture {
    pub fn side_of(&self, team: &str) -> Option<Side> {
        if self.home_team == team {
            Some(Side::Home)
        } else if self.away_team == team {
            Some(Side::Away)
        } else {
            None
        }
    }

    pub fn goals(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home_goals,
            Side::Away => self.away_goals,
        }
    }

    pub fn xg(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.home_xg,
            Side::Away => self.away_xg,
        }
    }

    pub fn rating(&self, side: Side) -> Option<f64> {
        match side {
            Side::Home => self.home_rating,
            Side::Away => self.away_rating,
        }
    }

    pub fn rest_days(&self, side: Side) -> Option<i64> {
        match side {
            Side::Home => self.home_rest_days,
            Side::Away => self.away_rest_days,
        }
    }

    pub fn stat(&self, stat: &str, side: Side) -> Option<f64> {
        let home = side == Side::Home;
        match stat {
            "goals" => Some(self.goals(side) as f64),
            "xg" => self.xg(side),
            "poss" => pick(home, self.home_possession, self.away_possession).map(Possession::pct),
            "sh" => pick(home, self.home_shots, self.away_shots),
            "sot" => pick(home, self.home_shots_on_target, self.away_shots_on_target),
            "dist" => pick(home, self.home_shot_distance, self.away_shot_distance),
            "elo" => self.rating(side),
            "rest_days" => self.rest_days(side).map(|d| d as f64),
            _ => self.feature(&side_column(stat, side)),
        }
    }

    pub fn feature(&self, column: &str) -> Option<f64> {
        self.features.get(column).copied()
    }

    pub fn set_feature(&mut self, column: &str, value: Option<f64>) {
        match value.filter(|v| v.is_finite()) {
            Some(v) => {
                self.features.insert(column.to_string(), v);
            }
            None => {
                self.features.remove(column);
            }
        }
    }

    fn base_columns_complete(&self) -> bool {
        [
            self.home_xg,
            self.away_xg,
            self.home_shots,
            self.away_shots,
            self.home_shots_on_target,
            self.away_shots_on_target,
            self.home_shot_distance,
            self.away_shot_distance,
            self.home_rating,
            self.away_rating,
        ]
        .iter()
        .all(Option::is_some)
            && self.home_possession.is_some()
            && self.away_possession.is_some()
            && self.home_rest_days.is_some()
            && self.away_rest_days.is_some()
    }
}

fn pick<T>(home: bool, h: Option<T>, a: Option<T>) -> Option<T> {
    if home { h } else { a }
}

pub fn side_column(stat: &str, side: Side) -> String {
    format!("{stat}_{}", side.suffix())
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureDataset {
    pub fixtures: Vec<Fixture>,
    pub columns: Vec<String>,
}

impl FeatureDataset {
    pub fn new(fixtures: Vec<Fixture>) -> Self {
        Self {
            fixtures,
            columns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.fixtures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fixtures.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    pub fn declare_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }

    pub fn knows_stat(&self, stat: &str) -> bool {
        BASE_STATS.contains(&stat)
            || Side::BOTH
                .iter()
                .all(|side| self.has_column(&side_column(stat, *side)))
    }

    pub fn ensure_chronological(&self) -> FeatureResult<()> {
        match self.fixtures.windows(2).find(|w| w[0].key > w[1].key) {
            Some(w) => Err(FeatureError::OutOfOrder {
                key: w[1].key.clone(),
            }),
            None => Ok(()),
        }
    }

    pub fn retain_competition(mut self, competition: &str) -> Self {
        self.fixtures.retain(|f| f.competition == competition);
        self
    }

    /// Keeps fixtures whose base columns and declared features are all defined.
    pub fn drop_incomplete(mut self) -> Self {
        let columns = self.columns.clone();
        self.fixtures.retain(|f| {
            f.base_columns_complete() && columns.iter().all(|c| f.features.contains_key(c))
        });
        self
    }
}
