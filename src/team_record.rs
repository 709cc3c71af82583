use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::fixture_key::FixtureKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Venue {
    Home,
    Away,
    Neutral,
}

impl Venue {
    pub fn swapped(self) -> Self {
        match self {
            Venue::Home => Venue::Away,
            Venue::Away => Venue::Home,
            Venue::Neutral => Venue::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchResult {
    #[serde(rename = "W")]
    Win,
    #[serde(rename = "D")]
    Draw,
    #[serde(rename = "L")]
    Loss,
}

impl MatchResult {
    pub fn inverted(self) -> Self {
        match self {
            MatchResult::Win => MatchResult::Loss,
            MatchResult::Loss => MatchResult::Win,
            MatchResult::Draw => MatchResult::Draw,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            MatchResult::Win => "W",
            MatchResult::Draw => "D",
            MatchResult::Loss => "L",
        }
    }
}

// Tenths of a percent, so that taking the opponent's share is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Possession(u16);

impl Possession {
    const FULL: u16 = 1000;

    pub fn from_tenths(tenths: u16) -> Option<Self> {
        (tenths <= Self::FULL).then_some(Self(tenths))
    }

    /// Rounds to the nearest tenth; `None` outside 0..=100.
    pub fn from_pct(pct: f64) -> Option<Self> {
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return None;
        }
        Self::from_tenths((pct * 10.0).round() as u16)
    }

    pub fn tenths(self) -> u16 {
        self.0
    }

    pub fn pct(self) -> f64 {
        f64::from(self.0) / 10.0
    }

    pub fn opponent(self) -> Self {
        Self(Self::FULL - self.0)
    }
}

impl fmt::Display for Possession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pct())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMatchRecord {
    pub date: NaiveDate,
    pub season: i32,
    pub round: String,
    #[serde(default)]
    pub day: String,
    #[serde(rename = "comp")]
    pub competition: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub time: Option<String>,
    pub team: String,
    pub opponent: String,
    pub venue: Venue,
    pub result: MatchResult,
    #[serde(rename = "gf", deserialize_with = "goals_from_cell")]
    pub goals_for: u32,
    #[serde(rename = "ga", deserialize_with = "goals_from_cell")]
    pub goals_against: u32,
    #[serde(rename = "xg", default)]
    pub expected_goals_for: Option<f64>,
    #[serde(rename = "xga", default)]
    pub expected_goals_against: Option<f64>,
    #[serde(rename = "poss", default, deserialize_with = "possession_from_cell")]
    pub possession: Option<Possession>,
    #[serde(rename = "sh", default)]
    pub shots: Option<f64>,
    #[serde(rename = "sot", default)]
    pub shots_on_target: Option<f64>,
    #[serde(rename = "dist", default)]
    pub shot_distance: Option<f64>,
}

impl TeamMatchRecord {
    pub fn fixture_key(&self) -> FixtureKey {
        FixtureKey::new(self.date, &self.team, &self.opponent)
    }

    /// The same match seen from the opponent's side. Shot columns are copied
    /// unchanged.
    pub fn mirrored(&self) -> Self {
        Self {
            team: self.opponent.clone(),
            opponent: self.team.clone(),
            venue: self.venue.swapped(),
            result: self.result.inverted(),
            goals_for: self.goals_against,
            goals_against: self.goals_for,
            expected_goals_for: self.expected_goals_against,
            expected_goals_against: self.expected_goals_for,
            possession: self.possession.map(Possession::opponent),
            ..self.clone()
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty()))
}

fn possession_from_cell<'de, D>(deserializer: D) -> Result<Option<Possession>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Possession::from_pct)
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid possession value {raw:?}")))
}

// Shoot-out results are scraped as "1 (4)"; only the leading number counts.
fn goals_from_cell<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_goals(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid goals value {raw:?}")))
}

fn parse_goals(raw: &str) -> Option<u32> {
    let head = raw.split_whitespace().next()?;
    if let Ok(n) = head.parse::<u32>() {
        return Some(n);
    }
    let n = head.parse::<f64>().ok()?;
    if n.is_finite() && n >= 0.0 && n.fract() == 0.0 {
        Some(n as u32)
    } else {
        None
    }
}
