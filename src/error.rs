use chrono::NaiveDate;
use thiserror::Error;

use crate::fixture_key::FixtureKey;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FeatureError {
    #[error("ambiguous fixture {key}: found {home} home and {away} away rows ({total} total)")]
    AmbiguousFixture {
        key: FixtureKey,
        home: usize,
        away: usize,
        total: usize,
    },

    #[error("no rating available for {team} on or before {date}")]
    RatingUnavailable { team: String, date: NaiveDate },

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("rolling window must be at least 1, got {0}")]
    InvalidWindow(usize),

    #[error("unknown statistic: {0}")]
    UnknownStatistic(String),

    #[error("missing feature column: {0}")]
    MissingFeature(String),

    #[error("fixtures out of chronological order at {key}")]
    OutOfOrder { key: FixtureKey },
}

pub type FeatureResult<T> = std::result::Result<T, FeatureError>;
