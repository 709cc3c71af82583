//! Consolidates per-team match rows into one row per fixture and enriches it
//! with point-in-time ratings, rest days and rolling form features.

pub mod cli;
pub mod consolidate;
pub mod dataset_io;
pub mod dataset_store;
pub mod error;
pub mod fixture;
pub mod fixture_key;
pub mod match_context;
pub mod pipeline;
pub mod rating_join;
pub mod rating_report;
pub mod ratings;
pub mod rest_days;
pub mod rolling;
pub mod team_names;
pub mod team_record;

pub use error::{FeatureError, FeatureResult};
pub use fixture::{FeatureDataset, Fixture, Side};
pub use fixture_key::FixtureKey;
pub use pipeline::{PipelineConfig, build_feature_dataset};
pub use ratings::{RatingInterval, RatingSeriesStore, TeamRatingSeries};
pub use team_record::{MatchResult, Possession, TeamMatchRecord, Venue};
