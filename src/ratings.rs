use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{FeatureError, FeatureResult};
use crate::team_names::TeamNameMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingInterval {
    pub rating: f64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
}

// One row of a per-team rating file; other columns (Rank, Club, ...) are ignored.
#[derive(Debug, Deserialize)]
struct RatingRow {
    #[serde(rename = "Elo")]
    elo: f64,
    #[serde(rename = "From")]
    from: NaiveDate,
    #[serde(rename = "To")]
    to: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamRatingSeries {
    pub team: String,
    intervals: Vec<RatingInterval>,
}

impl TeamRatingSeries {
    pub fn new(team: impl Into<String>, mut intervals: Vec<RatingInterval>) -> Self {
        intervals.sort_by_key(|i| (i.valid_from, i.valid_to));
        Self {
            team: team.into(),
            intervals,
        }
    }

    pub fn from_csv<R: Read>(team: impl Into<String>, reader: R) -> Result<Self> {
        let team = team.into();
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut intervals = Vec::new();
        for row in rdr.deserialize::<RatingRow>() {
            let row = row.with_context(|| format!("decode rating row for {team}"))?;
            intervals.push(RatingInterval {
                rating: row.elo,
                valid_from: row.from,
                valid_to: row.to,
            });
        }
        Ok(Self::new(team, intervals))
    }

    pub fn restricted_after(mut self, cutoff: NaiveDate) -> Self {
        self.intervals
            .retain(|i| i.valid_from > cutoff && i.valid_to > cutoff);
        self
    }

    pub fn intervals(&self) -> &[RatingInterval] {
        &self.intervals
    }

    /// Rating of the most recent interval whose `valid_to` is on or before `date`.
    pub fn rating_at(&self, date: NaiveDate) -> Option<f64> {
        let idx = self.intervals.partition_point(|i| i.valid_to <= date);
        idx.checked_sub(1).map(|i| self.intervals[i].rating)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingSeriesStore {
    series: BTreeMap<String, TeamRatingSeries>,
}

impl RatingSeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: TeamRatingSeries) {
        self.series.insert(series.team.clone(), series);
    }

    pub fn get(&self, team: &str) -> Option<&TeamRatingSeries> {
        self.series.get(team)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn rating_for(&self, team: &str, date: NaiveDate) -> FeatureResult<f64> {
        let series = self
            .get(team)
            .ok_or_else(|| FeatureError::UnknownTeam(team.to_string()))?;
        series
            .rating_at(date)
            .ok_or_else(|| FeatureError::RatingUnavailable {
                team: team.to_string(),
                date,
            })
    }

    /// Drops every interval starting or ending on/before `cutoff`.
    pub fn restricted_after(&self, cutoff: NaiveDate) -> Self {
        Self {
            series: self
                .series
                .iter()
                .map(|(team, series)| (team.clone(), series.clone().restricted_after(cutoff)))
                .collect(),
        }
    }

    /// Reads `<dir>/<source name>.csv` for every mapped team, in parallel.
    pub fn load_dir(dir: &Path, names: &TeamNameMap) -> Result<Self> {
        if names.is_empty() {
            warn!(dir = %dir.display(), "team name mapping is empty, no rating files to read");
        }
        let pairs: Vec<(&str, &str)> = names.iter().collect();
        let loaded = pairs
            .par_iter()
            .map(|(source, canonical)| -> Result<(String, TeamRatingSeries)> {
                let path = dir.join(format!("{source}.csv"));
                let file = File::open(&path)
                    .with_context(|| format!("open rating file {}", path.display()))?;
                let series = TeamRatingSeries::from_csv(*canonical, file)
                    .with_context(|| format!("parse rating file {}", path.display()))?;
                debug!(team = *canonical, intervals = series.intervals.len(), "loaded rating series");
                Ok((source.to_string(), series))
            })
            .collect::<Result<Vec<_>>>()?;

        let store = Self::from_sources(loaded)?;
        info!(
            mapped = names.len(),
            teams = store.len(),
            dir = %dir.display(),
            "rating store ready"
        );
        Ok(store)
    }

    fn from_sources(loaded: Vec<(String, TeamRatingSeries)>) -> Result<Self> {
        let mut sources: BTreeMap<String, String> = BTreeMap::new();
        let mut store = Self::new();
        for (source, series) in loaded {
            if let Some(previous) = sources.insert(series.team.clone(), source.clone()) {
                bail!(
                    "rating sources {previous:?} and {source:?} both map to {:?}",
                    series.team
                );
            }
            store.insert(series);
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const CSV: &str = "Rank,Club,Country,Level,Elo,From,To\n\
        None,Bayern,GER,1,1950.5,2018-12-20,2019-01-03\n\
        1,Bayern,GER,1,1960.0,2019-01-04,2019-01-10\n\
        1,Bayern,GER,1,1972.25,2019-01-11,2019-01-20\n";

    #[test]
    fn parses_and_restricts_rating_file() {
        let series = TeamRatingSeries::from_csv("Bayern Munich", CSV.as_bytes()).unwrap();
        assert_eq!(series.intervals().len(), 3);
        let series = series.restricted_after(d(2019, 1, 1));
        assert_eq!(series.intervals().len(), 2);
        assert_eq!(series.intervals()[0].rating, 1960.0);
    }

    #[test]
    fn lookup_uses_latest_completed_interval() {
        let series = TeamRatingSeries::from_csv("Bayern Munich", CSV.as_bytes())
            .unwrap()
            .restricted_after(d(2019, 1, 1));
        assert_eq!(series.rating_at(d(2019, 1, 9)), None);
        assert_eq!(series.rating_at(d(2019, 1, 10)), Some(1960.0));
        assert_eq!(series.rating_at(d(2019, 1, 15)), Some(1960.0));
        assert_eq!(series.rating_at(d(2019, 2, 1)), Some(1972.25));
    }

    #[test]
    fn store_reports_unknown_and_unavailable() {
        let mut store = RatingSeriesStore::new();
        store.insert(TeamRatingSeries::from_csv("Bayern Munich", CSV.as_bytes()).unwrap());
        assert_eq!(
            store.rating_for("Lazio", d(2019, 2, 1)),
            Err(FeatureError::UnknownTeam("Lazio".to_string()))
        );
        assert_eq!(
            store.rating_for("Bayern Munich", d(2018, 1, 1)),
            Err(FeatureError::RatingUnavailable {
                team: "Bayern Munich".to_string(),
                date: d(2018, 1, 1),
            })
        );
    }

    #[test]
    fn store_restriction_applies_to_every_team() {
        let mut store = RatingSeriesStore::new();
        store.insert(TeamRatingSeries::from_csv("Bayern Munich", CSV.as_bytes()).unwrap());
        let restricted = store.restricted_after(d(2019, 1, 10));
        assert_eq!(restricted.get("Bayern Munich").unwrap().intervals().len(), 1);
        assert_eq!(store.get("Bayern Munich").unwrap().intervals().len(), 3);
    }

    #[test]
    fn two_sources_for_one_team_are_rejected() {
        let series = TeamRatingSeries::from_csv("Bayern Munich", CSV.as_bytes()).unwrap();
        let loaded = vec![
            ("Bayern".to_string(), series.clone()),
            ("FC Bayern".to_string(), series),
        ];
        let err = RatingSeriesStore::from_sources(loaded).unwrap_err();
        assert!(err.to_string().contains("both map to \"Bayern Munich\""));
    }
}
