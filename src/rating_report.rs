use std::collections::BTreeMap;
use std::io::Write;

use anyhow::{Context, Result};
use chrono::Datelike;
use tracing::warn;

use crate::ratings::RatingSeriesStore;

#[derive(Debug, Clone, PartialEq)]
pub struct TeamMonthlyRatings {
    pub team: String,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRatings {
    pub months: Vec<(i32, u32)>,
    pub teams: Vec<TeamMonthlyRatings>,
}

/// Intervals are bucketed by the month they start in; empty months take the
/// next available month's value.
pub fn monthly_ratings(
    store: &RatingSeriesStore,
    teams: &[String],
    start_year: i32,
    end_year: i32,
) -> MonthlyRatings {
    let months: Vec<(i32, u32)> = (start_year..=end_year)
        .flat_map(|y| (1..=12).map(move |m| (y, m)))
        .collect();

    let mut out = Vec::new();
    for team in teams {
        let Some(series) = store.get(team) else {
            warn!(team = %team, "team not found in rating store, skipping");
            continue;
        };

        let mut buckets: BTreeMap<(i32, u32), (f64, usize)> = BTreeMap::new();
        for interval in series.intervals() {
            let key = (interval.valid_from.year(), interval.valid_from.month());
            let entry = buckets.entry(key).or_insert((0.0, 0));
            entry.0 += interval.rating;
            entry.1 += 1;
        }

        let mut values: Vec<Option<f64>> = months
            .iter()
            .map(|m| buckets.get(m).map(|(sum, n)| sum / *n as f64))
            .collect();
        backfill(&mut values);
        out.push(TeamMonthlyRatings {
            team: team.clone(),
            values,
        });
    }

    MonthlyRatings { months, teams: out }
}

fn backfill(values: &mut [Option<f64>]) {
    let mut next = None;
    for v in values.iter_mut().rev() {
        if v.is_some() {
            next = *v;
        } else {
            *v = next;
        }
    }
}

pub fn write_monthly_csv<W: Write>(writer: W, report: &MonthlyRatings) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let mut header = vec!["month".to_string()];
    header.extend(report.teams.iter().map(|t| t.team.clone()));
    wtr.write_record(&header).context("write report header")?;

    for (idx, (year, month)) in report.months.iter().enumerate() {
        let mut row = vec![format!("{year}-{month:02}")];
        row.extend(
            report
                .teams
                .iter()
                .map(|t| t.values[idx].map(|v| format!("{v:.1}")).unwrap_or_default()),
        );
        wtr.write_record(&row).context("write report row")?;
    }
    wtr.flush().context("flush report csv")?;
    Ok(())
}
