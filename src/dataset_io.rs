use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::fixture::{FeatureDataset, Fixture};
use crate::team_record::TeamMatchRecord;

const FIXED_COLUMNS: &[&str] = &[
    "date",
    "season",
    "round",
    "day",
    "comp",
    "time",
    "team_home",
    "team_away",
    "goals_home",
    "goals_away",
    "result_home",
    "xg_home",
    "xg_away",
    "poss_home",
    "poss_away",
    "sh_home",
    "sh_away",
    "sot_home",
    "sot_away",
    "dist_home",
    "dist_away",
    "elo_home",
    "elo_away",
    "days_since_home",
    "days_since_away",
];

pub fn read_team_records<R: Read>(reader: R) -> Result<Vec<TeamMatchRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for (idx, row) in rdr.deserialize::<TeamMatchRecord>().enumerate() {
        // +2: header line plus 1-based numbering
        out.push(row.with_context(|| format!("decode match row on line {}", idx + 2))?);
    }
    Ok(out)
}

pub fn load_team_records(path: &Path) -> Result<Vec<TeamMatchRecord>> {
    let file = File::open(path).with_context(|| format!("open match table {}", path.display()))?;
    let records = read_team_records(file)?;
    info!(rows = records.len(), path = %path.display(), "loaded per-team match rows");
    Ok(records)
}

pub fn table_rows(dataset: &FeatureDataset) -> Vec<Vec<String>> {
    let mut header: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(dataset.columns.iter().cloned());

    let mut rows = Vec::with_capacity(dataset.len() + 1);
    rows.push(header);
    for fixture in &dataset.fixtures {
        let mut row = fixed_cells(fixture);
        row.extend(
            dataset
                .columns
                .iter()
                .map(|c| opt_to_string(fixture.feature(c))),
        );
        rows.push(row);
    }
    rows
}

fn fixed_cells(f: &Fixture) -> Vec<String> {
    vec![
        f.date.format("%Y-%m-%d").to_string(),
        f.season.to_string(),
        f.round.clone(),
        f.day.clone(),
        f.competition.clone(),
        f.time.clone().unwrap_or_default(),
        f.home_team.clone(),
        f.away_team.clone(),
        f.home_goals.to_string(),
        f.away_goals.to_string(),
        f.result.code().to_string(),
        opt_to_string(f.home_xg),
        opt_to_string(f.away_xg),
        opt_to_string(f.home_possession),
        opt_to_string(f.away_possession),
        opt_to_string(f.home_shots),
        opt_to_string(f.away_shots),
        opt_to_string(f.home_shots_on_target),
        opt_to_string(f.away_shots_on_target),
        opt_to_string(f.home_shot_distance),
        opt_to_string(f.away_shot_distance),
        opt_to_string(f.home_rating),
        opt_to_string(f.away_rating),
        opt_to_string(f.home_rest_days),
        opt_to_string(f.away_rest_days),
    ]
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn write_feature_csv<W: Write>(writer: W, dataset: &FeatureDataset) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in table_rows(dataset) {
        wtr.write_record(&row).context("write feature row")?;
    }
    wtr.flush().context("flush feature csv")?;
    Ok(())
}

pub fn save_feature_csv(path: &Path, dataset: &FeatureDataset) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let file =
        File::create(path).with_context(|| format!("create feature csv {}", path.display()))?;
    write_feature_csv(file, dataset)?;
    info!(rows = dataset.len(), path = %path.display(), "wrote feature csv");
    Ok(())
}

pub fn export_xlsx(path: &Path, dataset: &FeatureDataset) -> Result<()> {
    let rows = table_rows(dataset);
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Features")?;
        write_rows(sheet, &rows)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;
    info!(rows = dataset.len(), path = %path.display(), "wrote feature workbook");
    Ok(())
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
