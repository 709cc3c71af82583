use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};

use crate::fixture::{FeatureDataset, Fixture};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredFixture {
    pub fixture_key: String,
    pub date: String,
    pub competition: String,
    pub home_team: String,
    pub away_team: String,
    pub home_goals: u32,
    pub away_goals: u32,
    pub result: String,
    pub home_rating: Option<f64>,
    pub away_rating: Option<f64>,
    pub home_rest_days: Option<i64>,
    pub away_rest_days: Option<i64>,
    pub features: BTreeMap<String, f64>,
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS fixtures (
            fixture_key TEXT PRIMARY KEY,
            date TEXT NOT NULL,
            season INTEGER NOT NULL,
            round TEXT NOT NULL,
            competition TEXT NOT NULL,
            home_team TEXT NOT NULL,
            away_team TEXT NOT NULL,
            home_goals INTEGER NOT NULL,
            away_goals INTEGER NOT NULL,
            result TEXT NOT NULL,
            home_rating REAL NULL,
            away_rating REAL NULL,
            home_rest_days INTEGER NULL,
            away_rest_days INTEGER NULL,
            features_json TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_fixtures_date ON fixtures(date);
        CREATE INDEX IF NOT EXISTS idx_fixtures_competition ON fixtures(competition);

        CREATE TABLE IF NOT EXISTS build_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            finished_at TEXT NOT NULL,
            fixtures_upserted INTEGER NOT NULL,
            columns_json TEXT NOT NULL
        );
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Upserts every fixture by key and records the run. Returns rows written.
pub fn save_dataset(conn: &mut Connection, dataset: &FeatureDataset) -> Result<usize> {
    let tx = conn.transaction().context("begin dataset transaction")?;
    for fixture in &dataset.fixtures {
        upsert_fixture(&tx, fixture)?;
    }
    let columns_json = serde_json::to_string(&dataset.columns).context("serialize columns")?;
    tx.execute(
        "INSERT INTO build_runs(finished_at, fixtures_upserted, columns_json) VALUES (?1, ?2, ?3)",
        params![Utc::now().to_rfc3339(), dataset.len() as i64, columns_json],
    )
    .context("insert build run")?;
    tx.commit().context("commit dataset transaction")?;
    Ok(dataset.len())
}

fn upsert_fixture(tx: &rusqlite::Transaction<'_>, f: &Fixture) -> Result<()> {
    let features_json = serde_json::to_string(&f.features).context("serialize features")?;
    tx.execute(
        r#"
        INSERT INTO fixtures (
            fixture_key, date, season, round, competition,
            home_team, away_team, home_goals, away_goals, result,
            home_rating, away_rating, home_rest_days, away_rest_days,
            features_json, updated_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8, ?9, ?10,
            ?11, ?12, ?13, ?14,
            ?15, ?16
        )
        ON CONFLICT(fixture_key) DO UPDATE SET
            date = excluded.date,
            season = excluded.season,
            round = excluded.round,
            competition = excluded.competition,
            home_team = excluded.home_team,
            away_team = excluded.away_team,
            home_goals = excluded.home_goals,
            away_goals = excluded.away_goals,
            result = excluded.result,
            home_rating = excluded.home_rating,
            away_rating = excluded.away_rating,
            home_rest_days = excluded.home_rest_days,
            away_rest_days = excluded.away_rest_days,
            features_json = excluded.features_json,
            updated_at = excluded.updated_at
        "#,
        params![
            f.key.to_string(),
            f.date.format("%Y-%m-%d").to_string(),
            f.season,
            f.round,
            f.competition,
            f.home_team,
            f.away_team,
            f.home_goals,
            f.away_goals,
            f.result.code(),
            f.home_rating,
            f.away_rating,
            f.home_rest_days,
            f.away_rest_days,
            features_json,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("upsert fixture")?;
    Ok(())
}

pub fn load_fixtures(conn: &Connection) -> Result<Vec<StoredFixture>> {
    let mut stmt = conn
        .prepare(
            r#"
            SELECT
                fixture_key, date, competition, home_team, away_team,
                home_goals, away_goals, result,
                home_rating, away_rating, home_rest_days, away_rest_days,
                features_json
            FROM fixtures
            ORDER BY date ASC, fixture_key ASC
            "#,
        )
        .context("prepare load fixtures query")?;

    let rows = stmt
        .query_map([], |row| {
            Ok((
                StoredFixture {
                    fixture_key: row.get(0)?,
                    date: row.get(1)?,
                    competition: row.get(2)?,
                    home_team: row.get(3)?,
                    away_team: row.get(4)?,
                    home_goals: row.get(5)?,
                    away_goals: row.get(6)?,
                    result: row.get(7)?,
                    home_rating: row.get(8)?,
                    away_rating: row.get(9)?,
                    home_rest_days: row.get(10)?,
                    away_rest_days: row.get(11)?,
                    features: BTreeMap::new(),
                },
                row.get::<_, String>(12)?,
            ))
        })
        .context("query load fixtures")?;

    let mut out = Vec::new();
    for row in rows {
        let (mut stored, features_json) = row.context("decode fixture row")?;
        stored.features = serde_json::from_str(&features_json)
            .with_context(|| format!("decode features of {}", stored.fixture_key))?;
        out.push(stored);
    }
    Ok(out)
}

pub fn build_run_count(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM build_runs", [], |row| row.get(0))
        .context("count build runs")
}
