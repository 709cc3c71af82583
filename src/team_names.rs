use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use serde::Deserialize;

static TEAM_NAMES: OnceCell<TeamNameMap> = OnceCell::new();

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct TeamNameMap {
    source_to_canonical: BTreeMap<String, String>,
}

impl TeamNameMap {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw.trim()).context("invalid team name mapping json")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read team name mapping {}", path.display()))?;
        Self::from_json_str(&raw)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.source_to_canonical
            .iter()
            .map(|(s, c)| (s.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.source_to_canonical.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source_to_canonical.is_empty()
    }
}

pub fn team_names(path: &Path) -> Result<&'static TeamNameMap> {
    TEAM_NAMES.get_or_try_init(|| TeamNameMap::load(path))
}
