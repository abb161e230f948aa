use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::rules::schema::{RuleTable, Scenario};
use crate::types::{Roster, Worker};

/// Reads a JSON input. A missing file yields `T::default()`.
fn load_or_default<T: DeserializeOwned + Default>(path: &Path, what: &str) -> Result<T> {
    if !path.exists() {
        warn!("{what} not found at {}, using empty input", path.display());
        return Ok(T::default());
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading {what}: {}", path.display()))?;
    let parsed = serde_json::from_str(&data)
        .with_context(|| format!("failed parsing {what}: {}", path.display()))?;
    Ok(parsed)
}

pub fn load_rule_table(path: &Path) -> Result<RuleTable> {
    load_or_default(path, "rule table")
}

pub fn load_roster(path: &Path) -> Result<Roster> {
    let workers: Vec<Worker> = load_or_default(path, "roster")?;
    Ok(Roster::from_workers(workers))
}

pub fn load_scenario(path: &Path) -> Result<Scenario> {
    load_or_default(path, "scenario")
}
