use anyhow::{Context, Result};
use std::path::Path;

use super::sort_unique_by_date;
use crate::model::DailyBar;

/// Load a JSON array of `{date, open, close}` records, sorted by date.
pub fn load_bars_file(path: &Path) -> Result<Vec<DailyBar>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bars file {}", path.display()))?;
    parse_bars_json(&raw).with_context(|| format!("failed to parse bars file {}", path.display()))
}

pub fn parse_bars_json(raw: &str) -> Result<Vec<DailyBar>> {
    let bars: Vec<DailyBar> = serde_json::from_str(raw)?;
    sort_unique_by_date(bars)
}
