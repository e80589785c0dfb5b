use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::names::canonical_team_abbv;
use crate::player::VegasFields;
use crate::snapshot::{parse_json, pick_f64, pick_string};

pub const VEGAS_FILE: &str = "vegas.json";

/// Betting fields keyed by canonical team abbreviation.
pub type VegasLines = HashMap<String, VegasFields>;

/// Parse the betting snapshot. Accepts a bare JSON array or the page script
/// it was cut from (`data = [...];`).
pub fn parse_vegas_json(raw: &str, source_name: &str) -> Result<VegasLines, SourceError> {
    let body = extract_embedded_array(raw);
    let root = parse_json(body, source_name)?;
    let items = match root {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };

    let mut lines = HashMap::with_capacity(items.len());
    for item in &items {
        let Some(team) = pick_string(item, &["team"]) else {
            debug!("{source_name}: skipping line without team");
            continue;
        };
        let line = VegasFields {
            over_under: pick_f64(item, &["overunder", "over_under"]),
            line: pick_f64(item, &["line"]),
            projected: pick_f64(item, &["projected"]),
        };
        lines.insert(canonical_team_abbv(&team), line);
    }
    Ok(lines)
}

fn extract_embedded_array(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        return trimmed;
    }
    let Some(start) = trimmed.find("data = ") else {
        return trimmed;
    };
    let rest = &trimmed[start + "data = ".len()..];
    match rest.find("];") {
        Some(end) => &rest[..=end],
        None => rest.trim_end_matches(';'),
    }
}
