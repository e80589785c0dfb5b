use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::SourceError;

/// Table-shaped sources arrive already extracted from HTML: pages hold tables,
/// tables hold rows, rows hold trimmed cell text.
pub type Table = Vec<Vec<String>>;

/// Directory of flat cached source snapshots.
#[derive(Debug, Clone)]
pub struct SnapshotDir {
    root: PathBuf,
}

impl SnapshotDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    pub fn exists(&self, file_name: &str) -> bool {
        self.path(file_name).is_file()
    }

    pub fn read(&self, file_name: &str) -> Result<String, SourceError> {
        read_text(&self.path(file_name))
    }

    /// Read a snapshot that may legitimately be absent.
    pub fn read_optional(&self, file_name: &str) -> Result<Option<String>, SourceError> {
        match self.read(file_name) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.is_not_found() => {
                warn!("optional source {file_name} not found in {}", self.root.display());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Write a snapshot via tmp file + rename so readers never see a partial file.
    pub fn write(&self, file_name: &str, body: &str) -> Result<(), SourceError> {
        let path = self.path(file_name);
        fs::create_dir_all(&self.root).map_err(|source| SourceError::Io {
            path: self.root.display().to_string(),
            source,
        })?;
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, body).map_err(|source| SourceError::Io {
            path: tmp.display().to_string(),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        debug!("wrote snapshot {}", path.display());
        Ok(())
    }
}

pub fn read_text(path: &Path) -> Result<String, SourceError> {
    fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.display().to_string(),
        source,
    })
}

pub fn parse_json(raw: &str, source_name: &str) -> Result<Value, SourceError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Value::Null);
    }
    serde_json::from_str(trimmed).map_err(|source| SourceError::Json {
        source_name: source_name.to_string(),
        source,
    })
}

/// Parse a page of tables. A bare table (rows of cells) is accepted as a
/// single-table page. Rows without cells (header-only rows) are dropped.
pub fn parse_table_pages(raw: &str, source_name: &str) -> Result<Vec<Table>, SourceError> {
    let root = parse_json(raw, source_name)?;
    let Value::Array(items) = root else {
        return Ok(Vec::new());
    };
    let is_bare_table = items
        .iter()
        .all(|row| row.as_array().is_some_and(|cells| cells.iter().all(|c| !c.is_array())));
    let tables = if is_bare_table {
        vec![Value::Array(items)]
    } else {
        items
    };

    let mut out = Vec::with_capacity(tables.len());
    for table in tables {
        let rows = table.as_array().cloned().unwrap_or_default();
        out.push(
            rows.iter()
                .filter_map(|row| row.as_array())
                .map(|cells| cells.iter().map(cell_text).collect::<Vec<_>>())
                .filter(|cells| !cells.is_empty())
                .collect(),
        );
    }
    Ok(out)
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Require `expected` cells in `row`, surfacing a partial scrape as a hard failure.
pub fn require_cells(
    row: &[String],
    expected: usize,
    source_name: &str,
    row_idx: usize,
) -> Result<(), SourceError> {
    if row.len() < expected {
        return Err(SourceError::MalformedRow {
            source_name: source_name.to_string(),
            row: row_idx,
            expected,
            found: row.len(),
        });
    }
    Ok(())
}

/// Numeric cell text: thousands separators, currency and sign decorations
/// removed. `"-"`, `""` and `"N/A"` are unavailable.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .trim_start_matches('$')
        .trim_start_matches('+')
        .trim_end_matches('%')
        .replace([',', '$'], "");
    if cleaned.is_empty() || cleaned == "-" || cleaned.eq_ignore_ascii_case("n/a") {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// `"6.5%"` -> `0.065`.
pub fn parse_percent_fraction(raw: &str) -> Option<f64> {
    parse_number(raw).map(|v| v / 100.0)
}

pub fn parse_rank(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// A JSON number, or a string holding one.
pub fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_number(s),
        _ => None,
    }
}

pub fn pick_string(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .filter_map(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

pub fn pick_f64(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| value.get(*key))
        .find_map(value_as_f64)
}
