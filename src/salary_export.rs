use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::SourceError;
use crate::matching::Matchable;
use crate::names::{
    CanonicalName, canonical_team_abbv, clean_cell, normalize, team_abbv_from_name, team_identity,
};
use crate::player::Position;
use crate::snapshot::parse_number;

const SALARY_EXPORT_FIELDS: usize = 9;
const SECONDARY_EXPORT_FIELDS: usize = 6;

/// One row of the contest salary export:
/// `Position, Name + ID, Name, ID, Roster Position, Salary, Game Info, TeamAbbrev, AvgPointsPerGame`.
#[derive(Debug, Clone, PartialEq)]
pub struct SalaryRow {
    pub position: Position,
    pub display_name: String,
    pub identity: CanonicalName,
    pub salary: u32,
    pub game_info: String,
    pub team_abbv: String,
    pub average_ppg: Option<f64>,
}

/// Parse the contest export. Rows for positions outside the report (kickers,
/// flex duplicates with unknown slots) are dropped.
pub fn parse_salary_export(raw: &str, source_name: &str) -> Result<Vec<SalaryRow>, SourceError> {
    let mut out = Vec::new();
    for (row_idx, record) in read_records(raw, source_name)?.into_iter().enumerate() {
        let row_idx = row_idx + 1;
        if record.len() < SALARY_EXPORT_FIELDS {
            return Err(SourceError::MalformedRow {
                source_name: source_name.to_string(),
                row: row_idx,
                expected: SALARY_EXPORT_FIELDS,
                found: record.len(),
            });
        }
        let Some(position) = Position::parse(&record[0]) else {
            debug!("{source_name} row {row_idx}: skipping position {:?}", &record[0]);
            continue;
        };
        let salary = parse_salary(&record[5]).ok_or_else(|| SourceError::InvalidValue {
            source_name: source_name.to_string(),
            row: row_idx,
            field: "salary",
            value: record[5].to_string(),
        })?;
        let display_name = record[2].trim().to_string();
        let team_abbv = record[7].trim().to_string();
        // Defenses are keyed by team, never by the nickname in the name column.
        let identity = match position {
            Position::DST => team_identity(&team_abbv),
            _ => normalize(&display_name),
        };
        out.push(SalaryRow {
            position,
            display_name,
            identity,
            salary,
            game_info: record[6].trim().to_string(),
            team_abbv,
            average_ppg: parse_number(&record[8]),
        });
    }
    Ok(out)
}

/// A row of the optional second salary source: position at column 0, name at
/// column 1, team at column 2, salary (`$12,345`) at column 5.
#[derive(Debug, Clone, PartialEq)]
pub struct SecondarySalaryRow {
    pub position: Option<Position>,
    pub raw_name: String,
    pub identity: CanonicalName,
    pub team: Option<String>,
    pub salary: u32,
}

impl Matchable for SecondarySalaryRow {
    fn identity(&self) -> Option<&CanonicalName> {
        Some(&self.identity)
    }

    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.identity.as_str(), self.raw_name.as_str()]
    }
}

pub fn parse_secondary_salaries(
    raw: &str,
    source_name: &str,
) -> Result<Vec<SecondarySalaryRow>, SourceError> {
    let mut out = Vec::new();
    for (row_idx, record) in read_records(raw, source_name)?.into_iter().enumerate() {
        let row_idx = row_idx + 1;
        if record.len() < SECONDARY_EXPORT_FIELDS {
            return Err(SourceError::MalformedRow {
                source_name: source_name.to_string(),
                row: row_idx,
                expected: SECONDARY_EXPORT_FIELDS,
                found: record.len(),
            });
        }
        let position = Position::parse(&record[0]);
        let raw_name = record[1].trim().to_string();
        let salary = parse_salary(&record[5]).ok_or_else(|| SourceError::InvalidValue {
            source_name: source_name.to_string(),
            row: row_idx,
            field: "salary",
            value: record[5].to_string(),
        })?;
        let team_cell = Some(canonical_team_abbv(&record[2])).filter(|t| !t.is_empty());
        // This source lists defenses by full team name.
        let (identity, team) = match position {
            Some(Position::DST) => {
                let identity = team_identity(&raw_name);
                let team = team_abbv_from_name(&raw_name)
                    .map(str::to_string)
                    .or(team_cell);
                (identity, team)
            }
            _ => (normalize(&clean_cell(&raw_name)), team_cell),
        };
        out.push(SecondarySalaryRow {
            position,
            raw_name,
            identity,
            team,
            salary,
        });
    }
    Ok(out)
}

fn read_records(raw: &str, source_name: &str) -> Result<Vec<StringRecord>, SourceError> {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .has_headers(true)
        .from_reader(raw.as_bytes());
    reader
        .records()
        .filter(|rec| !matches!(rec, Ok(r) if r.iter().all(|f| f.trim().is_empty())))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| SourceError::Csv {
            path: source_name.to_string(),
            source,
        })
}

fn parse_salary(raw: &str) -> Option<u32> {
    parse_number(raw)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0)
        .map(|v| v as u32)
}
