use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::matching::Matchable;
use crate::names::{CanonicalName, canonical_team_abbv, expand_qb_abbreviation, team_identity};
use crate::snapshot::{
    SnapshotDir, Table, parse_json, parse_number, parse_percent_fraction, parse_rank,
    parse_table_pages, pick_f64, pick_string, require_cells,
};

pub const DEF_STATS_FILE: &str = "nfl_def_stats.json";
pub const DEF_STATS_ENDPOINT: &str =
    "https://api.lineups.com/nfl/fetch/teams/stats/defense-stats/current";
pub const DVOA_FILE: &str = "dvoa.json";
pub const OFFENSIVE_LINE_FILE: &str = "ol.json";
pub const DEFENSIVE_LINE_FILE: &str = "dl.json";
pub const QB_FILE: &str = "qb.json";

/// Pass-defense totals for one team.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamDefense {
    pub yds_per_att: Option<f64>,
    /// Completions / attempts; unavailable with zero attempts.
    pub comp_pct: Option<f64>,
    /// Touchdowns / attempts; unavailable with zero attempts.
    pub td_pct: Option<f64>,
}

pub fn parse_def_stats_json(
    raw: &str,
    source_name: &str,
) -> Result<HashMap<String, TeamDefense>, SourceError> {
    let root = parse_json(raw, source_name)?;
    let items = match root {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    };

    let mut out = HashMap::with_capacity(items.len());
    for item in &items {
        let Some(team_name) = pick_string(item, &["team"]) else {
            continue;
        };
        let team = team_identity(&team_name).to_string();
        let attempts = pick_f64(item, &["passing_attempts"]);
        let per_attempt = |count: Option<f64>| match (count, attempts) {
            (Some(count), Some(att)) if att > 0.0 => Some(count / att),
            _ => None,
        };
        let defense = TeamDefense {
            yds_per_att: pick_f64(item, &["passing_yards_per_attempt"]),
            comp_pct: per_attempt(pick_f64(item, &["passing_completions"])),
            td_pct: per_attempt(pick_f64(item, &["passing_touchdowns"])),
        };
        out.insert(team, defense);
    }
    Ok(out)
}

/// Opponent-adjusted defensive ranks for one team (1 = best defense).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DvoaTeam {
    pub pass_def_rank: Option<u32>,
    pub rush_def_rank: Option<u32>,
    pub wr1_rank: Option<u32>,
    pub wr2_rank: Option<u32>,
    pub te_rank: Option<u32>,
    pub rb_rank: Option<u32>,
}

// Team defense table: rank, team, dvoa, last week, dave, total rank, pass, pass rank, rush, rush rank, ...
const DVOA_TEAM_COL: usize = 1;
const DVOA_PASS_RANK_COL: usize = 7;
const DVOA_RUSH_RANK_COL: usize = 9;
// Receiver table: team, then (dvoa, rank, pa/g, yd/g) for WR1, WR2, other WR, TE, RB.
const RECV_TEAM_COL: usize = 0;
const RECV_WR1_RANK_COL: usize = 2;
const RECV_WR2_RANK_COL: usize = 6;
const RECV_TE_RANK_COL: usize = 14;
const RECV_RB_RANK_COL: usize = 18;

pub fn parse_dvoa_json(
    raw: &str,
    source_name: &str,
) -> Result<HashMap<String, DvoaTeam>, SourceError> {
    let pages = parse_table_pages(raw, source_name)?;
    let mut out: HashMap<String, DvoaTeam> = HashMap::new();

    if let Some(team_table) = pages.first() {
        for (row_idx, row) in team_table.iter().enumerate() {
            require_cells(row, DVOA_RUSH_RANK_COL + 1, source_name, row_idx)?;
            let entry = out
                .entry(canonical_team_abbv(&row[DVOA_TEAM_COL]))
                .or_default();
            entry.pass_def_rank = parse_rank(&row[DVOA_PASS_RANK_COL]);
            entry.rush_def_rank = parse_rank(&row[DVOA_RUSH_RANK_COL]);
        }
    }
    if let Some(receiver_table) = pages.get(1) {
        for (row_idx, row) in receiver_table.iter().enumerate() {
            require_cells(row, RECV_RB_RANK_COL + 1, source_name, row_idx)?;
            let entry = out
                .entry(canonical_team_abbv(&row[RECV_TEAM_COL]))
                .or_default();
            entry.wr1_rank = parse_rank(&row[RECV_WR1_RANK_COL]);
            entry.wr2_rank = parse_rank(&row[RECV_WR2_RANK_COL]);
            entry.te_rank = parse_rank(&row[RECV_TE_RANK_COL]);
            entry.rb_rank = parse_rank(&row[RECV_RB_RANK_COL]);
        }
    }
    Ok(out)
}

/// Run blocking and pass protection figures for one team's line.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineRanking {
    pub adj_line_yds: Option<f64>,
    /// Fraction, e.g. `0.065` for `"6.5%"`.
    pub adj_sack_rate: Option<f64>,
}

const LINE_TEAM_COL: usize = 1;
const LINE_ADJ_YDS_COL: usize = 2;
const LINE_MIN_CELLS: usize = 4;

pub fn parse_line_json(
    raw: &str,
    source_name: &str,
) -> Result<HashMap<String, LineRanking>, SourceError> {
    let pages = parse_table_pages(raw, source_name)?;
    let Some(table) = pages.first() else {
        return Ok(HashMap::new());
    };
    let mut out = HashMap::with_capacity(table.len());
    for (row_idx, row) in table.iter().enumerate() {
        require_cells(row, LINE_MIN_CELLS, source_name, row_idx)?;
        let ranking = LineRanking {
            adj_line_yds: parse_number(&row[LINE_ADJ_YDS_COL]),
            adj_sack_rate: row.last().and_then(|cell| parse_percent_fraction(cell)),
        };
        out.insert(canonical_team_abbv(&row[LINE_TEAM_COL]), ranking);
    }
    Ok(out)
}

/// Quarterback efficiency merged from the passing and rushing tables.
#[derive(Debug, Clone, PartialEq)]
pub struct QbLine {
    pub identity: CanonicalName,
    pub team: Option<String>,
    pub pass_dyar: Option<f64>,
    pub qbr: Option<f64>,
    pub rush_yds: Option<f64>,
}

impl Matchable for QbLine {
    fn identity(&self) -> Option<&CanonicalName> {
        Some(&self.identity)
    }

    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.identity.as_str()]
    }
}

// Column layout per table, name at column 0 and team at column 1 in all three.
struct QbTableLayout {
    pass_dyar: Option<usize>,
    qbr: Option<usize>,
    rush_yds: Option<usize>,
}

const QB_TABLES: [QbTableLayout; 3] = [
    // Qualifying passers.
    QbTableLayout { pass_dyar: Some(2), qbr: Some(9), rush_yds: None },
    // Passers below the attempt threshold.
    QbTableLayout { pass_dyar: Some(2), qbr: Some(6), rush_yds: None },
    // Rushing.
    QbTableLayout { pass_dyar: None, qbr: None, rush_yds: Some(10) },
];

pub fn parse_qb_json(raw: &str, source_name: &str) -> Result<Vec<QbLine>, SourceError> {
    let pages = parse_table_pages(raw, source_name)?;
    let mut lines: Vec<QbLine> = Vec::new();
    let mut index: HashMap<CanonicalName, usize> = HashMap::new();

    for (table, layout) in pages.iter().zip(QB_TABLES.iter()) {
        merge_qb_table(table, layout, source_name, &mut lines, &mut index)?;
    }
    Ok(lines)
}

fn merge_qb_table(
    table: &Table,
    layout: &QbTableLayout,
    source_name: &str,
    lines: &mut Vec<QbLine>,
    index: &mut HashMap<CanonicalName, usize>,
) -> Result<(), SourceError> {
    let needed = [layout.pass_dyar, layout.qbr, layout.rush_yds]
        .into_iter()
        .flatten()
        .max()
        .unwrap_or(1)
        + 1;
    for (row_idx, row) in table.iter().enumerate() {
        require_cells(row, needed, source_name, row_idx)?;
        let Some(identity) = expand_qb_abbreviation(&row[0]) else {
            debug!("{source_name} row {row_idx}: unknown quarterback {:?}", row[0]);
            continue;
        };
        let cell = |col: Option<usize>| col.and_then(|c| parse_number(&row[c]));
        let slot = *index.entry(identity.clone()).or_insert_with(|| {
            lines.push(QbLine {
                identity: identity.clone(),
                team: Some(canonical_team_abbv(&row[1])).filter(|t| !t.is_empty()),
                pass_dyar: None,
                qbr: None,
                rush_yds: None,
            });
            lines.len() - 1
        });
        let line = &mut lines[slot];
        line.pass_dyar = line.pass_dyar.or(cell(layout.pass_dyar));
        line.qbr = line.qbr.or(cell(layout.qbr));
        line.rush_yds = line.rush_yds.or(cell(layout.rush_yds));
    }
    Ok(())
}

/// Team- and quarterback-level analytics for one run. Every table is optional.
#[derive(Debug, Clone, Default)]
pub struct Analytics {
    pub defense: HashMap<String, TeamDefense>,
    pub dvoa: HashMap<String, DvoaTeam>,
    pub offensive_line: HashMap<String, LineRanking>,
    pub defensive_line: HashMap<String, LineRanking>,
    pub quarterbacks: Vec<QbLine>,
}

impl Analytics {
    pub fn load(dir: &SnapshotDir) -> Result<Self, SourceError> {
        let mut analytics = Analytics::default();
        if let Some(raw) = dir.read_optional(DEF_STATS_FILE)? {
            analytics.defense = parse_def_stats_json(&raw, DEF_STATS_FILE)?;
        }
        if let Some(raw) = dir.read_optional(DVOA_FILE)? {
            analytics.dvoa = parse_dvoa_json(&raw, DVOA_FILE)?;
        }
        if let Some(raw) = dir.read_optional(OFFENSIVE_LINE_FILE)? {
            analytics.offensive_line = parse_line_json(&raw, OFFENSIVE_LINE_FILE)?;
        }
        if let Some(raw) = dir.read_optional(DEFENSIVE_LINE_FILE)? {
            analytics.defensive_line = parse_line_json(&raw, DEFENSIVE_LINE_FILE)?;
        }
        if let Some(raw) = dir.read_optional(QB_FILE)? {
            analytics.quarterbacks = parse_qb_json(&raw, QB_FILE)?;
        }
        Ok(analytics)
    }
}
