use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::SourceError;
use crate::names::{CanonicalName, canonical_team_abbv};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    DST,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::DST,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "QB" => Some(Position::QB),
            "RB" => Some(Position::RB),
            "WR" => Some(Position::WR),
            "TE" => Some(Position::TE),
            "DST" | "D" | "DEF" | "D/ST" => Some(Position::DST),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::DST => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opponent and venue parsed once from a "TEAM@TEAM date time" string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    /// Canonical abbreviation; the join key into opponent tables.
    pub opponent: String,
    /// "vs. OPP" at home, "at OPP" away.
    pub opp_display: String,
    pub is_home: bool,
    pub kickoff: Option<NaiveDateTime>,
}

/// Parse a matchup string. The first team listed is the home team. Both codes
/// and `team_abbv` are canonicalized before comparing, so `JAC@PHI` and `JAX`
/// agree.
pub fn parse_matchup(game_info: &str, team_abbv: &str) -> Result<Matchup, SourceError> {
    let malformed = || SourceError::MalformedMatchup {
        game_info: game_info.to_string(),
    };
    let trimmed = game_info.trim();
    let (teams, when) = match trimmed.split_once(char::is_whitespace) {
        Some((teams, rest)) => (teams, rest.trim()),
        None => (trimmed, ""),
    };
    let (home, away) = teams.split_once('@').ok_or_else(malformed)?;
    let (home, away) = (home.trim(), away.trim());
    if home.is_empty() || away.is_empty() || away.contains('@') {
        return Err(malformed());
    }
    let (home, away) = (canonical_team_abbv(home), canonical_team_abbv(away));

    let is_home = canonical_team_abbv(team_abbv) == home;
    let (opponent, opp_display) = if is_home {
        let display = format!("vs. {away}");
        (away, display)
    } else {
        let display = format!("at {home}");
        (home, display)
    };
    Ok(Matchup {
        opponent,
        opp_display,
        is_home,
        kickoff: parse_kickoff(when),
    })
}

// Observed: "10/28/2018 01:00PM ET".
fn parse_kickoff(raw: &str) -> Option<NaiveDateTime> {
    let mut parts = raw.split_whitespace();
    let date = parts.next()?;
    let time = parts.next()?;
    NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%m/%d/%Y %I:%M%p").ok()
}

/// Salary as a fraction of the contest cap.
pub fn salary_fraction(salary: u32, cap: f64) -> f64 {
    if cap <= 0.0 {
        return 0.0;
    }
    f64::from(salary) / cap
}

/// One-decimal percentage text, e.g. `0.172` -> `"17.2%"`.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EcrFields {
    /// Rank as published by the ranking site.
    pub rank: u32,
    /// Numeric score the rank engine orders by (lower is better).
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct VegasFields {
    pub over_under: Option<f64>,
    pub line: Option<f64>,
    pub projected: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SecondarySalary {
    pub salary: u32,
    pub fraction: f64,
}

/// Fields every position shares.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseFields {
    pub name: CanonicalName,
    pub display_name: String,
    pub team_abbv: String,
    pub salary: u32,
    pub salary_fraction: f64,
    pub matchup: Matchup,
    pub average_ppg: Option<f64>,
    pub ecr: EcrFields,
    pub vegas: VegasFields,
    pub secondary_salary: Option<SecondarySalary>,
}

/// Usage figures for one granularity (season average or last week).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Usage {
    pub snap_pct: Option<f64>,
    pub rush_atts: Option<f64>,
    pub targets: Option<f64>,
    pub receptions: Option<f64>,
    pub red_zone_opps: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QbDetail {
    pub oline_sack_rate: Option<f64>,
    pub opp_dline_sack_rate: Option<f64>,
    pub rush_yds: Option<f64>,
    pub pass_dyar: Option<f64>,
    pub qbr: Option<f64>,
    pub opp_pass_def_rank: Option<u32>,
    pub opp_yds_per_att: Option<f64>,
    pub opp_comp_pct: Option<f64>,
    pub opp_td_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RbDetail {
    pub opp_run_def_rank: Option<u32>,
    pub opp_rb_pass_def_rank: Option<u32>,
    pub oline_adj_line_yds: Option<f64>,
    pub opp_dline_adj_line_yds: Option<f64>,
    pub season: Usage,
    pub last_week: Usage,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WrDetail {
    pub opp_pass_def_rank: Option<u32>,
    pub opp_wr1_rank: Option<u32>,
    pub opp_wr2_rank: Option<u32>,
    pub season: Usage,
    pub last_week: Usage,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TeDetail {
    pub opp_pass_def_rank: Option<u32>,
    pub opp_te_rank: Option<u32>,
    pub season: Usage,
    pub last_week: Usage,
}

/// Position-specific payload. Exactly one per record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PositionDetail {
    Qb(QbDetail),
    Rb(RbDetail),
    Wr(WrDetail),
    Te(TeDetail),
    Dst,
}

impl PositionDetail {
    pub fn position(&self) -> Position {
        match self {
            PositionDetail::Qb(_) => Position::QB,
            PositionDetail::Rb(_) => Position::RB,
            PositionDetail::Wr(_) => Position::WR,
            PositionDetail::Te(_) => Position::TE,
            PositionDetail::Dst => Position::DST,
        }
    }
}

/// One player, fully populated from every matched source. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRecord {
    base: BaseFields,
    detail: PositionDetail,
}

impl PlayerRecord {
    pub fn new(base: BaseFields, detail: PositionDetail) -> Self {
        Self { base, detail }
    }

    pub fn base(&self) -> &BaseFields {
        &self.base
    }

    pub fn detail(&self) -> &PositionDetail {
        &self.detail
    }

    pub fn position(&self) -> Position {
        self.detail.position()
    }

    pub fn name(&self) -> &CanonicalName {
        &self.base.name
    }
}

/// Rank-engine outputs for one player, relative to the rest of its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankFields {
    pub ecr_rank: u32,
    pub salary_rank: u32,
    /// `salary_rank - ecr_rank`; positive marks a value play.
    pub value_diff: i64,
    pub secondary_salary_rank: Option<u32>,
    /// `secondary_salary_rank - salary_rank`.
    pub secondary_value_diff: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPlayer {
    pub record: PlayerRecord,
    pub ranks: RankFields,
}
