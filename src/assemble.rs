use std::collections::HashMap;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::analytics_fetch::Analytics;
use crate::config::RunConfig;
use crate::error::{SkipReason, SourceError};
use crate::matching::{IdentityKey, Matchable, find};
use crate::names::canonical_team_abbv;
use crate::player::{
    BaseFields, EcrFields, PlayerRecord, Position, PositionDetail, QbDetail, RankedPlayer,
    RbDetail, SecondarySalary, TeDetail, Usage, WrDetail, parse_matchup, salary_fraction,
};
use crate::rank::rank_position;
use crate::rankings_fetch::{EcrRow, ecr_file_name, parse_ecr_json};
use crate::salary_export::{
    SalaryRow, SecondarySalaryRow, parse_salary_export, parse_secondary_salaries,
};
use crate::snapshot::{SnapshotDir, read_text};
use crate::usage_fetch::{UsageLine, UsageStats};
use crate::vegas_fetch::{VEGAS_FILE, VegasLines, parse_vegas_json};
use crate::weekly::{RedZoneFeed, last_week_value, red_zone_opportunities};

/// Every source collection for one run, already parsed.
#[derive(Debug, Clone, Default)]
pub struct SourceBundle {
    pub salaries: Vec<SalaryRow>,
    pub secondary_salaries: Vec<SecondarySalaryRow>,
    pub ecr: HashMap<Position, Vec<EcrRow>>,
    pub vegas: VegasLines,
    pub usage: UsageStats,
    pub analytics: Analytics,
}

impl SourceBundle {
    /// Load every source named by `cfg`. The salary export and the ranking
    /// tables are required; everything else degrades to empty.
    pub fn load(cfg: &RunConfig) -> Result<Self, SourceError> {
        let dir = SnapshotDir::new(&cfg.sources_dir);
        let salary_name = cfg.salary_csv.display().to_string();
        let salaries = parse_salary_export(&read_text(&cfg.salary_csv)?, &salary_name)?;

        let secondary_name = cfg.secondary_salary_csv.display().to_string();
        let secondary_salaries = match read_text(&cfg.secondary_salary_csv) {
            Ok(raw) => parse_secondary_salaries(&raw, &secondary_name)?,
            Err(err) if err.is_not_found() => {
                warn!("secondary salary file {secondary_name} not found; columns left blank");
                Vec::new()
            }
            Err(err) => return Err(err),
        };

        let mut ecr = HashMap::new();
        for position in Position::ALL {
            let file = ecr_file_name(position);
            let rows = parse_ecr_json(&dir.read(&file)?, position, &file)?;
            ecr.insert(position, rows);
        }

        let vegas = match dir.read_optional(VEGAS_FILE)? {
            Some(raw) => parse_vegas_json(&raw, VEGAS_FILE)?,
            None => VegasLines::new(),
        };

        Ok(Self {
            salaries,
            secondary_salaries,
            ecr,
            vegas,
            usage: UsageStats::load(&dir, cfg.season_weeks)?,
            analytics: Analytics::load(&dir)?,
        })
    }
}

/// Run-wide constants the per-player build needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildContext {
    pub week: usize,
    pub salary_cap: f64,
    pub secondary_salary_cap: f64,
}

impl From<&RunConfig> for BuildContext {
    fn from(cfg: &RunConfig) -> Self {
        Self {
            week: cfg.week,
            salary_cap: cfg.salary_cap,
            secondary_salary_cap: cfg.secondary_salary_cap,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionReport {
    pub position: Position,
    /// Salary-export order.
    pub players: Vec<RankedPlayer>,
}

/// A salary-export player left out of the report.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPlayer {
    pub display_name: String,
    pub position: Position,
    pub team_abbv: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    /// Fixed order: QB, RB, WR, TE, DST.
    pub positions: Vec<PositionReport>,
    pub skipped: Vec<SkippedPlayer>,
}

impl Report {
    pub fn player_count(&self) -> usize {
        self.positions.iter().map(|p| p.players.len()).sum()
    }

    pub fn position(&self, position: Position) -> Option<&PositionReport> {
        self.positions.iter().find(|p| p.position == position)
    }

    /// Earliest and latest kickoff among ranked players, when any game time parsed.
    pub fn slate_window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut kickoffs = self
            .positions
            .iter()
            .flat_map(|p| &p.players)
            .filter_map(|p| p.record.base().matchup.kickoff);
        let first = kickoffs.next()?;
        Some(kickoffs.fold((first, first), |(lo, hi), k| (lo.min(k), hi.max(k))))
    }
}

enum Built {
    Player(PlayerRecord),
    Skipped(SkippedPlayer),
}

/// Build, enrich and rank every player in the salary export.
///
/// Players are built independently in parallel; ranking waits for the whole
/// position. A malformed matchup string fails the run.
pub fn build_report(sources: &SourceBundle, ctx: &BuildContext) -> Result<Report, SourceError> {
    let mut report = Report::default();
    for position in Position::ALL {
        let rows = sources
            .salaries
            .iter()
            .filter(|row| row.position == position)
            .collect::<Vec<_>>();
        let ecr = sources
            .ecr
            .get(&position)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let secondary = sources
            .secondary_salaries
            .iter()
            .filter(|row| row.position.is_none_or(|p| p == position))
            .cloned()
            .collect::<Vec<_>>();

        let built = rows
            .par_iter()
            .map(|row| build_player(row, ecr, &secondary, sources, ctx))
            .collect::<Result<Vec<_>, SourceError>>()?;

        let mut records = Vec::with_capacity(built.len());
        for item in built {
            match item {
                Built::Player(record) => records.push(record),
                Built::Skipped(skipped) => report.skipped.push(skipped),
            }
        }
        info!("{position}: {} players ranked of {} listed", records.len(), rows.len());
        report.positions.push(PositionReport {
            position,
            players: rank_position(records),
        });
    }
    Ok(report)
}

fn build_player(
    row: &SalaryRow,
    ecr: &[EcrRow],
    secondary: &[SecondarySalaryRow],
    sources: &SourceBundle,
    ctx: &BuildContext,
) -> Result<Built, SourceError> {
    let team = canonical_team_abbv(&row.team_abbv);
    let key = IdentityKey::new(&row.identity, Some(&team));

    // No consensus rank means the player is not rosterable this week.
    let ecr_row = match find(ecr, &key) {
        Ok(found) => found,
        Err(err) => {
            let reason = SkipReason::from_match_error("ecr", err);
            warn!("{} ({}) excluded: {reason}", row.display_name, row.position);
            return Ok(Built::Skipped(SkippedPlayer {
                display_name: row.display_name.clone(),
                position: row.position,
                team_abbv: team,
                reason,
            }));
        }
    };

    let matchup = parse_matchup(&row.game_info, &team)?;

    let vegas = match sources.vegas.get(&team) {
        Some(line) => *line,
        None => {
            debug!("{}: no betting line for {team}", row.display_name);
            Default::default()
        }
    };
    let secondary_salary = lookup(secondary, &key, "secondary salary", &row.display_name)
        .map(|s| SecondarySalary {
            salary: s.salary,
            fraction: salary_fraction(s.salary, ctx.secondary_salary_cap),
        });

    let base = BaseFields {
        name: row.identity.clone(),
        display_name: row.display_name.clone(),
        team_abbv: team.clone(),
        salary: row.salary,
        salary_fraction: salary_fraction(row.salary, ctx.salary_cap),
        matchup,
        average_ppg: row.average_ppg,
        ecr: EcrFields {
            rank: ecr_row.rank,
            score: ecr_row.score,
        },
        vegas,
        secondary_salary,
    };

    let detail = position_detail(row, &key, &team, &base.matchup.opponent, sources, ctx);
    Ok(Built::Player(PlayerRecord::new(base, detail)))
}

fn position_detail(
    row: &SalaryRow,
    key: &IdentityKey<'_>,
    team: &str,
    opponent: &str,
    sources: &SourceBundle,
    ctx: &BuildContext,
) -> PositionDetail {
    let analytics = &sources.analytics;
    let dvoa = analytics.dvoa.get(opponent);
    if dvoa.is_none() && row.position != Position::DST {
        debug!("{}: no defensive ranks for opponent {opponent}", row.display_name);
    }
    let player = row.display_name.as_str();

    match row.position {
        Position::QB => {
            let qb = lookup(&analytics.quarterbacks, key, "quarterback tables", player);
            let defense = analytics.defense.get(opponent);
            PositionDetail::Qb(QbDetail {
                oline_sack_rate: analytics.offensive_line.get(team).and_then(|l| l.adj_sack_rate),
                opp_dline_sack_rate: analytics
                    .defensive_line
                    .get(opponent)
                    .and_then(|l| l.adj_sack_rate),
                rush_yds: qb.and_then(|q| q.rush_yds),
                pass_dyar: qb.and_then(|q| q.pass_dyar),
                qbr: qb.and_then(|q| q.qbr),
                opp_pass_def_rank: dvoa.and_then(|d| d.pass_def_rank),
                opp_yds_per_att: defense.and_then(|d| d.yds_per_att),
                opp_comp_pct: defense.and_then(|d| d.comp_pct),
                opp_td_pct: defense.and_then(|d| d.td_pct),
            })
        }
        Position::RB => {
            let (season, last_week) = usage(&sources.usage, key, row.position, player, ctx.week);
            PositionDetail::Rb(RbDetail {
                opp_run_def_rank: dvoa.and_then(|d| d.rush_def_rank),
                opp_rb_pass_def_rank: dvoa.and_then(|d| d.rb_rank),
                oline_adj_line_yds: analytics.offensive_line.get(team).and_then(|l| l.adj_line_yds),
                opp_dline_adj_line_yds: analytics
                    .defensive_line
                    .get(opponent)
                    .and_then(|l| l.adj_line_yds),
                season,
                last_week,
            })
        }
        Position::WR => {
            let (season, last_week) = usage(&sources.usage, key, row.position, player, ctx.week);
            PositionDetail::Wr(WrDetail {
                opp_pass_def_rank: dvoa.and_then(|d| d.pass_def_rank),
                opp_wr1_rank: dvoa.and_then(|d| d.wr1_rank),
                opp_wr2_rank: dvoa.and_then(|d| d.wr2_rank),
                season,
                last_week,
            })
        }
        Position::TE => {
            let (season, last_week) = usage(&sources.usage, key, row.position, player, ctx.week);
            PositionDetail::Te(TeDetail {
                opp_pass_def_rank: dvoa.and_then(|d| d.pass_def_rank),
                opp_te_rank: dvoa.and_then(|d| d.te_rank),
                season,
                last_week,
            })
        }
        Position::DST => PositionDetail::Dst,
    }
}

/// Season and last-week usage for one player.
fn usage(
    stats: &UsageStats,
    key: &IdentityKey<'_>,
    position: Position,
    player: &str,
    week: usize,
) -> (Usage, Usage) {
    let snaps = lookup(&stats.snaps, key, "snaps", player);
    let rush_atts = lookup(&stats.rush_atts, key, "rush attempts", player);
    let targets = lookup(&stats.targets, key, "targets", player);
    let receptions = lookup(&stats.receptions, key, "receptions", player);

    let feed = |line: Option<&UsageLine>| {
        line.map(|l| RedZoneFeed {
            season_average: l.season,
            last_week: l.weeks.week(week),
        })
    };
    let redzone_targets = stats
        .redzone_target_feeds(position)
        .find_map(|rows| lookup(rows, key, "red-zone targets", player));
    let red_zone = red_zone_opportunities(
        feed(redzone_targets),
        feed(lookup(&stats.redzone_rushes, key, "red-zone rushes", player)),
    );

    let season = Usage {
        snap_pct: snaps.and_then(|l| l.season),
        rush_atts: rush_atts.and_then(|l| l.season),
        targets: targets.and_then(|l| l.season),
        receptions: receptions.and_then(|l| l.season),
        red_zone_opps: red_zone.season,
    };
    let last = |line: Option<&UsageLine>| last_week_value(line.map(|l| &l.weeks), week);
    let last_week = Usage {
        snap_pct: last(snaps),
        rush_atts: last(rush_atts),
        targets: last(targets),
        receptions: last(receptions),
        red_zone_opps: red_zone.last_week,
    };
    (season, last_week)
}

// A missed enrichment blanks one field group; it never drops the player.
fn lookup<'r, R: Matchable>(
    rows: &'r [R],
    key: &IdentityKey<'_>,
    source: &'static str,
    player: &str,
) -> Option<&'r R> {
    if rows.is_empty() {
        return None;
    }
    match find(rows, key) {
        Ok(found) => Some(found),
        Err(err) => {
            debug!("{player}: {}", SkipReason::from_match_error(source, err));
            None
        }
    }
}
