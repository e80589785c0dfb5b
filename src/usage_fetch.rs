use std::collections::{BTreeMap, HashMap};

use serde_json::Value;
use tracing::debug;

use crate::error::SourceError;
use crate::matching::Matchable;
use crate::names::{CanonicalName, canonical_team_abbv, normalize};
use crate::player::Position;
use crate::snapshot::{SnapshotDir, parse_json, pick_f64, pick_string, value_as_f64};
use crate::weekly::WeeklySeries;

const NAME_KEYS: &[&str] = &["full_name", "name"];
const SEASON_KEYS: &[&str] = &["average", "season_snap_percent"];
const WEEK_KEYS: &[&str] = &["weeks", "snap_percentage_by_week"];

/// Per-player usage feeds published by the stats API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UsageFeed {
    Snaps,
    Targets,
    Receptions,
    RushAtts,
    RedZoneRushes,
    /// Red-zone targets are published per receiving position.
    RedZoneTargets(Position),
}

impl UsageFeed {
    pub const REDZONE_TARGET_POSITIONS: [Position; 3] = [Position::RB, Position::WR, Position::TE];

    pub fn all() -> Vec<UsageFeed> {
        let mut feeds = vec![
            UsageFeed::Snaps,
            UsageFeed::Targets,
            UsageFeed::Receptions,
            UsageFeed::RushAtts,
            UsageFeed::RedZoneRushes,
        ];
        feeds.extend(
            Self::REDZONE_TARGET_POSITIONS
                .iter()
                .map(|pos| UsageFeed::RedZoneTargets(*pos)),
        );
        feeds
    }

    pub fn file_name(self) -> String {
        match self {
            UsageFeed::Snaps => "nfl_snaps.json".to_string(),
            UsageFeed::Targets => "nfl_targets.json".to_string(),
            UsageFeed::Receptions => "nfl_receptions.json".to_string(),
            UsageFeed::RushAtts => "nfl_rush_atts.json".to_string(),
            UsageFeed::RedZoneRushes => "nfl_redzone_rushes.json".to_string(),
            UsageFeed::RedZoneTargets(pos) => format!("nfl_redzone_targets_{}.json", pos.as_str()),
        }
    }

    pub fn endpoint(self, season: u32) -> String {
        const BASE: &str = "https://api.lineups.com/nfl/fetch";
        match self {
            UsageFeed::Snaps => format!("{BASE}/snaps/{season}/OFF"),
            UsageFeed::Targets => format!("{BASE}/targets/{season}/OFF"),
            UsageFeed::Receptions => format!("{BASE}/receptions/{season}/OFF"),
            UsageFeed::RushAtts => format!("{BASE}/rush/{season}/OFF"),
            UsageFeed::RedZoneRushes => format!("{BASE}/redzone-rush/{season}/OFF"),
            UsageFeed::RedZoneTargets(pos) => {
                format!("{BASE}/redzone-targets/{season}/{}", pos.as_str())
            }
        }
    }
}

/// One player's line in a usage feed.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageLine {
    pub raw_name: String,
    pub identity: CanonicalName,
    pub team: Option<String>,
    pub position: Option<String>,
    /// Season average as published, else the mean of observed weeks.
    pub season: Option<f64>,
    pub weeks: WeeklySeries,
}

impl Matchable for UsageLine {
    fn identity(&self) -> Option<&CanonicalName> {
        Some(&self.identity)
    }

    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.raw_name.as_str()]
    }
}

pub fn parse_usage_json(
    raw: &str,
    season_weeks: usize,
    source_name: &str,
) -> Result<Vec<UsageLine>, SourceError> {
    let root = parse_json(raw, source_name)?;
    let items = match root {
        Value::Object(mut map) => match map.remove("data") {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        Value::Array(items) => items,
        _ => Vec::new(),
    };

    let mut out = Vec::with_capacity(items.len());
    for item in &items {
        let Some(raw_name) = pick_string(item, NAME_KEYS) else {
            debug!("{source_name}: skipping line without a name");
            continue;
        };
        let weeks = WEEK_KEYS
            .iter()
            .find_map(|key| item.get(*key))
            .map(|value| parse_weeks(value, season_weeks))
            .unwrap_or_else(|| WeeklySeries::padded(std::iter::empty(), season_weeks));
        let season = pick_f64(item, SEASON_KEYS).or_else(|| weeks.observed_mean());
        out.push(UsageLine {
            identity: normalize(&raw_name),
            team: pick_string(item, &["team"]).map(|t| canonical_team_abbv(&t)),
            position: pick_string(item, &["position"]),
            raw_name,
            season,
            weeks,
        });
    }
    Ok(out)
}

/// Weekly values arrive as a list in week order or as a `{"1": v}` map.
fn parse_weeks(value: &Value, season_weeks: usize) -> WeeklySeries {
    match value {
        Value::Array(items) => WeeklySeries::padded(items.iter().map(value_as_f64), season_weeks),
        Value::Object(map) => {
            let weeks = map
                .iter()
                .filter_map(|(week, v)| week.trim().parse::<usize>().ok().map(|w| (w, value_as_f64(v))))
                .collect::<BTreeMap<_, _>>();
            WeeklySeries::from_week_map(&weeks, season_weeks)
        }
        _ => WeeklySeries::padded(std::iter::empty(), season_weeks),
    }
}

/// All usage feeds for one run. A feed whose snapshot is absent is empty.
#[derive(Debug, Clone, Default)]
pub struct UsageStats {
    pub snaps: Vec<UsageLine>,
    pub targets: Vec<UsageLine>,
    pub receptions: Vec<UsageLine>,
    pub rush_atts: Vec<UsageLine>,
    pub redzone_rushes: Vec<UsageLine>,
    /// One feed per receiving position; a player may appear in several.
    pub redzone_targets: HashMap<Position, Vec<UsageLine>>,
}

impl UsageStats {
    pub fn load(dir: &SnapshotDir, season_weeks: usize) -> Result<Self, SourceError> {
        let read = |feed: UsageFeed| -> Result<Vec<UsageLine>, SourceError> {
            let file = feed.file_name();
            match dir.read_optional(&file)? {
                Some(raw) => parse_usage_json(&raw, season_weeks, &file),
                None => Ok(Vec::new()),
            }
        };

        let mut redzone_targets = HashMap::new();
        for pos in UsageFeed::REDZONE_TARGET_POSITIONS {
            redzone_targets.insert(pos, read(UsageFeed::RedZoneTargets(pos))?);
        }

        Ok(Self {
            snaps: read(UsageFeed::Snaps)?,
            targets: read(UsageFeed::Targets)?,
            receptions: read(UsageFeed::Receptions)?,
            rush_atts: read(UsageFeed::RushAtts)?,
            redzone_rushes: read(UsageFeed::RedZoneRushes)?,
            redzone_targets,
        })
    }

    /// Red-zone target feeds to search for a `position` player: that
    /// position's feed first, then the others.
    pub fn redzone_target_feeds(&self, position: Position) -> impl Iterator<Item = &[UsageLine]> {
        let others = UsageFeed::REDZONE_TARGET_POSITIONS
            .into_iter()
            .filter(move |pos| *pos != position);
        std::iter::once(position)
            .chain(others)
            .filter_map(|pos| self.redzone_targets.get(&pos))
            .map(Vec::as_slice)
    }
}
