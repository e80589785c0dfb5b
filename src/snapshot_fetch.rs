use anyhow::{Context, Result, anyhow};
use reqwest::blocking::Client;
use tracing::{info, warn};

use crate::analytics_fetch::{DEF_STATS_ENDPOINT, DEF_STATS_FILE};
use crate::http_client::get_text;
use crate::snapshot::SnapshotDir;
use crate::usage_fetch::UsageFeed;

/// A snapshot file with a known JSON endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSnapshot {
    pub file_name: String,
    pub url: String,
}

/// Every snapshot that can be downloaded directly. Table-shaped sources are
/// extracted from HTML elsewhere and are not listed.
pub fn remote_snapshots(season: u32) -> Vec<RemoteSnapshot> {
    let mut out = UsageFeed::all()
        .into_iter()
        .map(|feed| RemoteSnapshot {
            file_name: feed.file_name(),
            url: feed.endpoint(season),
        })
        .collect::<Vec<_>>();
    out.push(RemoteSnapshot {
        file_name: DEF_STATS_FILE.to_string(),
        url: DEF_STATS_ENDPOINT.to_string(),
    });
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Snapshot already on disk; nothing requested.
    Cached,
    Downloaded { bytes: usize },
}

/// Download `snapshot` unless it is already cached (or `refresh` is set).
/// The body must be JSON; it is written via tmp file + rename.
pub fn fetch_snapshot(
    client: &Client,
    dir: &SnapshotDir,
    snapshot: &RemoteSnapshot,
    refresh: bool,
) -> Result<FetchOutcome> {
    if !refresh && dir.exists(&snapshot.file_name) {
        return Ok(FetchOutcome::Cached);
    }
    let body = get_text(client, &snapshot.url)?;
    serde_json::from_str::<serde_json::Value>(&body)
        .map_err(|err| anyhow!("{} is not json: {err}", snapshot.url))?;
    dir.write(&snapshot.file_name, &body)
        .with_context(|| format!("write {}", snapshot.file_name))?;
    Ok(FetchOutcome::Downloaded { bytes: body.len() })
}

/// Fetch every remote snapshot, continuing past failures. Returns the number
/// of snapshots that could not be fetched.
pub fn fetch_all(client: &Client, dir: &SnapshotDir, season: u32, refresh: bool) -> usize {
    let mut failures = 0;
    for snapshot in remote_snapshots(season) {
        match fetch_snapshot(client, dir, &snapshot, refresh) {
            Ok(FetchOutcome::Cached) => info!("{}: cached", snapshot.file_name),
            Ok(FetchOutcome::Downloaded { bytes }) => {
                info!("{}: downloaded {bytes} bytes", snapshot.file_name)
            }
            Err(err) => {
                failures += 1;
                warn!("{}: {err:#}", snapshot.file_name);
            }
        }
    }
    failures
}
