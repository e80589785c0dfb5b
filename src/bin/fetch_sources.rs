use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use dfs_sheet::config::RunConfig;
use dfs_sheet::http_client::http_client;
use dfs_sheet::snapshot::SnapshotDir;
use dfs_sheet::snapshot_fetch::{fetch_all, remote_snapshots};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let refresh = args.iter().any(|arg| arg == "--refresh");
    let mut cfg = RunConfig::from_env();
    cfg.apply_args(&args);

    let dir = SnapshotDir::new(&cfg.sources_dir);
    let client = http_client()?;
    let total = remote_snapshots(cfg.season).len();
    let failures = fetch_all(client, &dir, cfg.season, refresh);

    println!("Snapshot fetch complete");
    println!("Dir: {}", dir.root().display());
    println!("Season: {}", cfg.season);
    println!("Snapshots: {}/{}", total - failures, total);
    if failures > 0 {
        return Err(anyhow!("{failures} snapshot(s) failed"));
    }
    Ok(())
}
