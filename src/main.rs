use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use dfs_sheet::assemble::{BuildContext, SourceBundle, build_report};
use dfs_sheet::config::RunConfig;
use dfs_sheet::report_export::export_report;

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    init_logging();

    let mut cfg = RunConfig::from_env();
    cfg.apply_args(&std::env::args().skip(1).collect::<Vec<_>>());

    let sources = SourceBundle::load(&cfg).with_context(|| {
        format!(
            "loading sources ({} + {})",
            cfg.salary_csv.display(),
            cfg.sources_dir.display()
        )
    })?;
    let report = build_report(&sources, &BuildContext::from(&cfg)).context("building report")?;
    let summary = export_report(&cfg.output, &report)?;

    println!("Player sheet written");
    println!("Output: {}", cfg.output.display());
    println!("Week: {} of {}", cfg.week, cfg.season_weeks);
    if let Some((first, last)) = report.slate_window() {
        println!(
            "Slate: {} to {}",
            first.format("%a %m/%d %I:%M%p"),
            last.format("%a %m/%d %I:%M%p")
        );
    }
    for position in &report.positions {
        println!("{}: {}", position.position, position.players.len());
    }
    println!("Rows: {} across {} sheets", summary.rows, summary.sheets);
    if !report.skipped.is_empty() {
        println!("Excluded: {}", report.skipped.len());
        for skipped in report.skipped.iter().take(10) {
            println!(
                "   - {} ({} {}): {}",
                skipped.display_name, skipped.position, skipped.team_abbv, skipped.reason
            );
        }
    }
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
