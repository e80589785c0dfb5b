use std::path::PathBuf;

use dfs_sheet::assemble::{BuildContext, Report, SourceBundle, build_report};
use dfs_sheet::config::RunConfig;
use dfs_sheet::error::SkipReason;
use dfs_sheet::player::{Position, PositionDetail, RankedPlayer};
use dfs_sheet::report_export::export_report;
use dfs_sheet::rows::{header, row};

fn fixture_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path
}

fn fixture_config() -> RunConfig {
    let root = fixture_dir();
    RunConfig {
        sources_dir: root.join("sources"),
        salary_csv: root.join("DKSalaries.csv"),
        secondary_salary_csv: root.join("FDraft.csv"),
        week: 8,
        ..RunConfig::default()
    }
}

fn build(cfg: &RunConfig) -> Report {
    let sources = SourceBundle::load(cfg).expect("fixture sources should load");
    build_report(&sources, &BuildContext::from(cfg)).expect("report should build")
}

fn player<'r>(report: &'r Report, position: Position, name: &str) -> &'r RankedPlayer {
    report
        .position(position)
        .and_then(|p| p.players.iter().find(|pl| pl.record.base().display_name == name))
        .unwrap_or_else(|| panic!("{name} should be in the {position} sheet"))
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|a| (a - b).abs() < 1e-9)
}

#[test]
fn positions_come_out_in_fixed_order() {
    let report = build(&fixture_config());
    let order = report.positions.iter().map(|p| p.position).collect::<Vec<_>>();
    assert_eq!(order, Position::ALL.to_vec());
    assert_eq!(report.player_count(), 15);
}

#[test]
fn player_missing_from_rankings_is_excluded() {
    let report = build(&fixture_config());
    assert_eq!(report.skipped.len(), 1);
    let skipped = &report.skipped[0];
    assert_eq!(skipped.display_name, "Joe Flacco");
    assert_eq!(skipped.reason, SkipReason::UnmatchedIdentity { source: "ecr" });

    let qbs = report.position(Position::QB).expect("qb sheet");
    let names = qbs
        .players
        .iter()
        .map(|p| p.record.base().display_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["Drew Brees", "Cam Newton", "Kirk Cousins", "Robert Griffin III"]
    );
}

#[test]
fn generational_suffix_does_not_hide_a_ranked_player() {
    let report = build(&fixture_config());
    let griffin = player(&report, Position::QB, "Robert Griffin III");
    assert_eq!(griffin.record.base().ecr.rank, 6);
    assert_eq!(griffin.ranks.ecr_rank, 4);
    assert_eq!(griffin.record.base().team_abbv, "BAL");
    assert!(report.skipped.iter().all(|s| s.display_name != "Robert Griffin III"));
}

#[test]
fn decorated_ranking_name_joins_the_salary_player() {
    let report = build(&fixture_config());
    let yeldon = player(&report, Position::RB, "T.J. Yeldon");
    let base = yeldon.record.base();
    assert_eq!(base.name.as_str(), "TJ Yeldon");
    assert_eq!(base.team_abbv, "JAX");
    assert_eq!(base.ecr.rank, 4);
    assert_eq!(base.matchup.opponent, "PHI");
    assert_eq!(base.matchup.opp_display, "vs. PHI");
    assert!(base.matchup.is_home);
    assert_eq!(base.vegas.line, Some(3.0));
    assert_eq!(base.vegas.over_under, Some(42.5));
}

#[test]
fn ranks_are_relative_to_the_ranked_set() {
    let report = build(&fixture_config());
    let rbs = report.position(Position::RB).expect("rb sheet");
    let names = rbs
        .players
        .iter()
        .map(|p| p.record.base().display_name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        names,
        vec!["T.J. Yeldon", "Alvin Kamara", "Christian McCaffrey", "Latavius Murray"]
    );
    let ecr = rbs.players.iter().map(|p| p.ranks.ecr_rank).collect::<Vec<_>>();
    let salary = rbs.players.iter().map(|p| p.ranks.salary_rank).collect::<Vec<_>>();
    let diff = rbs.players.iter().map(|p| p.ranks.value_diff).collect::<Vec<_>>();
    // Gurley is ranked but not on the slate, so published rank 4 becomes 3.
    assert_eq!(ecr, vec![3, 1, 2, 4]);
    assert_eq!(salary, vec![3, 1, 2, 3]);
    assert_eq!(diff, vec![0, 0, 0, -1]);

    let qb = player(&report, Position::QB, "Kirk Cousins");
    assert_eq!(qb.record.base().ecr.rank, 5);
    assert_eq!(qb.ranks.ecr_rank, 3);
}

#[test]
fn secondary_salary_ranks_skip_unlisted_players() {
    let report = build(&fixture_config());
    let yeldon = player(&report, Position::RB, "T.J. Yeldon");
    assert_eq!(yeldon.ranks.secondary_salary_rank, Some(2));
    assert_eq!(yeldon.ranks.secondary_value_diff, Some(-1));
    let secondary = yeldon.record.base().secondary_salary.expect("listed");
    assert_eq!(secondary.salary, 6800);
    assert!((secondary.fraction - 0.068).abs() < 1e-12);

    let murray = player(&report, Position::RB, "Latavius Murray");
    assert_eq!(murray.record.base().secondary_salary, None);
    assert_eq!(murray.ranks.secondary_salary_rank, None);
    assert_eq!(murray.ranks.secondary_value_diff, None);

    let ravens = player(&report, Position::DST, "Ravens");
    assert_eq!(ravens.ranks.secondary_salary_rank, Some(1));
    let panthers = player(&report, Position::DST, "Panthers");
    assert_eq!(panthers.ranks.secondary_salary_rank, None);
}

#[test]
fn last_week_never_falls_back_to_earlier_weeks() {
    let report = build(&fixture_config());
    let yeldon = player(&report, Position::RB, "T.J. Yeldon");
    let PositionDetail::Rb(rb) = yeldon.record.detail() else {
        panic!("running back detail expected");
    };
    assert_eq!(rb.season.snap_pct, Some(64.4));
    assert_eq!(rb.season.rush_atts, Some(11.5));
    assert_eq!(rb.season.targets, Some(5.1));
    assert_eq!(rb.last_week.snap_pct, None);
    assert_eq!(rb.last_week.rush_atts, None);
    assert_eq!(rb.last_week.targets, None);
    assert_eq!(rb.season.red_zone_opps, 1.5);
    assert_eq!(rb.last_week.red_zone_opps, 0.0);
    assert_eq!(rb.opp_run_def_rank, Some(8));
    assert_eq!(rb.opp_rb_pass_def_rank, Some(9));
    assert_eq!(rb.oline_adj_line_yds, Some(4.1));
    assert_eq!(rb.opp_dline_adj_line_yds, Some(3.8));
}

#[test]
fn red_zone_opportunities_sum_targets_and_rushes() {
    let report = build(&fixture_config());
    let kamara = player(&report, Position::RB, "Alvin Kamara");
    let PositionDetail::Rb(rb) = kamara.record.detail() else {
        panic!("running back detail expected");
    };
    assert!(close(Some(rb.season.red_zone_opps), 3.2));
    assert_eq!(rb.last_week.red_zone_opps, 5.0);
    assert_eq!(rb.last_week.snap_pct, Some(80.0));
    assert_eq!(rb.last_week.rush_atts, Some(15.0));

    let murray = player(&report, Position::RB, "Latavius Murray");
    let PositionDetail::Rb(rb) = murray.record.detail() else {
        panic!("running back detail expected");
    };
    assert_eq!(rb.season.snap_pct, None);
    assert_eq!(rb.season.red_zone_opps, 0.0);
}

#[test]
fn red_zone_targets_come_from_the_players_own_position_feed() {
    let report = build(&fixture_config());
    // Kamara is also listed in the receiver feed; the running back feed wins.
    let kamara = player(&report, Position::RB, "Alvin Kamara");
    let PositionDetail::Rb(rb) = kamara.record.detail() else {
        panic!("running back detail expected");
    };
    assert!(close(Some(rb.season.red_zone_opps), 3.2));
    assert_eq!(rb.last_week.red_zone_opps, 5.0);

    let thielen = player(&report, Position::WR, "Adam Thielen");
    let PositionDetail::Wr(wr) = thielen.record.detail() else {
        panic!("receiver detail expected");
    };
    assert!(close(Some(wr.season.red_zone_opps), 2.1));
    assert_eq!(wr.last_week.red_zone_opps, 3.0);
}

#[test]
fn quarterback_detail_joins_team_and_opponent_tables() {
    let report = build(&fixture_config());
    let brees = player(&report, Position::QB, "Drew Brees");
    let PositionDetail::Qb(qb) = brees.record.detail() else {
        panic!("quarterback detail expected");
    };
    assert!(close(qb.oline_sack_rate, 0.04));
    assert!(close(qb.opp_dline_sack_rate, 0.085));
    assert_eq!(qb.pass_dyar, Some(1020.0));
    assert_eq!(qb.qbr, Some(78.4));
    assert_eq!(qb.rush_yds, Some(15.0));
    assert_eq!(qb.opp_pass_def_rank, Some(4));
    assert_eq!(qb.opp_yds_per_att, Some(6.4));
    assert!(close(qb.opp_comp_pct, 0.65));
    assert!(close(qb.opp_td_pct, 0.04));
    assert!((brees.record.base().salary_fraction - 0.136).abs() < 1e-12);
}

#[test]
fn receiver_detail_uses_the_opponent() {
    let report = build(&fixture_config());
    let thielen = player(&report, Position::WR, "Adam Thielen");
    assert_eq!(thielen.record.base().matchup.opp_display, "at NO");
    let PositionDetail::Wr(wr) = thielen.record.detail() else {
        panic!("receiver detail expected");
    };
    assert_eq!(wr.opp_pass_def_rank, Some(24));
    assert_eq!(wr.opp_wr1_rank, Some(24));
    assert_eq!(wr.opp_wr2_rank, Some(20));
    assert_eq!(wr.season.receptions, Some(8.1));
    assert_eq!(wr.last_week.targets, Some(12.0));
    assert_eq!(wr.last_week.snap_pct, Some(93.0));

    let ertz = player(&report, Position::TE, "Zach Ertz");
    assert_eq!(ertz.record.base().matchup.opponent, "JAX");
    assert_eq!(ertz.record.base().matchup.opp_display, "at JAX");
    assert!(!ertz.record.base().matchup.is_home);
    let PositionDetail::Te(te) = ertz.record.detail() else {
        panic!("tight end detail expected");
    };
    assert_eq!(te.opp_te_rank, Some(17));
    assert_eq!(te.opp_pass_def_rank, Some(19));
}

#[test]
fn slate_window_spans_the_ranked_kickoffs() {
    let report = build(&fixture_config());
    let (first, last) = report.slate_window().expect("kickoffs parsed");
    assert_eq!(first.format("%Y-%m-%d %H:%M").to_string(), "2018-10-28 09:30");
    assert_eq!(last.format("%Y-%m-%d %H:%M").to_string(), "2018-11-04 20:20");
    assert_eq!(Report::default().slate_window(), None);
}

#[test]
fn rows_align_with_headers() {
    let report = build(&fixture_config());
    for position in &report.positions {
        let columns = header(position.position);
        for ranked in &position.players {
            assert_eq!(row(ranked).len(), columns.len(), "{}", position.position);
        }
    }

    let yeldon = player(&report, Position::RB, "T.J. Yeldon");
    let columns = header(Position::RB);
    let cells = row(yeldon);
    let text = |name: &str| {
        let idx = columns.iter().position(|c| *c == name).expect("column exists");
        cells[idx].to_text()
    };
    assert_eq!(text("Name"), "T.J. Yeldon");
    assert_eq!(text("Opp"), "vs. PHI");
    assert_eq!(text("Salary"), "$5,400");
    assert_eq!(text("Salary%"), "10.8%");
    assert_eq!(text("ECR"), "3");
}

#[test]
fn missing_secondary_file_blanks_its_columns() {
    let mut cfg = fixture_config();
    cfg.secondary_salary_csv = fixture_dir().join("does_not_exist.csv");
    let report = build(&cfg);
    assert_eq!(report.player_count(), 15);
    assert!(
        report
            .positions
            .iter()
            .flat_map(|p| &p.players)
            .all(|p| p.ranks.secondary_salary_rank.is_none())
    );
}

#[test]
fn missing_ranking_tables_fail_the_load() {
    let mut cfg = fixture_config();
    cfg.sources_dir = fixture_dir().join("no_such_sources");
    let err = SourceBundle::load(&cfg).expect_err("rankings are required");
    assert!(err.is_not_found());
}

#[test]
fn workbook_is_written_with_one_sheet_per_position() {
    let report = build(&fixture_config());
    let path = std::env::temp_dir().join(format!("dfs_sheet_test_{}.xlsx", std::process::id()));
    let summary = export_report(&path, &report).expect("workbook should save");
    assert_eq!(summary.sheets, 5);
    assert_eq!(summary.rows, 15);
    assert!(path.exists());
    let _ = std::fs::remove_file(&path);
}
