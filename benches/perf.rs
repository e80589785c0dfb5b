use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use dfs_sheet::matching::{IdentityKey, find};
use dfs_sheet::names::normalize;
use dfs_sheet::player::Position;
use dfs_sheet::rank::{RankOrder, competition_ranks};
use dfs_sheet::rankings_fetch::{EcrRow, parse_ecr_json};

const NAMES: &[&str] = &[
    "T.J. Yeldon",
    "Todd Gurley II",
    "Odell Beckham Jr.",
    "Juju Smith-Schuster",
    "Mitch Trubisky",
    "Phillip Rivers",
];

fn sample_ecr_json(players: usize) -> String {
    let rows = (0..players)
        .map(|i| format!(r#"["{}", "", "Player{i} Number{i} JAC", "vs. PHI"]"#, i + 1))
        .collect::<Vec<_>>()
        .join(",");
    format!("[[{rows}]]")
}

fn sample_ecr_rows(players: usize) -> Vec<EcrRow> {
    parse_ecr_json(&sample_ecr_json(players), Position::RB, "ecr_RB.json").expect("valid sample json")
}

fn bench_normalize(c: &mut Criterion) {
    c.bench_function("normalize_names", |b| {
        b.iter(|| {
            for name in NAMES {
                black_box(normalize(black_box(name)));
            }
        })
    });
}

fn bench_ecr_parse(c: &mut Criterion) {
    let raw = sample_ecr_json(300);
    c.bench_function("ecr_parse_300", |b| {
        b.iter(|| {
            let rows = parse_ecr_json(black_box(&raw), Position::RB, "ecr_RB.json").unwrap();
            black_box(rows.len());
        })
    });
}

fn bench_find(c: &mut Criterion) {
    let rows = sample_ecr_rows(300);
    let exact = normalize("Player250 Number250");
    let missing = normalize("Nobody Here");
    c.bench_function("find_exact_300", |b| {
        b.iter(|| black_box(find(&rows, &IdentityKey::new(&exact, Some("JAX"))).is_ok()))
    });
    // A miss walks both tiers.
    c.bench_function("find_miss_300", |b| {
        b.iter(|| black_box(find(&rows, &IdentityKey::new(&missing, Some("JAX"))).is_err()))
    });
}

fn bench_rank(c: &mut Criterion) {
    let salaries = (0..300)
        .map(|i| f64::from(3000 + (i * 137) % 6000))
        .collect::<Vec<_>>();
    c.bench_function("competition_ranks_300", |b| {
        b.iter(|| black_box(competition_ranks(black_box(&salaries), RankOrder::Descending)))
    });
}

criterion_group!(benches, bench_normalize, bench_ecr_parse, bench_find, bench_rank);
criterion_main!(benches);
