use std::cmp::Ordering;

use crate::player::{PlayerRecord, RankFields, RankedPlayer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankOrder {
    /// Smallest value is rank 1.
    Ascending,
    /// Largest value is rank 1.
    Descending,
}

/// Standard competition ranking ("1224"): tied values share a rank and the
/// next distinct value skips past the tied block, like a spreadsheet RANK().
pub fn competition_ranks(values: &[f64], order: RankOrder) -> Vec<u32> {
    let mut idx = (0..values.len()).collect::<Vec<_>>();
    idx.sort_by(|&a, &b| compare(values[a], values[b], order));

    let mut ranks = vec![0u32; values.len()];
    let mut current_rank = 0u32;
    for (pos, &i) in idx.iter().enumerate() {
        let tied_with_prev = pos > 0 && compare(values[idx[pos - 1]], values[i], order).is_eq();
        if !tied_with_prev {
            current_rank = pos as u32 + 1;
        }
        ranks[i] = current_rank;
    }
    ranks
}

/// Competition ranking over the present values only; absent values stay unranked.
pub fn competition_ranks_sparse(values: &[Option<f64>], order: RankOrder) -> Vec<Option<u32>> {
    let present = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect::<Vec<_>>();
    let dense = present.iter().map(|(_, v)| *v).collect::<Vec<_>>();
    let ranks = competition_ranks(&dense, order);

    let mut out = vec![None; values.len()];
    for ((i, _), rank) in present.iter().zip(ranks) {
        out[*i] = Some(rank);
    }
    out
}

fn compare(a: f64, b: f64, order: RankOrder) -> Ordering {
    match order {
        RankOrder::Ascending => a.total_cmp(&b),
        RankOrder::Descending => b.total_cmp(&a),
    }
}

/// Value differential: positive when the salary rank is numerically worse
/// (cheaper) than the performance rank.
pub fn value_differential(salary_rank: u32, ecr_rank: u32) -> i64 {
    i64::from(salary_rank) - i64::from(ecr_rank)
}

/// Rank every record of one position against the whole set.
///
/// Records must all share a position; the caller groups them. Output keeps
/// input order.
pub fn rank_position(records: Vec<PlayerRecord>) -> Vec<RankedPlayer> {
    let ecr_scores = records
        .iter()
        .map(|r| r.base().ecr.score)
        .collect::<Vec<_>>();
    let salaries = records
        .iter()
        .map(|r| f64::from(r.base().salary))
        .collect::<Vec<_>>();
    let secondary = records
        .iter()
        .map(|r| r.base().secondary_salary.map(|s| f64::from(s.salary)))
        .collect::<Vec<_>>();

    let ecr_ranks = competition_ranks(&ecr_scores, RankOrder::Ascending);
    let salary_ranks = competition_ranks(&salaries, RankOrder::Descending);
    let secondary_ranks = competition_ranks_sparse(&secondary, RankOrder::Descending);

    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| {
            let ecr_rank = ecr_ranks[i];
            let salary_rank = salary_ranks[i];
            let secondary_salary_rank = secondary_ranks[i];
            RankedPlayer {
                record,
                ranks: RankFields {
                    ecr_rank,
                    salary_rank,
                    value_diff: value_differential(salary_rank, ecr_rank),
                    secondary_salary_rank,
                    secondary_value_diff: secondary_salary_rank
                        .map(|r| i64::from(r) - i64::from(salary_rank)),
                },
            }
        })
        .collect()
}
