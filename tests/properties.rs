use proptest::prelude::*;

use dfs_sheet::names::{clean_cell, normalize};
use dfs_sheet::rank::{RankOrder, competition_ranks};
use dfs_sheet::weekly::WeeklySeries;

proptest! {
    #[test]
    fn normalize_is_idempotent(raw in "[A-Za-z. '-]{0,40}") {
        let once = normalize(&raw);
        let twice = normalize(once.as_str());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn normalized_names_have_no_periods_and_two_tokens(raw in "[A-Za-z. ]{0,40}") {
        let name = normalize(&raw);
        prop_assert!(!name.as_str().contains('.'));
        prop_assert!(name.as_str().split_whitespace().count() <= 2);
    }

    #[test]
    fn cleaned_cells_contain_their_normalized_name(first in "[A-Z][a-z]{1,8}", last in "[A-Z][a-z]{1,10}") {
        let cell = clean_cell(&format!("{first} {last} JAC"));
        let name = normalize(&format!("{first} {last}"));
        prop_assert!(cell.contains(name.as_str()));
    }

    #[test]
    fn competition_ranks_are_bounded_and_tie_consistent(values in prop::collection::vec(0u32..20, 1..30)) {
        let values = values.into_iter().map(f64::from).collect::<Vec<_>>();
        let ranks = competition_ranks(&values, RankOrder::Ascending);
        prop_assert!(ranks.contains(&1));
        for (i, a) in values.iter().enumerate() {
            prop_assert!(ranks[i] >= 1 && ranks[i] as usize <= values.len());
            let better = values.iter().filter(|b| *b < a).count();
            prop_assert_eq!(ranks[i] as usize, better + 1);
        }
    }

    #[test]
    fn week_lookup_reads_only_that_week(values in prop::collection::vec(prop::option::of(0u32..100), 0..20), week in 0usize..20) {
        let series = WeeklySeries::padded(values.iter().map(|v| v.map(f64::from)), 16);
        let expected = if week == 0 || week > 16 {
            None
        } else {
            values.get(week - 1).copied().flatten().map(f64::from)
        };
        prop_assert_eq!(series.week(week), expected);
    }
}
