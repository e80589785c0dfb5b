use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One stat across the season window, indexed by week (1-based).
///
/// `None` means no data for that week (bye, inactive); `Some(0.0)` means the
/// player was active and recorded nothing. The two are never conflated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySeries {
    values: Vec<Option<f64>>,
}

impl WeeklySeries {
    /// Build from values in week order, padded with `None` or truncated to
    /// `season_weeks` entries.
    pub fn padded<I>(values: I, season_weeks: usize) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut values = values.into_iter().take(season_weeks).collect::<Vec<_>>();
        values.resize(season_weeks, None);
        Self { values }
    }

    /// Build from a week-number keyed map. Weeks outside `1..=season_weeks`
    /// are dropped.
    pub fn from_week_map(weeks: &BTreeMap<usize, Option<f64>>, season_weeks: usize) -> Self {
        let mut values = vec![None; season_weeks];
        for (week, value) in weeks {
            if *week >= 1 && *week <= season_weeks {
                values[*week - 1] = *value;
            }
        }
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Value recorded for `week`. Out-of-range weeks and null entries are
    /// both unavailable; earlier weeks are never consulted.
    pub fn week(&self, week: usize) -> Option<f64> {
        if week == 0 {
            return None;
        }
        self.values.get(week - 1).copied().flatten()
    }

    /// Mean of the observed weeks, ignoring nulls.
    pub fn observed_mean(&self) -> Option<f64> {
        let observed = self.values.iter().flatten().copied().collect::<Vec<_>>();
        if observed.is_empty() {
            return None;
        }
        Some(observed.iter().sum::<f64>() / observed.len() as f64)
    }
}

/// Last-week extraction: the value at `current_week` or unavailable.
pub fn last_week_value(series: Option<&WeeklySeries>, current_week: usize) -> Option<f64> {
    series.and_then(|s| s.week(current_week))
}

/// Red-zone opportunities derived for one player.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RedZoneOpportunities {
    pub season: f64,
    pub last_week: f64,
}

/// Per-feed inputs: the season average (already excluding unavailable weeks)
/// and the value for the current week.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RedZoneFeed {
    pub season_average: Option<f64>,
    pub last_week: Option<f64>,
}

/// Targets plus rush attempts inside the 20.
///
/// A feed with no entry for the player contributes zero to both totals. At
/// last-week granularity an explicit null also contributes zero: an inactive
/// player had no red-zone role that week.
pub fn red_zone_opportunities(
    targets: Option<RedZoneFeed>,
    rushes: Option<RedZoneFeed>,
) -> RedZoneOpportunities {
    let season: f64 = [targets, rushes]
        .iter()
        .map(|feed| feed.and_then(|f| f.season_average).unwrap_or(0.0))
        .sum();
    let last_week: f64 = [targets, rushes]
        .iter()
        .map(|feed| feed.and_then(|f| f.last_week).unwrap_or(0.0))
        .sum();
    RedZoneOpportunities { season, last_week }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bye_week_is_not_backfilled() {
        let series = WeeklySeries::padded([Some(10.0), None, Some(5.0)], 3);
        assert_eq!(series.week(2), None);
        assert_eq!(series.week(1), Some(10.0));
        assert_eq!(series.week(3), Some(5.0));
    }

    #[test]
    fn out_of_range_weeks_are_unavailable() {
        let series = WeeklySeries::padded([Some(1.0)], 4);
        assert_eq!(series.len(), 4);
        assert_eq!(series.week(0), None);
        assert_eq!(series.week(4), None);
        assert_eq!(series.week(17), None);
    }

    #[test]
    fn padding_truncates_long_series() {
        let series = WeeklySeries::padded((1..=20).map(|v| Some(v as f64)), 16);
        assert_eq!(series.len(), 16);
        assert_eq!(series.week(16), Some(16.0));
    }

    #[test]
    fn week_map_keeps_nulls_distinct_from_zero() {
        let map = BTreeMap::from([(1, Some(0.0)), (2, None), (3, Some(4.0)), (40, Some(9.0))]);
        let series = WeeklySeries::from_week_map(&map, 4);
        assert_eq!(series.values(), &[Some(0.0), None, Some(4.0), None]);
        assert_eq!(series.observed_mean(), Some(2.0));
    }

    #[test]
    fn red_zone_season_defaults_missing_feed_to_zero() {
        let rushes = RedZoneFeed {
            season_average: Some(3.0),
            last_week: None,
        };
        let opps = red_zone_opportunities(None, Some(rushes));
        assert_eq!(opps.season, 3.0);
        assert_eq!(opps.last_week, 0.0);
    }

    #[test]
    fn red_zone_last_week_sums_with_null_as_zero() {
        let targets = RedZoneFeed {
            season_average: Some(1.5),
            last_week: Some(2.0),
        };
        let rushes = RedZoneFeed {
            season_average: None,
            last_week: None,
        };
        let opps = red_zone_opportunities(Some(targets), Some(rushes));
        assert_eq!(opps.season, 1.5);
        assert_eq!(opps.last_week, 2.0);
        assert_eq!(red_zone_opportunities(None, None), RedZoneOpportunities::default());
    }
}
