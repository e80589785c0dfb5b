use crate::error::MatchError;
use crate::names::{CanonicalName, canonical_team_abbv};

/// A source row that can be joined to a canonical player.
pub trait Matchable {
    /// Normalized identity, when the source stores a clean name.
    fn identity(&self) -> Option<&CanonicalName>;

    /// Team abbreviation, when the source carries one.
    fn team(&self) -> Option<&str>;

    /// Raw fields searched by the substring fallback.
    fn search_fields(&self) -> Vec<&str>;
}

/// What a canonical player is looked up by.
#[derive(Debug, Clone, Copy)]
pub struct IdentityKey<'a> {
    pub name: &'a CanonicalName,
    pub team: Option<&'a str>,
}

impl<'a> IdentityKey<'a> {
    pub fn new(name: &'a CanonicalName, team: Option<&'a str>) -> Self {
        Self { name, team }
    }
}

/// Find the row for `key`.
///
/// Rows whose normalized identity equals the key name (and whose team agrees
/// when both sides know it) win outright. Otherwise rows with any field
/// containing the key name are considered. Several candidates that a known
/// team cannot narrow to one are reported as ambiguous.
pub fn find<'r, R: Matchable>(rows: &'r [R], key: &IdentityKey<'_>) -> Result<&'r R, MatchError> {
    if key.name.is_empty() {
        return Err(MatchError::NotFound);
    }

    let exact = rows
        .iter()
        .filter(|row| row.identity() == Some(key.name) && team_compatible(*row, key))
        .collect::<Vec<_>>();
    if !exact.is_empty() {
        return single(narrow_by_team(exact, key));
    }

    let needle = key.name.as_str();
    let partial = rows
        .iter()
        .filter(|row| team_compatible(*row, key))
        .filter(|row| row.search_fields().iter().any(|field| field.contains(needle)))
        .collect::<Vec<_>>();
    single(narrow_by_team(partial, key))
}

fn team_compatible<R: Matchable>(row: &R, key: &IdentityKey<'_>) -> bool {
    match (key.team, row.team()) {
        (Some(want), Some(have)) => canonical_team_abbv(want) == canonical_team_abbv(have),
        _ => true,
    }
}

// Prefer candidates that positively confirm the team over ones that are merely
// compatible because the source has no team column.
fn narrow_by_team<'r, R: Matchable>(candidates: Vec<&'r R>, key: &IdentityKey<'_>) -> Vec<&'r R> {
    if candidates.len() < 2 || key.team.is_none() {
        return candidates;
    }
    let confirmed = candidates
        .iter()
        .copied()
        .filter(|row| row.team().is_some())
        .collect::<Vec<_>>();
    if confirmed.len() == 1 {
        confirmed
    } else {
        candidates
    }
}

fn single<'r, R>(candidates: Vec<&'r R>) -> Result<&'r R, MatchError> {
    match candidates.as_slice() {
        [] => Err(MatchError::NotFound),
        [only] => Ok(*only),
        many => Err(MatchError::Ambiguous {
            candidates: many.len(),
        }),
    }
}
