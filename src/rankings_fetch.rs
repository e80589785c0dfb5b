use tracing::debug;

use crate::error::SourceError;
use crate::matching::Matchable;
use crate::names::{
    CanonicalName, canonical_team_abbv, clean_cell, is_team_abbv, normalize, team_identity,
};
use crate::player::Position;
use crate::snapshot::{Table, parse_rank, parse_table_pages, require_cells};

const RANK_COL: usize = 0;
const NAME_COL: usize = 2;

/// Snapshot file holding the consensus ranking table for `position`.
pub fn ecr_file_name(position: Position) -> String {
    format!("ecr_{}.json", position.as_str())
}

/// One consensus-ranking row.
#[derive(Debug, Clone, PartialEq)]
pub struct EcrRow {
    pub rank: u32,
    pub score: f64,
    /// Name cell after period stripping and spelling fixes, decoration kept.
    pub name_cell: String,
    pub identity: CanonicalName,
    pub team: Option<String>,
}

impl Matchable for EcrRow {
    fn identity(&self) -> Option<&CanonicalName> {
        Some(&self.identity)
    }

    fn team(&self) -> Option<&str> {
        self.team.as_deref()
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.name_cell.as_str()]
    }
}

pub fn parse_ecr_json(
    raw: &str,
    position: Position,
    source_name: &str,
) -> Result<Vec<EcrRow>, SourceError> {
    let pages = parse_table_pages(raw, source_name)?;
    let Some(table) = pages.into_iter().next() else {
        return Ok(Vec::new());
    };
    parse_ecr_table(&table, position, source_name)
}

fn parse_ecr_table(
    table: &Table,
    position: Position,
    source_name: &str,
) -> Result<Vec<EcrRow>, SourceError> {
    let mut out = Vec::with_capacity(table.len());
    for (row_idx, row) in table.iter().enumerate() {
        // Tier banners span the whole table as one cell.
        if row.len() == 1 {
            debug!("{source_name} row {row_idx}: skipping banner {:?}", row[0]);
            continue;
        }
        require_cells(row, NAME_COL + 1, source_name, row_idx)?;
        let rank = parse_rank(&row[RANK_COL]).ok_or_else(|| SourceError::InvalidValue {
            source_name: source_name.to_string(),
            row: row_idx,
            field: "rank",
            value: row[RANK_COL].clone(),
        })?;
        let name_cell = clean_cell(&row[NAME_COL]);
        let (name_part, team) = split_team_suffix(&name_cell);
        let identity = match position {
            Position::DST => match &team {
                Some(team) => team_identity(team),
                None => team_identity(&name_part),
            },
            _ => normalize(&name_part),
        };
        out.push(EcrRow {
            rank,
            score: f64::from(rank),
            name_cell,
            identity,
            team,
        });
    }
    Ok(out)
}

/// Split a trailing team code (`"TJ Yeldon JAX"`, `"Baltimore Ravens (BAL)"`)
/// off a cleaned name cell.
fn split_team_suffix(cell: &str) -> (String, Option<String>) {
    let tokens = cell.split_whitespace().collect::<Vec<_>>();
    if let Some((last, rest)) = tokens.split_last() {
        let code = last.trim_matches(|c| c == '(' || c == ')');
        let uppercase = code.chars().all(|c| c.is_ascii_uppercase());
        if uppercase && is_team_abbv(code) && rest.len() >= 2 {
            return (rest.join(" "), Some(canonical_team_abbv(code)));
        }
    }
    (tokens.join(" "), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{IdentityKey, find};

    #[test]
    fn team_suffix_is_split_only_after_a_full_name() {
        assert_eq!(
            split_team_suffix("TJ Yeldon JAX"),
            ("TJ Yeldon".to_string(), Some("JAX".to_string()))
        );
        assert_eq!(
            split_team_suffix("Baltimore Ravens (BAL)"),
            ("Baltimore Ravens".to_string(), Some("BAL".to_string()))
        );
        assert_eq!(split_team_suffix("Drew Brees"), ("Drew Brees".to_string(), None));
    }

    #[test]
    fn generational_suffix_is_not_a_team() {
        assert_eq!(
            split_team_suffix("Robert Griffin III"),
            ("Robert Griffin III".to_string(), None)
        );
        assert_eq!(
            split_team_suffix("Todd Gurley II LAR"),
            ("Todd Gurley II".to_string(), Some("LAR".to_string()))
        );

        let raw = r#"[[["1", "", "Robert Griffin III", "vs. CLE"], ["2", "", "Todd Gurley II", "vs. GB"]]]"#;
        let rows = parse_ecr_json(raw, Position::QB, "ecr_QB.json").unwrap();
        assert_eq!(rows[0].identity.as_str(), "Robert Griffin");
        assert_eq!(rows[0].team, None);
        let name = normalize("Robert Griffin III");
        let key = IdentityKey::new(&name, Some("BAL"));
        assert_eq!(find(&rows, &key).map(|r| r.rank), Ok(1));
        assert_eq!(rows[1].team, None);
    }

    #[test]
    fn banners_are_skipped_and_ranks_parsed() {
        let raw = r#"[[["Tier 1"], ["1", "", "Todd Gurley II LAR", "vs. GB"], ["2", "", "T.J. Yeldon JAC", "vs. PHI"]]]"#;
        let rows = parse_ecr_json(raw, Position::RB, "ecr_RB.json").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].identity.as_str(), "Todd Gurley");
        assert_eq!(rows[1].identity.as_str(), "TJ Yeldon");
        assert_eq!(rows[1].team.as_deref(), Some("JAX"));
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn dst_rows_resolve_to_team_codes() {
        let raw = r#"[[["1", "", "Chicago Bears CHI"], ["2", "", "Baltimore Ravens"]]]"#;
        let rows = parse_ecr_json(raw, Position::DST, "ecr_DST.json").unwrap();
        assert_eq!(rows[0].identity.as_str(), "CHI");
        assert_eq!(rows[1].identity.as_str(), "BAL");
    }

    #[test]
    fn partial_rows_are_malformed() {
        let raw = r#"[[["1", "x"]]]"#;
        assert!(matches!(
            parse_ecr_json(raw, Position::QB, "ecr_QB.json"),
            Err(SourceError::MalformedRow { .. })
        ));
    }
}
