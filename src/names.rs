use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Normalized identity key used to join the same player across sources.
///
/// Only [`normalize`] and [`team_identity`] construct one, so every key is
/// already in normal form and normalizing it again is a no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CanonicalName(String);

impl CanonicalName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CanonicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Whole-token spellings that differ between sources. No value may appear as a key.
const TOKEN_FIXES: &[(&str, &str)] = &[("Juju", "JuJu"), ("Mitch", "Mitchell")];

// Whole-name spellings that differ between sources. No value may appear as a key.
const NAME_FIXES: &[(&str, &str)] = &[("Phillip Rivers", "Philip Rivers")];

/// Canonicalize a person's name: strip periods, keep the first two tokens,
/// then apply the fixed cross-source spelling table.
pub fn normalize(raw: &str) -> CanonicalName {
    let stripped = raw.replace('.', "");
    let joined = stripped
        .split_whitespace()
        .take(2)
        .map(fix_token)
        .collect::<Vec<_>>()
        .join(" ");
    let fixed = NAME_FIXES
        .iter()
        .find(|(from, _)| *from == joined)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or(joined);
    CanonicalName(fixed)
}

/// Identity key for a defense/special-teams entry: the team abbreviation,
/// resolved from a full team name, a nickname, or an abbreviation.
pub fn team_identity(raw: &str) -> CanonicalName {
    let abbv = team_abbv_from_name(raw)
        .map(str::to_string)
        .unwrap_or_else(|| canonical_team_abbv(raw));
    CanonicalName(abbv)
}

/// Clean one raw cell from a table-shaped source so it can be searched for
/// canonical names: periods stripped, team aliases and spelling fixes applied.
pub fn clean_cell(raw: &str) -> String {
    let stripped = raw.replace('.', "");
    let mut out = stripped
        .split_whitespace()
        .map(|token| {
            let fixed = fix_token(token);
            if fixed == token {
                TEAM_ALIASES
                    .get(token)
                    .copied()
                    .unwrap_or(token)
            } else {
                fixed
            }
        })
        .collect::<Vec<_>>()
        .join(" ");
    for (from, to) in NAME_FIXES {
        if out.contains(from) {
            out = out.replace(from, to);
        }
    }
    out
}

fn fix_token(token: &str) -> &str {
    TOKEN_FIXES
        .iter()
        .find(|(from, _)| *from == token)
        .map(|(_, to)| *to)
        .unwrap_or(token)
}

// Betting and ranking sources use their own three-letter codes for some teams.
static TEAM_ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("GBP", "GB"),
        ("JAC", "JAX"),
        ("KCC", "KC"),
        ("NEP", "NE"),
        ("NOS", "NO"),
        ("SFO", "SF"),
        ("TBB", "TB"),
    ])
});

pub fn canonical_team_abbv(raw: &str) -> String {
    let upper = raw.trim().to_ascii_uppercase();
    TEAM_ALIASES
        .get(upper.as_str())
        .map(|s| (*s).to_string())
        .unwrap_or(upper)
}

const TEAMS: &[(&str, &str)] = &[
    ("Arizona Cardinals", "ARI"),
    ("Atlanta Falcons", "ATL"),
    ("Baltimore Ravens", "BAL"),
    ("Buffalo Bills", "BUF"),
    ("Carolina Panthers", "CAR"),
    ("Chicago Bears", "CHI"),
    ("Cincinnati Bengals", "CIN"),
    ("Cleveland Browns", "CLE"),
    ("Dallas Cowboys", "DAL"),
    ("Denver Broncos", "DEN"),
    ("Detroit Lions", "DET"),
    ("Green Bay Packers", "GB"),
    ("Houston Texans", "HOU"),
    ("Indianapolis Colts", "IND"),
    ("Jacksonville Jaguars", "JAX"),
    ("Kansas City Chiefs", "KC"),
    ("Los Angeles Chargers", "LAC"),
    ("Los Angeles Rams", "LAR"),
    ("Miami Dolphins", "MIA"),
    ("Minnesota Vikings", "MIN"),
    ("New England Patriots", "NE"),
    ("New Orleans Saints", "NO"),
    ("New York Giants", "NYG"),
    ("New York Jets", "NYJ"),
    ("Oakland Raiders", "OAK"),
    ("Philadelphia Eagles", "PHI"),
    ("Pittsburgh Steelers", "PIT"),
    ("San Francisco 49ers", "SF"),
    ("Seattle Seahawks", "SEA"),
    ("Tampa Bay Buccaneers", "TB"),
    ("Tennessee Titans", "TEN"),
    ("Washington Redskins", "WAS"),
];

static TEAMS_BY_NAME: Lazy<HashMap<String, &'static str>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for (name, abbv) in TEAMS {
        map.insert(name.to_ascii_lowercase(), *abbv);
        // The contest export lists defenses by nickname only ("Ravens").
        if let Some(nickname) = name.rsplit(' ').next() {
            map.insert(nickname.to_ascii_lowercase(), *abbv);
        }
    }
    map
});

/// Whether `code` names a team, directly or through a source alias.
/// Generational suffixes such as `II` or `III` are not teams.
pub fn is_team_abbv(code: &str) -> bool {
    let canonical = canonical_team_abbv(code);
    TEAMS.iter().any(|(_, abbv)| *abbv == canonical)
}

/// Map a full team name or nickname to its abbreviation.
pub fn team_abbv_from_name(name: &str) -> Option<&'static str> {
    let key = name.split_whitespace().collect::<Vec<_>>().join(" ");
    TEAMS_BY_NAME.get(&key.to_ascii_lowercase()).copied()
}

// The analytics site lists quarterbacks as "D.Brees".
static QB_ABBREVIATIONS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("A.Dalton", "Andy Dalton"),
        ("A.Luck", "Andrew Luck"),
        ("A.Rodgers", "Aaron Rodgers"),
        ("A.Smith", "Alex Smith"),
        ("B.Bortles", "Blake Bortles"),
        ("B.Gabbert", "Blaine Gabbert"),
        ("B.Mayfield", "Baker Mayfield"),
        ("B.Osweiler", "Brock Osweiler"),
        ("B.Roethlisberger", "Ben Roethlisberger"),
        ("C.J.Beathard", "CJ Beathard"),
        ("C.Keenum", "Case Keenum"),
        ("C.Kessler", "Cody Kessler"),
        ("C.Newton", "Cam Newton"),
        ("C.Wentz", "Carson Wentz"),
        ("D.Anderson", "Derek Anderson"),
        ("D.Brees", "Drew Brees"),
        ("D.Carr", "Derek Carr"),
        ("D.Prescott", "Dak Prescott"),
        ("D.Watson", "Deshaun Watson"),
        ("E.Manning", "Eli Manning"),
        ("J.Allen", "Josh Allen"),
        ("J.Flacco", "Joe Flacco"),
        ("J.Garoppolo", "Jimmy Garoppolo"),
        ("J.Goff", "Jared Goff"),
        ("J.Rosen", "Josh Rosen"),
        ("J.Winston", "Jameis Winston"),
        ("K.Cousins", "Kirk Cousins"),
        ("L.Jackson", "Lamar Jackson"),
        ("M.Mariota", "Marcus Mariota"),
        ("M.Ryan", "Matt Ryan"),
        ("M.Stafford", "Matthew Stafford"),
        ("M.Trubisky", "Mitchell Trubisky"),
        ("N.Foles", "Nick Foles"),
        ("N.Peterman", "Nathan Peterman"),
        ("P.Mahomes", "Patrick Mahomes"),
        ("P.Rivers", "Philip Rivers"),
        ("R.Fitzpatrick", "Ryan Fitzpatrick"),
        ("R.Tannehill", "Ryan Tannehill"),
        ("R.Wilson", "Russell Wilson"),
        ("S.Bradford", "Sam Bradford"),
        ("S.Darnold", "Sam Darnold"),
        ("T.Brady", "Tom Brady"),
        ("T.Taylor", "Tyrod Taylor"),
    ])
});

pub fn expand_qb_abbreviation(raw: &str) -> Option<CanonicalName> {
    QB_ABBREVIATIONS.get(raw.trim()).map(|full| normalize(full))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_periods_and_suffixes() {
        assert_eq!(normalize("T.J. Yeldon").as_str(), "TJ Yeldon");
        assert_eq!(normalize("Todd Gurley II").as_str(), "Todd Gurley");
        assert_eq!(normalize("Odell Beckham Jr.").as_str(), "Odell Beckham");
        assert_eq!(normalize("  Juju   Smith-Schuster ").as_str(), "JuJu Smith-Schuster");
    }

    #[test]
    fn spelling_fixes_apply_to_whole_tokens_only() {
        assert_eq!(normalize("Mitch Trubisky").as_str(), "Mitchell Trubisky");
        assert_eq!(normalize("Mitchell Trubisky").as_str(), "Mitchell Trubisky");
        assert_eq!(normalize("Phillip Rivers").as_str(), "Philip Rivers");
    }

    #[test]
    fn empty_and_single_token_inputs_are_total() {
        assert_eq!(normalize("").as_str(), "");
        assert_eq!(normalize("...").as_str(), "");
        assert_eq!(normalize("Ravens").as_str(), "Ravens");
    }

    #[test]
    fn team_codes_are_recognized_through_aliases() {
        assert!(is_team_abbv("LAR"));
        assert!(is_team_abbv("JAC"));
        assert!(is_team_abbv("jax"));
        assert!(!is_team_abbv("II"));
        assert!(!is_team_abbv("III"));
        assert!(!is_team_abbv("JR"));
    }

    #[test]
    fn clean_cell_fixes_team_codes_and_names() {
        assert_eq!(clean_cell("T.J. Yeldon JAC"), "TJ Yeldon JAX");
        assert_eq!(clean_cell("Mitch Trubisky CHI"), "Mitchell Trubisky CHI");
    }

    #[test]
    fn team_identity_accepts_names_nicknames_and_codes() {
        assert_eq!(team_identity("Baltimore Ravens").as_str(), "BAL");
        assert_eq!(team_identity("Ravens ").as_str(), "BAL");
        assert_eq!(team_identity("jac").as_str(), "JAX");
        assert_eq!(team_identity("BAL").as_str(), "BAL");
    }

    #[test]
    fn qb_abbreviations_expand_to_canonical_names() {
        assert_eq!(
            expand_qb_abbreviation("C.J.Beathard").map(|n| n.to_string()),
            Some("CJ Beathard".to_string())
        );
        assert!(expand_qb_abbreviation("X.Nobody").is_none());
    }
}
