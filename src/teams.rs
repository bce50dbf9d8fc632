//! MLB team catalogue.
//!
//! The upstream API only understands the 30 official team abbreviations, so
//! configuration is validated against this list up front rather than letting
//! a typo surface as an endless string of failed refreshes.

/// Official MLB team abbreviations accepted as `--team-id`.
pub const TEAM_IDS: &[&str] = &[
    "HOU", "TEX", "NYY", "BOS", "LAD", "SF", "CHC", "STL", "ATL", "NYM",
    "SEA", "OAK", "CLE", "CWS", "MIL", "MIN", "TB", "TOR", "PHI", "WSH",
    "ARI", "SD", "COL", "MIA", "CIN", "PIT", "DET", "KC", "BAL", "LAA",
];

/// Case-insensitive membership test against [`TEAM_IDS`].
pub fn is_valid_team(code: &str) -> bool {
    TEAM_IDS.iter().any(|id| id.eq_ignore_ascii_case(code))
}

/// Canonical (upper-case) form of a team code, if it is a known team.
pub fn canonical_team(code: &str) -> Option<&'static str> {
    TEAM_IDS
        .iter()
        .find(|id| id.eq_ignore_ascii_case(code))
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_team_is_valid() {
        assert!(is_valid_team("SEA"));
        assert!(is_valid_team("sea"));
        assert!(is_valid_team("Nyy"));
    }

    #[test]
    fn test_unknown_team_is_invalid() {
        assert!(!is_valid_team("XYZ"));
        assert!(!is_valid_team(""));
    }

    #[test]
    fn test_canonical_form() {
        assert_eq!(canonical_team("cws"), Some("CWS"));
        assert_eq!(canonical_team("EXPOS"), None);
    }

    #[test]
    fn test_catalogue_has_thirty_teams() {
        assert_eq!(TEAM_IDS.len(), 30);
    }
}
