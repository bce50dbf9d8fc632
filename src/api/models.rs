use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One game-status record for the configured team, as returned by the
/// scoreboard API.
///
/// Every field is optional: the upstream payload varies with game state
/// (pregame has no clock, offseason has almost nothing), so absence is a
/// normal value rather than an error. Records are only ever replaced
/// wholesale — the coordinator never merges fields across fetches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRecord {
    /// Game state: "PRE" | "IN" | "POST" | "NOT_FOUND"
    pub state: Option<String>,
    pub date: Option<String>,
    /// Human-readable countdown to first pitch
    pub kickoff_in: Option<String>,
    /// Inning, in the API's cross-sport "quarter" field
    pub quarter: Option<String>,
    pub clock: Option<String>,
    pub venue: Option<String>,
    pub location: Option<String>,
    pub tv_network: Option<String>,
    pub odds: Option<String>,
    pub overunder: Option<f64>,
    pub last_play: Option<String>,
    pub down_distance_text: Option<String>,
    pub possession: Option<String>,
    pub team_abbr: Option<String>,
    pub team_id: Option<String>,
    pub team_name: Option<String>,
    /// Win-loss record, e.g. "92-70"
    pub team_record: Option<String>,
    /// "home" or "away"
    pub team_homeaway: Option<String>,
    pub team_logo: Option<String>,
    /// Comma-separated hex colors, e.g. "#0C2340,#BD3039"
    pub team_colors: Option<String>,
    pub team_score: Option<i64>,
    pub team_rank: Option<i64>,
    pub team_win_probability: Option<f64>,
    pub team_timeouts: Option<i64>,
    pub opponent_abbr: Option<String>,
    pub opponent_id: Option<String>,
    pub opponent_name: Option<String>,
    pub opponent_record: Option<String>,
    pub opponent_homeaway: Option<String>,
    pub opponent_logo: Option<String>,
    pub opponent_colors: Option<String>,
    pub opponent_score: Option<i64>,
    pub opponent_rank: Option<i64>,
    pub opponent_win_probability: Option<f64>,
    pub opponent_timeouts: Option<i64>,
    pub last_update: Option<String>,
}

impl GameRecord {
    /// The all-absent record. What a sensor shows before the first
    /// successful fetch, and the baseline every refresh replaces.
    pub fn cleared() -> Self {
        Self::default()
    }
}

/// Why a single fetch attempt failed. The coordinator turns any of these
/// into a stale snapshot; none of them propagate further.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("scoreboard API returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cleared_record_has_no_fields() {
        let rec = GameRecord::cleared();
        assert_eq!(rec.state, None);
        assert_eq!(rec.team_score, None);
        assert_eq!(rec, GameRecord::default());
    }

    #[test]
    fn test_partial_payload_deserializes_with_absent_fields() {
        let rec: GameRecord = serde_json::from_str(r#"{"team_score": 3}"#).unwrap();
        assert_eq!(rec.team_score, Some(3));
        assert_eq!(rec.opponent_score, None);
        assert_eq!(rec.venue, None);
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let rec: GameRecord =
            serde_json::from_str(r#"{"state": "IN", "private_fast_refresh": false}"#).unwrap();
        assert_eq!(rec.state.as_deref(), Some("IN"));
    }

    #[test]
    fn test_full_payload_roundtrip_of_typed_fields() {
        let rec: GameRecord = serde_json::from_str(
            r#"{
                "state": "IN",
                "quarter": "Bottom 7",
                "team_abbr": "SEA",
                "team_score": 5,
                "opponent_abbr": "HOU",
                "opponent_score": 2,
                "team_win_probability": 0.81,
                "overunder": 8.5
            }"#,
        )
        .unwrap();
        assert_eq!(rec.team_score, Some(5));
        assert_eq!(rec.team_win_probability, Some(0.81));
        assert_eq!(rec.overunder, Some(8.5));
        assert_eq!(rec.quarter.as_deref(), Some("Bottom 7"));
    }
}
