//! Sensor-style projection of coordinator state.
//!
//! Pure data mapping: every read here is an in-memory lookup against the
//! coordinator's cached snapshot. Absent fields project to JSON `null`
//! rather than being dropped, so consumers always see the full attribute
//! set regardless of game state.

use serde_json::{json, Map, Value};

use crate::api::GameRecord;
use crate::coordinator::{Freshness, UpdateCoordinator};

pub const ATTRIBUTION: &str = "Data provided by the MLB scoreboard API";
pub const DEFAULT_ICON: &str = "mdi:baseball";

/// Read-only view over one coordinator. Cheap to clone.
#[derive(Clone)]
pub struct TeamStatusSensor {
    coordinator: UpdateCoordinator,
}

impl TeamStatusSensor {
    pub fn new(coordinator: UpdateCoordinator) -> Self {
        TeamStatusSensor { coordinator }
    }

    pub fn name(&self) -> String {
        self.coordinator.name()
    }

    /// Stable identifier derived from display name and team id,
    /// e.g. "seattle_mariners_sea".
    pub fn unique_id(&self) -> String {
        format!(
            "{}_{}",
            slugify(&self.coordinator.name()),
            slugify(self.coordinator.team_id())
        )
    }

    pub fn icon(&self) -> &'static str {
        DEFAULT_ICON
    }

    /// The sensor state is the game state field ("PRE" | "IN" | "POST"),
    /// or nothing before the first successful fetch.
    pub fn state(&self) -> Option<String> {
        self.coordinator.current_snapshot().and_then(|rec| rec.state)
    }

    /// Mirrors the coordinator's last-refresh outcome.
    pub fn available(&self) -> bool {
        self.coordinator.last_success()
    }

    pub fn freshness(&self) -> Freshness {
        self.coordinator.freshness()
    }

    pub fn last_attempt(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.coordinator.last_attempt()
    }

    /// Full attribute map. Before the first fetch this is the all-absent
    /// projection — every key present, every value null.
    pub fn attributes(&self) -> Map<String, Value> {
        let record = self
            .coordinator
            .current_snapshot()
            .unwrap_or_else(GameRecord::cleared);
        record_attributes(&record)
    }
}

/// Project one record into the fixed, named attribute set.
pub fn record_attributes(rec: &GameRecord) -> Map<String, Value> {
    let mut attrs = Map::new();
    attrs.insert("attribution".into(), json!(ATTRIBUTION));
    attrs.insert("date".into(), json!(rec.date));
    attrs.insert("kickoff_in".into(), json!(rec.kickoff_in));
    attrs.insert("quarter".into(), json!(rec.quarter));
    attrs.insert("clock".into(), json!(rec.clock));
    attrs.insert("venue".into(), json!(rec.venue));
    attrs.insert("location".into(), json!(rec.location));
    attrs.insert("tv_network".into(), json!(rec.tv_network));
    attrs.insert("odds".into(), json!(rec.odds));
    attrs.insert("overunder".into(), json!(rec.overunder));
    attrs.insert("possession".into(), json!(rec.possession));
    attrs.insert("last_play".into(), json!(rec.last_play));
    attrs.insert("down_distance_text".into(), json!(rec.down_distance_text));
    attrs.insert("team_abbr".into(), json!(rec.team_abbr));
    attrs.insert("team_id".into(), json!(rec.team_id));
    attrs.insert("team_name".into(), json!(rec.team_name));
    attrs.insert("team_record".into(), json!(rec.team_record));
    attrs.insert("team_homeaway".into(), json!(rec.team_homeaway));
    attrs.insert("team_logo".into(), json!(rec.team_logo));
    attrs.insert("team_colors".into(), json!(rec.team_colors));
    attrs.insert(
        "team_colors_rgb".into(),
        json!(rec.team_colors.as_deref().map(colors_to_rgb)),
    );
    attrs.insert("team_score".into(), json!(rec.team_score));
    attrs.insert("team_rank".into(), json!(rec.team_rank));
    attrs.insert(
        "team_win_probability".into(),
        json!(rec.team_win_probability),
    );
    attrs.insert("team_timeouts".into(), json!(rec.team_timeouts));
    attrs.insert("opponent_abbr".into(), json!(rec.opponent_abbr));
    attrs.insert("opponent_id".into(), json!(rec.opponent_id));
    attrs.insert("opponent_name".into(), json!(rec.opponent_name));
    attrs.insert("opponent_record".into(), json!(rec.opponent_record));
    attrs.insert("opponent_homeaway".into(), json!(rec.opponent_homeaway));
    attrs.insert("opponent_logo".into(), json!(rec.opponent_logo));
    attrs.insert("opponent_colors".into(), json!(rec.opponent_colors));
    attrs.insert(
        "opponent_colors_rgb".into(),
        json!(rec.opponent_colors.as_deref().map(colors_to_rgb)),
    );
    attrs.insert("opponent_score".into(), json!(rec.opponent_score));
    attrs.insert("opponent_rank".into(), json!(rec.opponent_rank));
    attrs.insert(
        "opponent_win_probability".into(),
        json!(rec.opponent_win_probability),
    );
    attrs.insert("opponent_timeouts".into(), json!(rec.opponent_timeouts));
    attrs.insert("last_update".into(), json!(rec.last_update));
    attrs
}

/// "Seattle Mariners" → "seattle_mariners"
fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_sep = true;
    for c in input.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_sep = false;
        } else if !last_sep {
            out.push('_');
            last_sep = true;
        }
    }
    out.trim_end_matches('_').to_string()
}

/// "#0C2340,#BD3039" → ["rgb(12,35,64)", "rgb(189,48,57)"]
fn colors_to_rgb(colors: &str) -> Vec<String> {
    colors
        .split([',', ';'])
        .filter_map(hex_to_rgb)
        .collect()
}

fn hex_to_rgb(hex: &str) -> Option<String> {
    let h = hex.trim().trim_start_matches('#');
    // Byte-indexed slicing below; non-ASCII input would split a char boundary
    if !h.is_ascii() || h.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&h[0..2], 16).ok()?;
    let g = u8::from_str_radix(&h[2..4], 16).ok()?;
    let b = u8::from_str_radix(&h[4..6], 16).ok()?;
    Some(format!("rgb({r},{g},{b})"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchError, StatusFetcher};
    use crate::coordinator::CoordinatorConfig;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    struct FixedFetcher(GameRecord);

    #[async_trait]
    impl StatusFetcher for FixedFetcher {
        fn name(&self) -> &str {
            "fixed"
        }
        async fn fetch(&self, _: &str, _: Duration) -> Result<GameRecord, FetchError> {
            Ok(self.0.clone())
        }
    }

    fn live_record() -> GameRecord {
        GameRecord {
            state: Some("IN".to_string()),
            quarter: Some("Top 4".to_string()),
            venue: Some("T-Mobile Park".to_string()),
            team_abbr: Some("SEA".to_string()),
            team_score: Some(5),
            team_colors: Some("#0C2340,#BD3039".to_string()),
            opponent_abbr: Some("HOU".to_string()),
            opponent_score: Some(2),
            ..GameRecord::cleared()
        }
    }

    #[test]
    fn test_absent_fields_project_to_null() {
        let attrs = record_attributes(&GameRecord::cleared());
        assert!(attrs["venue"].is_null());
        assert!(attrs["team_score"].is_null());
        assert!(attrs["team_colors_rgb"].is_null());
        // Attribution is always present
        assert_eq!(attrs["attribution"], json!(ATTRIBUTION));
        // Fixed key set even when everything is absent
        assert!(attrs.contains_key("opponent_win_probability"));
        assert!(attrs.contains_key("last_update"));
    }

    #[test]
    fn test_present_fields_pass_through() {
        let attrs = record_attributes(&live_record());
        assert_eq!(attrs["team_score"], json!(5));
        assert_eq!(attrs["venue"], json!("T-Mobile Park"));
        assert_eq!(attrs["opponent_abbr"], json!("HOU"));
        assert!(attrs["odds"].is_null());
    }

    #[test]
    fn test_colors_derive_rgb_values() {
        let attrs = record_attributes(&live_record());
        assert_eq!(
            attrs["team_colors_rgb"],
            json!(["rgb(12,35,64)", "rgb(189,48,57)"])
        );
    }

    #[test]
    fn test_hex_to_rgb_rejects_garbage() {
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
        assert_eq!(hex_to_rgb(""), None);
        assert_eq!(hex_to_rgb("€abc"), None);
        assert_eq!(hex_to_rgb("ＦＦＦＦＦＦ"), None);
        assert_eq!(hex_to_rgb(" #ffffff "), Some("rgb(255,255,255)".to_string()));
    }

    #[test]
    fn test_non_ascii_colors_project_without_panicking() {
        // Colors arrive from the upstream JSON unvalidated; a 6-byte
        // non-ASCII value must degrade to no rgb entry, not panic.
        let rec = GameRecord {
            team_colors: Some("€abc".to_string()),
            opponent_colors: Some("#0C2340,€abc".to_string()),
            ..GameRecord::cleared()
        };
        let attrs = record_attributes(&rec);
        assert_eq!(attrs["team_colors_rgb"], json!(Vec::<String>::new()));
        assert_eq!(attrs["opponent_colors_rgb"], json!(["rgb(12,35,64)"]));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Seattle Mariners"), "seattle_mariners");
        assert_eq!(slugify("  Go M's!  "), "go_m_s");
        assert_eq!(slugify("SEA"), "sea");
    }

    #[tokio::test]
    async fn test_sensor_reads_coordinator_state() {
        let coordinator = crate::coordinator::UpdateCoordinator::new(
            CoordinatorConfig {
                team_id: "SEA".to_string(),
                name: "Seattle Mariners".to_string(),
                timeout: Duration::from_secs(5),
                update_interval: Duration::from_secs(600),
            },
            Arc::new(FixedFetcher(live_record())),
        )
        .unwrap();
        let sensor = TeamStatusSensor::new(coordinator.clone());

        // Before the first fetch: no state, unavailable, all-null attributes
        assert_eq!(sensor.state(), None);
        assert!(!sensor.available());
        assert!(sensor.attributes()["team_score"].is_null());

        coordinator.refresh().await;

        assert_eq!(sensor.state().as_deref(), Some("IN"));
        assert!(sensor.available());
        assert_eq!(sensor.attributes()["team_score"], json!(5));
        assert_eq!(sensor.unique_id(), "seattle_mariners_sea");
    }
}
