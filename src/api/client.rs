use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use std::time::Duration;
use tracing::debug;

use super::models::{FetchError, GameRecord};

/// Fixed upstream scoreboard endpoint, parameterized only by team id.
pub const API_ENDPOINT: &str =
    "https://site.api.espn.com/apis/site/v2/sports/baseball/mlb/scoreboard";

/// Client identifier sent with every request.
pub const USER_AGENT: &str = concat!("mlb-team-status/", env!("CARGO_PKG_VERSION"));

/// Trait the coordinator polls through. One implementation talks to the real
/// API; tests substitute scripted ones.
#[async_trait]
pub trait StatusFetcher: Send + Sync {
    /// Perform exactly one fetch for the given team. No retries, no caching;
    /// retry policy belongs to the caller.
    async fn fetch(&self, team_id: &str, timeout: Duration) -> Result<GameRecord, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Fetcher backed by the MLB scoreboard API.
pub struct ScoreboardClient {
    http: Client,
    /// Base URL for overriding in tests
    base_url: String,
}

impl ScoreboardClient {
    pub fn new(base_url: Option<&str>) -> Result<Self> {
        // Timeout is applied per request, not here: the configured value can
        // change through the options path without rebuilding the client.
        let http = Client::builder()
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ScoreboardClient {
            http,
            base_url: base_url.unwrap_or(API_ENDPOINT).to_string(),
        })
    }
}

#[async_trait]
impl StatusFetcher for ScoreboardClient {
    fn name(&self) -> &str {
        "MLB scoreboard"
    }

    async fn fetch(&self, team_id: &str, timeout: Duration) -> Result<GameRecord, FetchError> {
        debug!("Fetching team status from {}?team_id={}", self.base_url, team_id);

        let resp = self
            .http
            .get(&self.base_url)
            .query(&[("team_id", team_id)])
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| classify(e, timeout))?;

        if resp.status() != StatusCode::OK {
            return Err(FetchError::Status(resp.status()));
        }

        let record = resp
            .json::<GameRecord>()
            .await
            .map_err(|e| classify(e, timeout))?;
        Ok(record)
    }
}

fn classify(err: reqwest::Error, timeout: Duration) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout(timeout)
    } else {
        FetchError::Transport(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header as header_eq, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn client_for(server: &MockServer) -> ScoreboardClient {
        ScoreboardClient::new(Some(&server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success_parses_record() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("team_id", "SEA"))
            .and(header_eq("Accept", "application/json"))
            .and(header_eq("User-Agent", USER_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "state": "IN",
                "team_abbr": "SEA",
                "team_score": 3,
                "opponent_abbr": "HOU",
                "opponent_score": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let rec = client_for(&server)
            .await
            .fetch("SEA", Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(rec.team_score, Some(3));
        assert_eq!(rec.opponent_abbr.as_deref(), Some("HOU"));
        // Absent fields stay absent, not defaulted to anything else
        assert_eq!(rec.venue, None);
    }

    #[tokio::test]
    async fn test_fetch_non_200_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch("SEA", Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            FetchError::Status(code) => assert_eq!(code.as_u16(), 500),
            other => panic!("expected Status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_slow_response_is_timeout_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch("SEA", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_is_transport_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .fetch("SEA", Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {err:?}");
    }
}
