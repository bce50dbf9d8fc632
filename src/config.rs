use clap::Parser;
use std::time::Duration;

use crate::api::API_ENDPOINT;
use crate::coordinator::CoordinatorConfig;
use crate::teams;

/// Single-team MLB status tracker
#[derive(Parser, Debug, Clone)]
#[command(name = "mlb-team-status", version, about)]
pub struct Config {
    /// Team abbreviation to track (e.g. SEA, NYY, BOS)
    #[arg(long, env = "TEAM_ID")]
    pub team_id: String,

    /// Display name for the status sensor
    #[arg(long, env = "TEAM_NAME", default_value = "MLB")]
    pub name: String,

    /// API request timeout in seconds
    #[arg(long, env = "API_TIMEOUT_SECS", default_value = "120")]
    pub timeout_secs: u64,

    /// Polling interval in seconds
    #[arg(long, env = "POLL_INTERVAL_SECS", default_value = "600")]
    pub poll_interval_secs: u64,

    /// Scoreboard API base URL
    #[arg(long, env = "MLB_API_URL", default_value = API_ENDPOINT)]
    pub api_url: String,

    /// Status server listen address
    #[arg(long, env = "SERVER_ADDR", default_value = "0.0.0.0:8080")]
    pub server_addr: String,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if !teams::is_valid_team(&self.team_id) {
            anyhow::bail!(
                "unknown team id '{}'; expected one of {}",
                self.team_id,
                teams::TEAM_IDS.join(", ")
            );
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }
        if self.poll_interval_secs == 0 {
            anyhow::bail!("poll_interval_secs must be greater than zero");
        }
        if url::Url::parse(&self.api_url).is_err() {
            anyhow::bail!("api_url is not a valid URL: {}", self.api_url);
        }
        Ok(())
    }

    /// Coordinator view of this configuration, with the team id in its
    /// canonical upper-case form.
    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            team_id: teams::canonical_team(&self.team_id)
                .map(str::to_string)
                .unwrap_or_else(|| self.team_id.to_ascii_uppercase()),
            name: self.name.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            update_interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}
