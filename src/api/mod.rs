pub mod client;
pub mod models;

pub use client::{ScoreboardClient, StatusFetcher, API_ENDPOINT, USER_AGENT};
pub use models::{FetchError, GameRecord};
