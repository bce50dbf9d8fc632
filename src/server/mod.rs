use axum::{
    extract::State,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::coordinator::Freshness;
use crate::sensor::TeamStatusSensor;

#[derive(Clone)]
pub struct AppState {
    pub sensor: TeamStatusSensor,
}

/// Build the Axum router for the status server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/status", get(status_handler))
        .route("/api/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

#[derive(Serialize)]
struct StatusResponse {
    name: String,
    unique_id: String,
    icon: &'static str,
    state: Option<String>,
    available: bool,
    freshness: Freshness,
    last_attempt: Option<DateTime<Utc>>,
    attributes: Map<String, Value>,
}

/// GET /api/status — the full sensor projection. Reads only cached state;
/// never triggers a fetch.
async fn status_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let sensor = &state.sensor;
    Json(StatusResponse {
        name: sensor.name(),
        unique_id: sensor.unique_id(),
        icon: sensor.icon(),
        state: sensor.state(),
        available: sensor.available(),
        freshness: sensor.freshness(),
        last_attempt: sensor.last_attempt(),
        attributes: sensor.attributes(),
    })
}

/// GET /api/health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Serve the status HTML page, injecting the sensor name.
async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Html(STATUS_HTML.replace("{{NAME}}", &state.sensor.name()))
}

/// Embedded single-file status page (HTML + CSS + JS)
const STATUS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{{NAME}} — Team Status</title>
<style>
  :root { --bg: #0f1117; --card: #1a1d27; --border: #2a2d3a; --green: #00c896; --red: #ff4f6a; --text: #e0e0e0; --muted: #8888aa; }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.3rem; }
  .badge { padding: .2rem .6rem; border-radius: 4px; font-size: .75rem; font-weight: 700; text-transform: uppercase; }
  .badge.fresh { background: var(--green); color: #000; }
  .badge.stale, .badge.never_fetched { background: var(--red); color: #000; }
  main { padding: 1.5rem 2rem; }
  .score { font-size: 2.4rem; font-weight: 700; margin-bottom: 1rem; }
  table { border-collapse: collapse; width: 100%; max-width: 720px; background: var(--card); border: 1px solid var(--border); border-radius: 10px; }
  td { padding: .5rem 1rem; font-size: .88rem; border-bottom: 1px solid #1e2130; }
  td:first-child { color: var(--muted); width: 40%; }
  tr:last-child td { border-bottom: none; }
</style>
</head>
<body>
<header><h1>{{NAME}}</h1><span id="freshness" class="badge">loading</span></header>
<main>
  <div class="score" id="score">—</div>
  <table id="attrs"></table>
</main>
<script>
function esc(s) {
  return String(s).replace(/[&<>"']/g, c => '&#' + c.charCodeAt(0) + ';');
}
async function refresh() {
  const res = await fetch('/api/status');
  const data = await res.json();
  const badge = document.getElementById('freshness');
  badge.textContent = data.freshness.replace('_', ' ');
  badge.className = 'badge ' + data.freshness;
  const a = data.attributes;
  document.getElementById('score').textContent =
    (a.team_abbr ?? '?') + ' ' + (a.team_score ?? '-') + ' : ' +
    (a.opponent_score ?? '-') + ' ' + (a.opponent_abbr ?? '?');
  document.getElementById('attrs').innerHTML = Object.entries(a)
    .map(([k, v]) => `<tr><td>${esc(k)}</td><td>${esc(v ?? '')}</td></tr>`).join('');
}
refresh();
setInterval(refresh, 30000);
</script>
</body>
</html>"#;
