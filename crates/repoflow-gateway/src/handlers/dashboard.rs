//! Dashboard aggregation

use std::time::Duration;

use axum::{extract::State, response::Html, Json};
use serde_json::{json, Value};
use tracing::debug;

use crate::state::AppState;

/// Budget for each worker's stats call; a slow worker never blocks the page
const PER_WORKER_TIMEOUT: Duration = Duration::from_secs(2);

/// Aggregate every worker's stats, flagging unreachable ones
///
/// Never 5xx because a worker is down: its entry just reads
/// `reachable: false` and the rest of the data is still returned.
pub async fn dashboard(State(state): State<AppState>) -> Json<Value> {
    let (reviewer, copier, scorer) = tokio::join!(
        worker_stats(&state, &state.workers.review),
        worker_stats(&state, &state.workers.copier),
        worker_stats(&state, &state.workers.scorer),
    );
    Json(json!({
        "pr_reviewer": reviewer,
        "issue_copier": copier,
        "issue_scorer": scorer,
    }))
}

async fn worker_stats(state: &AppState, base_url: &str) -> Value {
    let url = format!("{}/api/stats", base_url.trim_end_matches('/'));
    let result = async {
        let response = state
            .http
            .get(&url)
            .timeout(PER_WORKER_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        response.json::<Value>().await
    }
    .await;
    match result {
        Ok(stats) => json!({"reachable": true, "stats": stats}),
        Err(err) => {
            debug!(url = %url, error = %err, "worker stats unavailable");
            json!({"reachable": false, "stats": Value::Null})
        }
    }
}

/// Landing page linking the worker UIs, rendered from `/api/dashboard`
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>repoflow</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
.card { border: 1px solid #ccc; border-radius: 6px; padding: 1rem; margin: 0.5rem 0; }
.down { color: #cf222e; } .up { color: #1a7f37; }
a { margin-right: 1rem; }
</style>
</head>
<body>
<h1>repoflow</h1>
<p>
<a href="pr-tasks/">PR reviews</a>
<a href="issue-copies/">Issue copies</a>
<a href="issue-scores/">Issue scores</a>
<a href="feedback-analytics/">Feedback analytics</a>
</p>
<div id="workers"></div>
<script>
const NAMES = {pr_reviewer: 'PR reviewer', issue_copier: 'Issue copier', issue_scorer: 'Issue scorer'};
fetch('api/dashboard').then(r => r.json()).then(data => {
  document.getElementById('workers').innerHTML = Object.entries(data).map(([key, w]) =>
    `<div class="card"><strong>${NAMES[key] ?? key}</strong> ` +
    `<span class="${w.reachable ? 'up' : 'down'}">${w.reachable ? 'up' : 'unreachable'}</span>` +
    `<pre>${JSON.stringify(w.stats, null, 2) ?? ''}</pre></div>`).join('');
});
</script>
</body>
</html>
"#;
