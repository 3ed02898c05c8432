//! Minimal status page

use axum::response::Html;

/// Score listing page, rendered client-side from `/api/scores`
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Issue Scores</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
td, th { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }
.completed { color: #1a7f37; } .failed { color: #cf222e; }
.processing { color: #9a6700; } .queued { color: #57606a; }
</style>
</head>
<body>
<h1>Issue scores</h1>
<p id="counts"></p>
<table>
<thead><tr><th>Issue</th><th>Type</th><th>Status</th><th>Overall</th><th>Created</th></tr></thead>
<tbody id="scores"></tbody>
</table>
<h2>Feedback patterns</h2>
<table>
<thead><tr><th>Pattern</th><th>Occurrences</th><th>Avg deviation</th><th>Last seen</th></tr></thead>
<tbody id="patterns"></tbody>
</table>
<script>
fetch('api/scores').then(r => r.json()).then(data => {
  const c = data.counts;
  document.getElementById('counts').textContent =
    `${c.total} scores - ${c.queued} queued, ${c.processing} processing, ` +
    `${c.completed} completed, ${c.failed} failed`;
  document.getElementById('scores').innerHTML = data.scores.map(s =>
    `<tr><td><a href="${s.issue_url}">${s.repo}#${s.issue_number}` +
    `${s.comment_id ? ' (comment)' : ''}</a></td><td>${s.content_type}</td>` +
    `<td class="${s.status}">${s.status}</td>` +
    `<td>${s.overall_score ?? '-'}</td><td>${s.created_at}</td></tr>`).join('');
});
fetch('api/feedback/patterns').then(r => r.json()).then(data => {
  document.getElementById('patterns').innerHTML = data.patterns.map(p =>
    `<tr><td>${p.pattern_key}</td><td>${p.occurrence_count}</td>` +
    `<td>${p.avg_score_deviation.toFixed(1)}</td><td>${p.last_seen}</td></tr>`).join('');
});
</script>
</body>
</html>
"#;
