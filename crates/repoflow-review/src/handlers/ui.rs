//! Minimal status page

use axum::response::Html;

/// Task listing page, rendered client-side from `/api/tasks`
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>PR Reviews</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
td, th { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }
.completed { color: #1a7f37; } .failed { color: #cf222e; }
.processing { color: #9a6700; } .queued { color: #57606a; }
</style>
</head>
<body>
<h1>PR review tasks</h1>
<p id="counts"></p>
<table>
<thead><tr><th>Task</th><th>Title</th><th>Status</th><th>Progress</th><th>Updated</th></tr></thead>
<tbody id="tasks"></tbody>
</table>
<script>
fetch('api/tasks').then(r => r.json()).then(data => {
  const c = data.counts;
  document.getElementById('counts').textContent =
    `${c.total} tasks - ${c.queued} queued, ${c.processing} processing, ` +
    `${c.completed} completed, ${c.failed} failed`;
  document.getElementById('tasks').innerHTML = data.tasks.map(t =>
    `<tr><td><a href="${t.pr_url}">${t.task_id}</a></td><td>${t.pr_title}</td>` +
    `<td class="${t.status}">${t.status}</td><td>${t.progress}%</td>` +
    `<td>${t.updated_at}</td></tr>`).join('');
});
</script>
</body>
</html>
"#;
