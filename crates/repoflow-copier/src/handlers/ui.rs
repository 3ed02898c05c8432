//! Minimal status page

use axum::response::Html;

/// Copy-record listing page, rendered client-side from `/api/issue-copies`
pub async fn index() -> Html<&'static str> {
    Html(PAGE)
}

const PAGE: &str = r#"<!doctype html>
<html>
<head>
<meta charset="utf-8">
<title>Issue Copies</title>
<style>
body { font-family: sans-serif; margin: 2rem; }
table { border-collapse: collapse; width: 100%; }
td, th { border: 1px solid #ccc; padding: 0.4rem 0.6rem; text-align: left; }
.success { color: #1a7f37; } .failed { color: #cf222e; } .partial { color: #9a6700; }
</style>
</head>
<body>
<h1>Issue copies</h1>
<p id="counts"></p>
<table>
<thead><tr><th>Source</th><th>Target</th><th>Status</th><th>Labels</th><th>Created</th></tr></thead>
<tbody id="copies"></tbody>
</table>
<script>
fetch('api/issue-copies/stats').then(r => r.json()).then(c => {
  document.getElementById('counts').textContent =
    `${c.total} copies - ${c.success} success, ${c.partial} partial, ${c.failed} failed`;
});
fetch('api/issue-copies').then(r => r.json()).then(data => {
  document.getElementById('copies').innerHTML = data.copies.map(r =>
    `<tr><td><a href="${r.source_issue_url}">${r.source_repo}#${r.source_issue_number}</a></td>` +
    `<td>${r.target_issue_url ? `<a href="${r.target_issue_url}">` : ''}${r.target_repo}` +
    `${r.target_issue_number ? '#' + r.target_issue_number : ''}${r.target_issue_url ? '</a>' : ''}</td>` +
    `<td class="${r.status}">${r.status}</td><td>${r.labels_copied}</td>` +
    `<td>${r.created_at}</td></tr>`).join('');
});
</script>
</body>
</html>
"#;
