//! Label-to-repository routing

use repoflow_config::IssueCopyConfig;

/// Resolve the target repositories for an issue's labels
///
/// Deterministic over (labels, config): targets come out in the config
/// map's (sorted) key order, de-duplicated. When nothing matches, the
/// default target applies if configured; otherwise the list is empty and
/// the event is a no-op.
pub fn resolve_targets(labels: &[String], config: &IssueCopyConfig) -> Vec<String> {
    let mut targets: Vec<String> = Vec::new();
    for (label, repo) in &config.label_to_repo {
        if labels.iter().any(|l| l == label) && !targets.contains(repo) {
            targets.push(repo.clone());
        }
    }
    if targets.is_empty() {
        if let Some(default) = &config.default_target_repo {
            targets.push(default.clone());
        }
    }
    // never copy a repo onto itself
    targets.retain(|t| t != &config.source_repo);
    targets
}
