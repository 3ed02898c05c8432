//! Content-type classification
//!
//! Labels are authoritative; body patterns break ties when labels say
//! nothing. Comments are always `comment` and never pass through here.

use repoflow_store::ContentType;

/// Classify an issue from its labels, title, and body
pub fn classify_issue(title: &str, body: &str, labels: &[String]) -> ContentType {
    let labels: Vec<String> = labels.iter().map(|l| l.to_lowercase()).collect();
    let has = |name: &str| labels.iter().any(|l| l == name || l.contains(name));

    if has("bug") || has("defect") {
        return ContentType::Bug;
    }
    if has("test-result") || has("test result") || has("test") {
        return ContentType::TestResult;
    }
    if has("feature") || has("enhancement") {
        return ContentType::Feature;
    }
    if has("task") {
        return ContentType::Task;
    }

    let title = title.to_lowercase();
    let body = body.to_lowercase();
    if title.starts_with("[test]")
        || body.contains("test summary")
        || body.contains("pass rate")
        || (body.contains("expected result") && body.contains("actual result"))
    {
        return ContentType::TestResult;
    }
    if body.contains("steps to reproduce")
        || (body.contains("expected behavior") && body.contains("actual behavior"))
    {
        return ContentType::Bug;
    }
    if body.contains("feature request") || body.contains("proposed solution") {
        return ContentType::Feature;
    }
    ContentType::Task
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn labels_win_over_body() {
        assert_eq!(
            classify_issue("anything", "steps to reproduce: none", &labels(&["Feature"])),
            ContentType::Feature
        );
        assert_eq!(
            classify_issue("x", "", &labels(&["bug"])),
            ContentType::Bug
        );
        assert_eq!(
            classify_issue("x", "", &labels(&["test-result"])),
            ContentType::TestResult
        );
    }

    #[test]
    fn body_patterns_break_ties() {
        assert_eq!(
            classify_issue("crash", "## Steps to Reproduce\n1. run", &[]),
            ContentType::Bug
        );
        assert_eq!(
            classify_issue("[TEST] nightly", "all green", &[]),
            ContentType::TestResult
        );
        assert_eq!(
            classify_issue("idea", "Proposed solution: add a flag", &[]),
            ContentType::Feature
        );
    }

    #[test]
    fn default_is_task() {
        assert_eq!(classify_issue("tidy up", "please", &[]), ContentType::Task);
    }
}
