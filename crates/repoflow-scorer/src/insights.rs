//! Feedback insight synthesis
//!
//! Turns recent feedback patterns into the textual block injected into
//! scoring prompts: total volume, the most frequent identified issues, and
//! a per-dimension calibration line derived from the mean score deviations.

use std::collections::BTreeMap;

use repoflow_store::{Dimension, FeedbackPattern};

/// Deviations smaller than this are treated as "calibrated"
const DEVIATION_EPSILON: f64 = 1.0;

/// Build the insight block, or None when there is nothing worth injecting
///
/// Callers pass patterns already filtered by window and occurrence
/// threshold; an empty slice elides the block entirely.
pub fn build_insight_block(patterns: &[FeedbackPattern]) -> Option<String> {
    if patterns.is_empty() {
        return None;
    }

    let total: i64 = patterns.iter().map(|p| p.occurrence_count).sum();
    let mut block = format!("Recent user feedback on scoring ({} items):\n", total);

    let top_issues: Vec<&str> = patterns
        .iter()
        .filter(|p| !p.identified_issue.is_empty())
        .take(3)
        .map(|p| p.identified_issue.as_str())
        .collect();
    if !top_issues.is_empty() {
        block.push_str("Top reported issues:\n");
        for issue in top_issues {
            block.push_str(&format!("- {}\n", issue));
        }
    }

    block.push_str("Per-dimension calibration:\n");
    for (dimension, line) in dimension_lines(patterns) {
        block.push_str(&format!("- {}: {}\n", dimension, line));
    }
    Some(block)
}

/// Occurrence-weighted mean deviation per dimension, rendered as guidance
fn dimension_lines(patterns: &[FeedbackPattern]) -> Vec<(Dimension, String)> {
    let mut sums: BTreeMap<String, (Dimension, f64, i64)> = BTreeMap::new();
    for pattern in patterns {
        let entry = sums
            .entry(pattern.dimension.to_string())
            .or_insert((pattern.dimension, 0.0, 0));
        entry.1 += pattern.avg_score_deviation * pattern.occurrence_count as f64;
        entry.2 += pattern.occurrence_count;
    }

    sums.into_values()
        .map(|(dimension, weighted, count)| {
            let mean = weighted / count as f64;
            let line = if mean >= DEVIATION_EPSILON {
                format!(
                    "consider loosening; users think scores are on average {} points too low",
                    mean.round() as i64
                )
            } else if mean <= -DEVIATION_EPSILON {
                format!(
                    "consider tightening; users think scores are on average {} points too high",
                    (-mean).round() as i64
                )
            } else {
                "calibration looks right".to_string()
            };
            (dimension, line)
        })
        .collect()
}
