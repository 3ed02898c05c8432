//! Webhook gating
//!
//! Decides whether a `pull_request` event becomes a review task. Pure over
//! (event, config) so every branch is unit-testable.

use repoflow_config::ReviewConfig;
use repoflow_github::PullRequestEvent;

/// Why an event was or was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// Enqueue a review
    Accept,
    /// The action is not in the configured triggers
    UntriggeredAction,
    /// Draft PRs are skipped
    Draft,
    /// Already reviewed and this is not a synchronize
    AlreadyLabeled,
}

impl GateDecision {
    /// Whether the event passes the gate
    pub fn is_accept(&self) -> bool {
        matches!(self, GateDecision::Accept)
    }

    /// Short reason string for responses and logs
    pub fn reason(&self) -> &'static str {
        match self {
            GateDecision::Accept => "accepted",
            GateDecision::UntriggeredAction => "action not in triggers",
            GateDecision::Draft => "draft PR skipped",
            GateDecision::AlreadyLabeled => "already reviewed",
        }
    }
}

/// Gate one `pull_request` event
pub fn gate_event(event: &PullRequestEvent, config: &ReviewConfig) -> GateDecision {
    if !config.triggers.iter().any(|t| t == &event.action) {
        return GateDecision::UntriggeredAction;
    }
    if config.skip_draft && event.pull_request.draft {
        return GateDecision::Draft;
    }
    // a labeled PR was reviewed before; only new pushes warrant a re-run
    if event.pull_request.has_label(&config.auto_label_name) && event.action != "synchronize" {
        return GateDecision::AlreadyLabeled;
    }
    GateDecision::Accept
}
