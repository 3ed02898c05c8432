//! PR-review worker
//!
//! Accepts `pull_request` webhooks, gates them against the configured
//! triggers, and drives each accepted PR through a durable review task:
//! fetch the diff, build a prompt, run the AI CLI, post the review as a PR
//! comment. One task per (repo, pr); re-deliveries collapse onto the live
//! task and `synchronize` events revive finished ones.

pub mod error;
pub mod gate;
pub mod handlers;
pub mod prompt;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;

pub use error::ReviewError;
pub use gate::{gate_event, GateDecision};
pub use service::{ReviewGitHub, ReviewJob, ReviewService};
pub use state::AppState;
