//! Issue-scorer worker
//!
//! Scores issues and comments on the configured repositories along four
//! dimensions (format, content, clarity, actionability) plus an overall,
//! posts the score as a comment, and learns from user feedback: every
//! feedback item is analyzed into a (type, dimension, deviation) pattern,
//! and accumulated patterns condition future scoring prompts through an
//! insight block.

pub mod analyzer;
pub mod classify;
pub mod error;
pub mod handlers;
pub mod insights;
pub mod parse;
pub mod prompt;
pub mod routes;
pub mod server;
pub mod service;
pub mod state;

pub use analyzer::analyze_with_rules;
pub use classify::classify_issue;
pub use error::ScorerError;
pub use insights::build_insight_block;
pub use parse::parse_score_output;
pub use service::{ScoreJob, ScorerGitHub, ScorerService};
pub use state::AppState;
