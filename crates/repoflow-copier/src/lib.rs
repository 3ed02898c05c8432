//! Issue-copier worker
//!
//! Replicates issues from one source repository to target repositories
//! chosen by label, mirrors comments onto the copies, re-hosts third-party
//! images onto each target's `assets` branch, and qualifies bare `#n`
//! references so links resolve back to the source. Uniqueness keys in the
//! store make webhook re-delivery harmless.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod routing;
pub mod server;
pub mod service;
pub mod state;
pub mod transform;

pub use error::CopierError;
pub use routing::resolve_targets;
pub use service::{CopierGitHub, CopierService, CopyJob};
pub use state::AppState;
