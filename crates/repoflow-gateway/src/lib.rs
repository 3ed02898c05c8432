//! Webhook gateway
//!
//! The only public ingress. Verifies every webhook signature against the
//! shared secret, demultiplexes by GitHub event type, and fans the delivery
//! out to the owning workers; a delivery is only acknowledged once every
//! targeted worker has accepted the enqueue, so GitHub's retry covers a
//! down worker. Also aggregates the workers' stats into one dashboard and
//! fronts their UI pages behind HTTP basic auth.

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use state::{AppState, WorkerEndpoints};
