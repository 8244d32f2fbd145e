//! Shared aggregate state and its two variants
//!
//! One data model, two disciplines:
//! - [`SafeAggregate`]: every mutation and multi-field read is one critical
//!   section behind a single coarse lock
//! - [`UnsafeAggregate`]: mutation sequences are decomposed into separate
//!   reads and writes with jitter in between; used only for fault injection

mod safe;
mod unguarded;

pub use safe::SafeAggregate;
pub use unguarded::UnsafeAggregate;

use crate::types::Snapshot;
use async_trait::async_trait;
use std::time::Instant;

/// Common surface both aggregate variants expose to the worker and runner.
#[async_trait]
pub trait Aggregate: Send + Sync {
    /// Register a worker as `Pending`. Called by the runner for every worker
    /// before anything is spawned.
    fn register(&self, worker_id: &str);

    /// Record one completed mutation sequence: append a log entry, bump the
    /// counter, mark the worker `Completed`.
    async fn record_completion(&self, worker_id: &str, input: &str, output: &str);

    /// Read back all fields for final-state capture. Whether the returned
    /// copy is mutually consistent depends on the variant.
    fn collect(&self) -> Snapshot;

    /// Creation time of the aggregate.
    fn started_at(&self) -> Instant;
}
