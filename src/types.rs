//! Core types for the harness
//!
//! Defines the shared data model both aggregate variants operate on:
//! - Worker specifications and per-worker status
//! - Log entries with the position the writer believed it would occupy
//! - Point-in-time snapshots and the final state read back by the runner

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Specification for a single worker: identity plus the input it feeds the
/// slow operation. Ids must be unique within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSpec {
    /// Worker identity, used as the status map key
    pub id: String,
    /// Input handed to the slow operation
    pub input: String,
}

impl WorkerSpec {
    /// Create a new worker spec
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
        }
    }
}

/// Per-worker lifecycle status as recorded in the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerStatus {
    /// Registered but not yet recorded a completion
    Pending,
    /// Recorded its completion
    Completed,
}

/// One completed mutation recorded in the aggregate log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Worker that produced this entry
    pub worker_id: String,
    /// Input the worker was given
    pub input: String,
    /// Output of the slow operation
    pub output: String,
    /// Log index the worker believed this entry would occupy at the moment
    /// it read the log length. Under the safe variant this always equals the
    /// entry's final index; under the unguarded variant it may not.
    pub recorded_position: usize,
    /// Wall-clock time the entry was constructed, epoch milliseconds
    pub timestamp_ms: u64,
}

/// Point-in-time copy of all aggregate fields.
///
/// Whether the three fields are mutually consistent depends on how the copy
/// was taken: `SafeAggregate::snapshot` clones them in one critical section,
/// the unguarded read-back does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    /// Ordered log of completions
    pub entries: Vec<Entry>,
    /// Status per worker id
    pub statuses: HashMap<String, WorkerStatus>,
    /// Number of completed mutation sequences
    pub counter: u64,
}

/// Aggregate contents read back by the runner after the join barrier.
#[derive(Debug, Clone, Serialize)]
pub struct FinalState {
    /// Ordered log of completions, insertion order = completion order
    pub entries: Vec<Entry>,
    /// Status per worker id
    pub statuses: HashMap<String, WorkerStatus>,
    /// Number of completed mutation sequences
    pub counter: u64,
    /// Wall-clock duration from aggregate creation to read-back
    pub elapsed: Duration,
}

impl FinalState {
    /// Assemble the final state from a read-back snapshot.
    #[inline]
    #[must_use]
    pub fn from_snapshot(snapshot: Snapshot, elapsed: Duration) -> Self {
        Self {
            entries: snapshot.entries,
            statuses: snapshot.statuses,
            counter: snapshot.counter,
            elapsed,
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
pub(crate) fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worker_spec_new() {
        let spec = WorkerSpec::new("researcher", "collect sources");
        assert_eq!(spec.id, "researcher");
        assert_eq!(spec.input, "collect sources");
    }

    #[test]
    fn final_state_from_snapshot() {
        let snapshot = Snapshot {
            entries: Vec::new(),
            statuses: HashMap::new(),
            counter: 0,
        };
        let state = FinalState::from_snapshot(snapshot, Duration::from_millis(5));
        assert_eq!(state.counter, 0);
        assert_eq!(state.elapsed, Duration::from_millis(5));
    }
}
