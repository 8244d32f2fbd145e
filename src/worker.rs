//! Worker task body
//!
//! One simulated concurrent task: await the slow operation, then record
//! exactly one completion against the aggregate the worker was bound to.

use crate::aggregate::Aggregate;
use crate::error::StateError;
use crate::slow_op::SlowOperation;
use crate::state_machine::{validate_transition, WorkerState};
use std::sync::Arc;

/// Single-use worker.
///
/// Lifecycle is `Idle -> Running -> Completed`, validated at each step; a
/// worker never transitions back and performs exactly one mutation sequence.
#[derive(Debug)]
pub struct Worker {
    id: String,
    input: String,
    state: WorkerState,
}

impl Worker {
    /// Create a worker in the `Idle` state.
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            input: input.into(),
            state: WorkerState::Idle,
        }
    }

    /// Worker identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current lifecycle state
    #[inline]
    #[must_use]
    pub fn state(&self) -> WorkerState {
        self.state
    }

    fn transition(&mut self, to: WorkerState) -> Result<(), StateError> {
        validate_transition(self.state, to)?;
        self.state = to;
        Ok(())
    }

    /// Execute the worker to completion against `aggregate`.
    ///
    /// Consumes the worker. The slow call happens entirely outside any
    /// aggregate locking; only the final bookkeeping touches shared state.
    pub async fn run<A: Aggregate>(
        mut self,
        op: Arc<dyn SlowOperation>,
        aggregate: Arc<A>,
    ) -> Result<WorkerState, StateError> {
        self.transition(WorkerState::Running)?;
        tracing::debug!("worker {} started on {:?}", self.id, self.input);

        let output = op.call(&self.input).await;

        aggregate
            .record_completion(&self.id, &self.input, &output)
            .await;
        self.transition(WorkerState::Completed)?;
        tracing::debug!("worker {} completed", self.id);

        Ok(self.state)
    }
}
