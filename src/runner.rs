//! Run orchestration
//!
//! Validates worker specs, constructs the aggregate variant, launches one
//! tokio task per worker, enforces the join barrier, and reads back the
//! final state. The runner owns the aggregate's lifetime; workers only hold
//! shared references for the duration of their own execution.

use crate::aggregate::{Aggregate, SafeAggregate, UnsafeAggregate};
use crate::config::RunConfig;
use crate::error::{ConfigError, HarnessError, StateError};
use crate::slow_op::{SimulatedCall, SlowOperation};
use crate::state_machine::WorkerState;
use crate::types::{FinalState, WorkerSpec};
use crate::worker::Worker;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Launches workers against an aggregate variant and collects [`FinalState`].
pub struct Runner {
    config: RunConfig,
    op: Arc<dyn SlowOperation>,
}

impl Runner {
    /// Runner backed by the simulated slow call derived from `config`.
    #[must_use]
    pub fn new(config: RunConfig) -> Self {
        let op = Arc::new(SimulatedCall::new(config.latency, config.seed));
        Self { config, op }
    }

    /// Runner with an injected slow operation. Tests substitute their stubs
    /// here without touching core logic.
    #[must_use]
    pub fn with_operation(config: RunConfig, op: Arc<dyn SlowOperation>) -> Self {
        Self { config, op }
    }

    /// The configuration this runner was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run all workers concurrently against a fresh [`SafeAggregate`] and
    /// read back a mutually consistent snapshot.
    pub async fn run_safe(&self, specs: &[WorkerSpec]) -> Result<FinalState, HarnessError> {
        self.run_with(specs, Arc::new(SafeAggregate::new())).await
    }

    /// Run all workers concurrently against a fresh [`UnsafeAggregate`] and
    /// read back whatever the raw fields contain.
    pub async fn run_unsafe(&self, specs: &[WorkerSpec]) -> Result<FinalState, HarnessError> {
        let aggregate = Arc::new(UnsafeAggregate::new(
            self.config.jitter,
            self.config.counter_jitter,
            self.config.seed,
        ));
        self.run_with(specs, aggregate).await
    }

    /// Safe-but-slow baseline: workers awaited one after another against a
    /// [`SafeAggregate`]. Exists for wall-clock comparison with the parallel
    /// runs; completion order equals submission order.
    pub async fn run_sequential(&self, specs: &[WorkerSpec]) -> Result<FinalState, HarnessError> {
        validate_specs(specs)?;

        let aggregate = Arc::new(SafeAggregate::new());
        for spec in specs {
            aggregate.register(&spec.id);
        }
        tracing::info!("running {} workers sequentially", specs.len());

        for spec in specs {
            let worker = Worker::new(&spec.id, &spec.input);
            worker
                .run(Arc::clone(&self.op), Arc::clone(&aggregate))
                .await?;
        }

        let elapsed = aggregate.started_at().elapsed();
        Ok(FinalState::from_snapshot(aggregate.collect(), elapsed))
    }

    /// Run all workers concurrently against a caller-supplied aggregate.
    ///
    /// This is the generic entry point the variant methods delegate to; it
    /// also lets tests run isolated or instrumented aggregate instances.
    pub async fn run_with<A: Aggregate + 'static>(
        &self,
        specs: &[WorkerSpec],
        aggregate: Arc<A>,
    ) -> Result<FinalState, HarnessError> {
        validate_specs(specs)?;

        for spec in specs {
            aggregate.register(&spec.id);
        }
        tracing::info!("launching {} workers", specs.len());

        let handles: Vec<_> = specs
            .iter()
            .map(|spec| {
                let worker = Worker::new(&spec.id, &spec.input);
                tokio::spawn(worker.run(Arc::clone(&self.op), Arc::clone(&aggregate)))
            })
            .collect();

        self.join_all(handles).await?;

        // Read-back happens strictly after the join barrier.
        let elapsed = aggregate.started_at().elapsed();
        tracing::info!("all workers joined after {:?}", elapsed);
        Ok(FinalState::from_snapshot(aggregate.collect(), elapsed))
    }

    /// Join barrier: wait for every launched worker, optionally bounded by
    /// the configured timeout. A fixed sleep is never a substitute; state is
    /// read only once every handle has resolved.
    async fn join_all(
        &self,
        handles: Vec<JoinHandle<Result<WorkerState, StateError>>>,
    ) -> Result<(), HarnessError> {
        let barrier = async {
            for handle in handles {
                let state = handle
                    .await
                    .map_err(|e| HarnessError::Internal(e.to_string()))??;
                debug_assert_eq!(state, WorkerState::Completed);
            }
            Ok::<(), HarnessError>(())
        };

        match self.config.join_timeout {
            Some(limit) => join_with_timeout(limit, barrier).await,
            None => barrier.await,
        }
    }
}

async fn join_with_timeout(
    limit: Duration,
    barrier: impl std::future::Future<Output = Result<(), HarnessError>>,
) -> Result<(), HarnessError> {
    match tokio::time::timeout(limit, barrier).await {
        Ok(result) => result,
        Err(_) => {
            // In-flight workers are abandoned; the slow call is modeled as
            // uninterruptible, so no cancellation is attempted.
            tracing::warn!("join barrier timed out after {:?}", limit);
            Err(HarnessError::Timeout { waited: limit })
        }
    }
}

fn validate_specs(specs: &[WorkerSpec]) -> Result<(), ConfigError> {
    if specs.is_empty() {
        return Err(ConfigError::NoWorkers);
    }
    let mut seen = HashSet::with_capacity(specs.len());
    for spec in specs {
        if !seen.insert(spec.id.as_str()) {
            return Err(ConfigError::DuplicateWorkerId(spec.id.clone()));
        }
    }
    Ok(())
}
