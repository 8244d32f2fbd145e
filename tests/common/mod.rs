//! Shared stubs for integration tests.

// Not every test binary uses every stub.
#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use racelab::{Aggregate, SlowOperation, Snapshot, WorkerSpec};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Zero-delay stub: returns `<input>-done` immediately.
pub struct EchoOp;

#[async_trait]
impl SlowOperation for EchoOp {
    async fn call(&self, input: &str) -> String {
        format!("{input}-done")
    }
}

/// Fixed per-worker delays keyed by input; zero for inputs not listed.
pub struct FixedDelayOp {
    delays: HashMap<String, Duration>,
}

impl FixedDelayOp {
    pub fn new<I>(delays: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Duration)>,
    {
        Self {
            delays: delays
                .into_iter()
                .map(|(input, delay)| (input.to_string(), delay))
                .collect(),
        }
    }
}

#[async_trait]
impl SlowOperation for FixedDelayOp {
    async fn call(&self, input: &str) -> String {
        if let Some(delay) = self.delays.get(input) {
            sleep(*delay).await;
        }
        format!("{input}-done")
    }
}

/// Stub that raises an in-flight gauge when its call starts. The paired
/// [`GaugedAggregate`] lowers the gauge only after the worker's mutation
/// lands, so a nonzero gauge means some worker is still running.
pub struct InstrumentedOp {
    in_flight: Arc<AtomicUsize>,
    delay: Duration,
}

impl InstrumentedOp {
    pub fn new(in_flight: Arc<AtomicUsize>, delay: Duration) -> Self {
        Self { in_flight, delay }
    }
}

#[async_trait]
impl SlowOperation for InstrumentedOp {
    async fn call(&self, input: &str) -> String {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        sleep(self.delay).await;
        format!("{input}-done")
    }
}

/// Aggregate wrapper that lowers the in-flight gauge after each completion
/// and remembers the gauge value observed at the moment of final-state
/// capture.
pub struct GaugedAggregate<A> {
    inner: A,
    in_flight: Arc<AtomicUsize>,
    captured: Mutex<Option<usize>>,
}

impl<A> GaugedAggregate<A> {
    pub fn new(inner: A, in_flight: Arc<AtomicUsize>) -> Self {
        Self {
            inner,
            in_flight,
            captured: Mutex::new(None),
        }
    }

    /// Gauge value seen when `collect` ran; `None` before any capture.
    pub fn captured_in_flight(&self) -> Option<usize> {
        *self.captured.lock()
    }
}

#[async_trait]
impl<A: Aggregate> Aggregate for GaugedAggregate<A> {
    fn register(&self, worker_id: &str) {
        self.inner.register(worker_id);
    }

    async fn record_completion(&self, worker_id: &str, input: &str, output: &str) {
        self.inner.record_completion(worker_id, input, output).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    fn collect(&self) -> Snapshot {
        *self.captured.lock() = Some(self.in_flight.load(Ordering::SeqCst));
        self.inner.collect()
    }

    fn started_at(&self) -> Instant {
        self.inner.started_at()
    }
}

/// N unique worker specs with predictable ids and inputs.
pub fn roster(n: usize) -> Vec<WorkerSpec> {
    (0..n)
        .map(|i| WorkerSpec::new(format!("worker-{i}"), format!("input-{i}")))
        .collect()
}
