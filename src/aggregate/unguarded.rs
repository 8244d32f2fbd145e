use super::Aggregate;
use crate::config::DelayRange;
use crate::types::{epoch_millis, Entry, Snapshot, WorkerStatus};
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Aggregate with no cross-field discipline. Fault injection only.
///
/// Each mutation sequence is decomposed into separate reads and writes with
/// jitter sleeps in between, so concurrent workers interleave inside the
/// sequence. Individual container operations are still serialized (Rust has
/// no safe unguarded container mutation), which means whole entries are
/// never lost; the observable corruption is in `counter` and in
/// `recorded_position`.
#[derive(Debug)]
pub struct UnsafeAggregate {
    log: Mutex<Vec<Entry>>,
    statuses: Mutex<HashMap<String, WorkerStatus>>,
    counter: AtomicU64,
    jitter: DelayRange,
    counter_jitter: DelayRange,
    rng: Mutex<StdRng>,
    started_at: Instant,
}

impl UnsafeAggregate {
    /// Create an empty aggregate with the given jitter windows.
    #[must_use]
    pub fn new(jitter: DelayRange, counter_jitter: DelayRange, seed: u64) -> Self {
        Self {
            log: Mutex::new(Vec::new()),
            statuses: Mutex::new(HashMap::new()),
            counter: AtomicU64::new(0),
            jitter,
            counter_jitter,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            started_at: Instant::now(),
        }
    }

    fn draw(&self, range: DelayRange) -> Duration {
        range.sample(&mut *self.rng.lock())
    }
}

#[async_trait]
impl Aggregate for UnsafeAggregate {
    fn register(&self, worker_id: &str) {
        self.statuses
            .lock()
            .insert(worker_id.to_string(), WorkerStatus::Pending);
    }

    async fn record_completion(&self, worker_id: &str, input: &str, output: &str) {
        // Snapshot of the log length; stale by the time the entry lands.
        let recorded_position = self.log.lock().len();

        // Preemption window between the read and the write.
        sleep(self.draw(self.jitter)).await;

        self.log.lock().push(Entry {
            worker_id: worker_id.to_string(),
            input: input.to_string(),
            output: output.to_string(),
            recorded_position,
            timestamp_ms: epoch_millis(),
        });

        // Non-atomic increment: read, stall, write back. Concurrent writers
        // overwrite each other and increments are lost.
        let seen = self.counter.load(Ordering::Relaxed);
        sleep(self.draw(self.counter_jitter)).await;
        self.counter.store(seen + 1, Ordering::Relaxed);

        self.statuses
            .lock()
            .insert(worker_id.to_string(), WorkerStatus::Completed);
    }

    fn collect(&self) -> Snapshot {
        // Three independent reads. No mutually consistent view exists.
        let entries = self.log.lock().clone();
        let counter = self.counter.load(Ordering::Relaxed);
        let statuses = self.statuses.lock().clone();
        Snapshot {
            entries,
            statuses,
            counter,
        }
    }

    fn started_at(&self) -> Instant {
        self.started_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_records_stay_consistent() {
        // Without concurrency there is nobody to interleave with, so even
        // the unguarded sequence produces a consistent aggregate.
        let aggregate = UnsafeAggregate::new(DelayRange::ZERO, DelayRange::ZERO, 42);
        for i in 0..4u32 {
            let id = format!("worker-{i}");
            aggregate.register(&id);
            aggregate.record_completion(&id, "in", "out").await;
        }

        let snapshot = aggregate.collect();
        assert_eq!(snapshot.entries.len(), 4);
        assert_eq!(snapshot.counter, 4);
        assert_eq!(snapshot.statuses.len(), 4);
        for (i, entry) in snapshot.entries.iter().enumerate() {
            assert_eq!(entry.recorded_position, i);
        }
    }

    #[tokio::test]
    async fn register_marks_pending() {
        let aggregate = UnsafeAggregate::new(DelayRange::ZERO, DelayRange::ZERO, 42);
        aggregate.register("critic");
        assert_eq!(
            aggregate.collect().statuses.get("critic"),
            Some(&WorkerStatus::Pending)
        );
    }
}
