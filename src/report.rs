//! Consistency verification and trial reporting
//!
//! Race outcomes are data, never errors: the checks here quantify corruption
//! in a [`FinalState`] and, over repeated unguarded runs, its frequency.

use crate::error::HarnessError;
use crate::runner::Runner;
use crate::types::{FinalState, WorkerSpec, WorkerStatus};
use serde::Serialize;

/// One recorded-position mismatch found in the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PositionMismatch {
    /// Actual index of the entry in the log
    pub index: usize,
    /// Position the writer believed it would occupy
    pub recorded: usize,
}

/// Post-run consistency check of a [`FinalState`] against the launched
/// worker count.
#[derive(Debug, Clone, Serialize)]
pub struct ConsistencyReport {
    /// Number of workers the run launched
    pub expected_workers: usize,
    /// Entries observed in the log
    pub entries: usize,
    /// Final counter value
    pub counter: u64,
    /// Keys in the status map
    pub statuses_total: usize,
    /// Status entries that read `Completed`
    pub statuses_completed: usize,
    /// Increments the counter lost relative to the launched count
    pub lost_updates: u64,
    /// Entries whose recorded position disagrees with their final index
    pub position_mismatches: Vec<PositionMismatch>,
}

impl ConsistencyReport {
    /// Check `state` against the number of launched workers.
    #[must_use]
    pub fn check(state: &FinalState, expected_workers: usize) -> Self {
        let position_mismatches = state
            .entries
            .iter()
            .enumerate()
            .filter(|(index, entry)| entry.recorded_position != *index)
            .map(|(index, entry)| PositionMismatch {
                index,
                recorded: entry.recorded_position,
            })
            .collect();

        let statuses_completed = state
            .statuses
            .values()
            .filter(|status| **status == WorkerStatus::Completed)
            .count();

        Self {
            expected_workers,
            entries: state.entries.len(),
            counter: state.counter,
            statuses_total: state.statuses.len(),
            statuses_completed,
            lost_updates: (expected_workers as u64).saturating_sub(state.counter),
            position_mismatches,
        }
    }

    /// True when every observation matches the launched worker count.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.entries == self.expected_workers
            && self.counter == self.expected_workers as u64
            && self.statuses_total == self.expected_workers
            && self.statuses_completed == self.expected_workers
            && self.position_mismatches.is_empty()
    }

    /// Generate a text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Consistency Report ===\n\n");
        report.push_str(&format!("Expected workers: {}\n", self.expected_workers));
        report.push_str(&format!("Log entries: {}\n", self.entries));
        report.push_str(&format!(
            "Counter: {} (lost updates: {})\n",
            self.counter, self.lost_updates
        ));
        report.push_str(&format!(
            "Statuses: {} total, {} completed\n",
            self.statuses_total, self.statuses_completed
        ));
        report.push_str(&format!(
            "Position mismatches: {}\n",
            self.position_mismatches.len()
        ));
        for m in &self.position_mismatches {
            report.push_str(&format!(
                "  entry at index {} recorded position {}\n",
                m.index, m.recorded
            ));
        }

        report.push_str(&format!(
            "\n=== Result: {} ===\n",
            if self.passed() { "CONSISTENT" } else { "CORRUPTED" }
        ));

        report
    }
}

/// Outcome of a single unguarded trial.
#[derive(Debug, Clone, Serialize)]
pub struct TrialOutcome {
    /// Trial index, starting at zero
    pub trial: usize,
    /// Consistency check of that trial's final state
    pub report: ConsistencyReport,
}

/// Aggregated outcome of repeated unguarded runs.
///
/// Corruption is statistical: no single trial is required to corrupt, the
/// series quantifies how often it does.
#[derive(Debug, Clone, Serialize)]
pub struct TrialReport {
    /// Number of trials executed
    pub trials: usize,
    /// Workers launched per trial
    pub workers: usize,
    /// Trials whose consistency check failed
    pub corrupted: usize,
    /// Per-trial outcomes
    pub outcomes: Vec<TrialOutcome>,
}

impl TrialReport {
    /// Fraction of trials that corrupted, in [0, 1].
    #[must_use]
    pub fn corruption_rate(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.corrupted as f64 / self.trials as f64
    }

    /// Generate a text report
    #[must_use]
    pub fn generate_text(&self) -> String {
        let mut report = String::new();

        report.push_str("=== Trial Report ===\n\n");
        report.push_str(&format!("Trials: {}\n", self.trials));
        report.push_str(&format!("Workers per trial: {}\n", self.workers));
        report.push_str(&format!(
            "Corrupted: {}/{} ({:.0}%)\n",
            self.corrupted,
            self.trials,
            self.corruption_rate() * 100.0
        ));
        for outcome in &self.outcomes {
            report.push_str(&format!(
                "  trial {:>3}: counter {}, mismatches {}, {}\n",
                outcome.trial,
                outcome.report.counter,
                outcome.report.position_mismatches.len(),
                if outcome.report.passed() {
                    "consistent"
                } else {
                    "corrupted"
                }
            ));
        }

        report
    }
}

/// Run `trials` unguarded rounds and quantify corruption frequency.
pub async fn run_trials(
    runner: &Runner,
    specs: &[WorkerSpec],
    trials: usize,
) -> Result<TrialReport, HarnessError> {
    let mut outcomes = Vec::with_capacity(trials);
    let mut corrupted = 0;

    for trial in 0..trials {
        let state = runner.run_unsafe(specs).await?;
        let report = ConsistencyReport::check(&state, specs.len());
        if !report.passed() {
            corrupted += 1;
        }
        tracing::debug!(
            "trial {}: counter {}, mismatches {}",
            trial,
            report.counter,
            report.position_mismatches.len()
        );
        outcomes.push(TrialOutcome { trial, report });
    }

    Ok(TrialReport {
        trials,
        workers: specs.len(),
        corrupted,
        outcomes,
    })
}
