//! Racelab - shared-state synchronization harness
//!
//! Many concurrent workers each perform a simulated slow call and then
//! record exactly one completion into a shared aggregate. Two structurally
//! mirrored aggregate variants share one data model:
//! - [`SafeAggregate`] guards all fields with one coarse lock, so every
//!   mutation sequence and multi-field read is atomic
//! - [`UnsafeAggregate`] decomposes its mutations around jitter windows so
//!   lost counter updates and stale recorded positions manifest on demand
//!
//! The unguarded variant exists for fault injection and teaching; its
//! corruption is reported as data, never raised as an error.
//!
//! # Example
//!
//! ```rust,ignore
//! use racelab::{ConsistencyReport, RunConfig, Runner, WorkerSpec};
//!
//! # async fn example() -> Result<(), racelab::HarnessError> {
//! let runner = Runner::new(RunConfig::default());
//! let specs = vec![
//!     WorkerSpec::new("researcher", "collect sources"),
//!     WorkerSpec::new("writer", "draft the summary"),
//! ];
//!
//! let state = runner.run_safe(&specs).await?;
//! assert!(ConsistencyReport::check(&state, specs.len()).passed());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod slow_op;
pub mod state_machine;
pub mod types;
pub mod worker;

// Re-exports for convenience
pub use aggregate::{Aggregate, SafeAggregate, UnsafeAggregate};
pub use config::{DelayRange, RunConfig};
pub use error::{ConfigError, HarnessError, StateError};
pub use report::{run_trials, ConsistencyReport, PositionMismatch, TrialOutcome, TrialReport};
pub use runner::Runner;
pub use slow_op::{response_for, SimulatedCall, SlowOperation};
pub use state_machine::WorkerState;
pub use types::{Entry, FinalState, Snapshot, WorkerSpec, WorkerStatus};
pub use worker::Worker;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the harness
    pub use crate::{
        Aggregate, ConsistencyReport, DelayRange, FinalState, RunConfig, Runner, SafeAggregate,
        SlowOperation, UnsafeAggregate, WorkerSpec, WorkerStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
