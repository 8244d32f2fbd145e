use crate::error::StateError;
use serde::{Deserialize, Serialize};

/// Worker lifecycle states. `Completed` is terminal; a worker is single-use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorkerState {
    Idle,
    Running,
    Completed,
}

/// Validates a state transition.
///
/// Illegal transitions return an error so callers can surface them. The
/// `strict-debug` feature panics instead, to catch harness bugs at the site.
pub fn validate_transition(from: WorkerState, to: WorkerState) -> Result<(), StateError> {
    if allowed(from, to) {
        Ok(())
    } else {
        #[cfg(feature = "strict-debug")]
        panic!("illegal state transition attempted: {:?} -> {:?}", from, to);

        #[cfg(not(feature = "strict-debug"))]
        Err(StateError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: WorkerState) -> Vec<WorkerState> {
    use WorkerState::*;
    match from {
        Idle => vec![Running],
        Running => vec![Completed],
        Completed => vec![],
    }
}

fn allowed(from: WorkerState, to: WorkerState) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}
