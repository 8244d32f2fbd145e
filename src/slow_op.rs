//! Simulated slow external operation
//!
//! The only collaborator the harness depends on: an opaque, latency-injecting
//! call whose output is a deterministic function of its input. Tests inject
//! their own implementations; the core never assumes anything beyond the
//! trait contract.

use crate::config::DelayRange;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::time::sleep;

/// Maximum number of input characters echoed back in a response.
const RESPONSE_ECHO_LEN: usize = 50;

/// Opaque slow call performed by every worker before it touches shared state.
///
/// Implementations must block the calling task for their latency and must
/// not touch any shared harness state. Infallible; error injection is out of
/// scope.
#[async_trait]
pub trait SlowOperation: Send + Sync {
    /// Produce the response for `input` after the operation's latency.
    async fn call(&self, input: &str) -> String;
}

/// Simulated remote call with uniformly distributed latency.
///
/// Latency is drawn from a seeded RNG so a run's schedule is reproducible
/// from the configuration seed. The response echoes a truncated copy of the
/// input, so callers can assert on it.
#[derive(Debug)]
pub struct SimulatedCall {
    delay: DelayRange,
    rng: Mutex<StdRng>,
}

impl SimulatedCall {
    /// Create a simulated call with the given latency range and seed.
    #[must_use]
    pub fn new(delay: DelayRange, seed: u64) -> Self {
        Self {
            delay,
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

#[async_trait]
impl SlowOperation for SimulatedCall {
    async fn call(&self, input: &str) -> String {
        let delay = self.delay.sample(&mut *self.rng.lock());
        sleep(delay).await;
        response_for(input)
    }
}

/// Deterministic response text for `input`.
#[must_use]
pub fn response_for(input: &str) -> String {
    let echoed: String = input.chars().take(RESPONSE_ECHO_LEN).collect();
    format!("response to: {echoed}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_echoes_short_input() {
        assert_eq!(response_for("hello"), "response to: hello");
    }

    #[test]
    fn response_truncates_long_input() {
        let input = "x".repeat(200);
        let response = response_for(&input);
        assert_eq!(response.len(), "response to: ".len() + RESPONSE_ECHO_LEN);
    }

    #[tokio::test]
    async fn zero_delay_call_is_deterministic() {
        let op = SimulatedCall::new(DelayRange::ZERO, 42);
        assert_eq!(op.call("ping").await, "response to: ping");
        assert_eq!(op.call("ping").await, "response to: ping");
    }
}
