//! Execution parameters
//!
//! One explicit struct passed into each use case at construction, so test
//! instances can be built independently with mock backends. No global
//! client or module-level configuration anywhere.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunable parameters for one orchestration setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutionParams {
    /// Classifications below this confidence are forced to `Unrecognized`
    pub routing_threshold: f64,
    /// Consecutive tool-call rounds before the dispatch loop fails
    pub tool_loop_max_iterations: usize,
    /// Overall deadline for one fan-out join, in milliseconds (0 = none)
    pub fan_out_timeout_ms: u64,
    /// Retries for retryable backend errors
    pub max_retries: u32,
    /// Base backoff between retries, doubled per attempt, in milliseconds
    pub retry_base_backoff_ms: u64,
}

impl Default for ExecutionParams {
    fn default() -> Self {
        Self {
            routing_threshold: 0.7,
            tool_loop_max_iterations: 5,
            fan_out_timeout_ms: 0,
            max_retries: 2,
            retry_base_backoff_ms: 250,
        }
    }
}

impl ExecutionParams {
    pub fn fan_out_timeout(&self) -> Option<Duration> {
        (self.fan_out_timeout_ms > 0).then(|| Duration::from_millis(self.fan_out_timeout_ms))
    }

    pub fn retry_base_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_base_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let params = ExecutionParams::default();
        assert_eq!(params.routing_threshold, 0.7);
        assert_eq!(params.tool_loop_max_iterations, 5);
        assert!(params.fan_out_timeout().is_none());
        assert_eq!(params.max_retries, 2);
    }

    #[test]
    fn nonzero_timeout_becomes_duration() {
        let params = ExecutionParams {
            fan_out_timeout_ms: 1500,
            ..ExecutionParams::default()
        };
        assert_eq!(params.fan_out_timeout(), Some(Duration::from_millis(1500)));
    }
}
