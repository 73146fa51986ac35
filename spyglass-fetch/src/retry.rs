//! Retry policy and the per-call attempt state machine.
//!
//! ```text
//! Idle -> Attempting(0) -> Succeeded
//!                       -> Failed
//!                       -> BackingOff { next: 1, delay } -> Attempting(1) -> ...
//! ```
//!
//! Only server errors (5xx) and plain network failures back off and try
//! again, and only while attempts remain. Client errors, timeouts, decode
//! failures, and malformed requests end the call immediately.

use std::time::Duration;

/// Delay before the first retry.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(200);

/// Upper bound for any single backoff delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

// ============================================================================
// States and Outcomes
// ============================================================================

/// Where a single `request` call is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptState {
    /// Not started.
    Idle,
    /// Running the zero-based attempt `n`.
    Attempting(u32),
    /// Waiting `delay` before attempt `next`.
    BackingOff {
        /// Attempt index to run after the delay.
        next: u32,
        /// How long to wait.
        delay: Duration,
    },
    /// A response was decoded.
    Succeeded,
    /// The call ended with an error.
    Failed,
}

impl AttemptState {
    /// Returns true for `Succeeded` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// What one attempt produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 2xx with a decodable body.
    Success,
    /// Non-2xx status.
    Status(u16),
    /// Connection-level failure.
    Network,
    /// The attempt deadline elapsed or the transport cancelled.
    TimedOut,
    /// 2xx whose body did not decode.
    Decode,
    /// The request could not be built.
    Invalid,
}

// ============================================================================
// Retry Policy
// ============================================================================

/// Retry limit and backoff schedule for one call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retry_limit: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy with the default schedule.
    pub fn new(retry_limit: u32) -> Self {
        Self {
            retry_limit,
            base_delay: DEFAULT_BASE_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self::new(0)
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Sets the delay cap.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.retry_limit.saturating_add(1)
    }

    /// Delay before retry `retry` (1-based): `base * 2^(retry - 1)`, capped.
    pub fn delay_for_attempt(&self, retry: u32) -> Duration {
        2u32.checked_pow(retry.saturating_sub(1))
            .and_then(|factor| self.base_delay.checked_mul(factor))
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Returns true if `outcome` may be retried at all.
    pub fn is_retryable(outcome: AttemptOutcome) -> bool {
        match outcome {
            AttemptOutcome::Status(status) => status >= 500,
            AttemptOutcome::Network => true,
            AttemptOutcome::Success
            | AttemptOutcome::TimedOut
            | AttemptOutcome::Decode
            | AttemptOutcome::Invalid => false,
        }
    }

    /// The state a call starts in once it is issued.
    pub fn start(&self) -> AttemptState {
        AttemptState::Attempting(0)
    }

    /// Advances the state machine.
    ///
    /// `outcome` only matters while attempting. `Idle` and `BackingOff`
    /// advance unconditionally and terminal states stay put.
    pub fn transition(&self, state: AttemptState, outcome: AttemptOutcome) -> AttemptState {
        match state {
            AttemptState::Idle => self.start(),
            AttemptState::BackingOff { next, .. } => AttemptState::Attempting(next),
            AttemptState::Succeeded | AttemptState::Failed => state,
            AttemptState::Attempting(n) => {
                if outcome == AttemptOutcome::Success {
                    AttemptState::Succeeded
                } else if Self::is_retryable(outcome) && n < self.retry_limit {
                    let next = n + 1;
                    AttemptState::BackingOff {
                        next,
                        delay: self.delay_for_attempt(next),
                    }
                } else {
                    AttemptState::Failed
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(crate::settings::DEFAULT_RETRY_LIMIT)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_backoff() {
        let policy = RetryPolicy::default();

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(800));
        assert_eq!(policy.delay_for_attempt(4), Duration::from_millis(1600));
    }

    #[test]
    fn test_max_delay_cap() {
        let policy = RetryPolicy::new(40);

        assert_eq!(policy.delay_for_attempt(8), Duration::from_millis(25_600));
        assert_eq!(policy.delay_for_attempt(9), DEFAULT_MAX_DELAY);
        assert_eq!(policy.delay_for_attempt(20), DEFAULT_MAX_DELAY);
        // 2^40 overflows u32; still capped rather than panicking.
        assert_eq!(policy.delay_for_attempt(41), DEFAULT_MAX_DELAY);
    }

    #[test]
    fn test_server_error_backs_off_while_attempts_remain() {
        let policy = RetryPolicy::new(2);

        let state = policy.transition(AttemptState::Attempting(0), AttemptOutcome::Status(503));
        assert_eq!(
            state,
            AttemptState::BackingOff {
                next: 1,
                delay: Duration::from_millis(200)
            }
        );
        assert_eq!(policy.transition(state, AttemptOutcome::Success), AttemptState::Attempting(1));

        let state = policy.transition(AttemptState::Attempting(1), AttemptOutcome::Status(500));
        assert_eq!(
            state,
            AttemptState::BackingOff {
                next: 2,
                delay: Duration::from_millis(400)
            }
        );

        assert_eq!(
            policy.transition(AttemptState::Attempting(2), AttemptOutcome::Status(500)),
            AttemptState::Failed
        );
    }

    #[test]
    fn test_terminal_outcomes_never_retry() {
        let policy = RetryPolicy::new(5);

        for outcome in [
            AttemptOutcome::Status(400),
            AttemptOutcome::Status(404),
            AttemptOutcome::Status(429),
            AttemptOutcome::TimedOut,
            AttemptOutcome::Decode,
            AttemptOutcome::Invalid,
        ] {
            assert_eq!(
                policy.transition(AttemptState::Attempting(0), outcome),
                AttemptState::Failed,
                "{outcome:?}"
            );
        }
    }

    #[test]
    fn test_network_failure_retries() {
        let policy = RetryPolicy::new(1);
        assert!(matches!(
            policy.transition(AttemptState::Attempting(0), AttemptOutcome::Network),
            AttemptState::BackingOff { next: 1, .. }
        ));
        assert_eq!(
            policy.transition(AttemptState::Attempting(1), AttemptOutcome::Network),
            AttemptState::Failed
        );
    }

    #[test]
    fn test_no_retry_policy() {
        let policy = RetryPolicy::no_retry();
        assert_eq!(policy.max_attempts(), 1);
        assert_eq!(
            policy.transition(AttemptState::Attempting(0), AttemptOutcome::Status(500)),
            AttemptState::Failed
        );
    }

    #[test]
    fn test_success_and_terminal_states() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.transition(AttemptState::Idle, AttemptOutcome::Network), AttemptState::Attempting(0));
        assert_eq!(
            policy.transition(AttemptState::Attempting(1), AttemptOutcome::Success),
            AttemptState::Succeeded
        );
        assert!(AttemptState::Succeeded.is_terminal());
        assert_eq!(
            policy.transition(AttemptState::Failed, AttemptOutcome::Success),
            AttemptState::Failed
        );
    }
}
