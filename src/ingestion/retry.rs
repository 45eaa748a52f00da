//! Retry decisions for a single source file.
//!
//! Per file the reader moves through
//! `PENDING -> ATTEMPTING -> (SUCCESS | FAILED)`; a failure with budget left goes back to
//! `PENDING` after the fixed delay, otherwise the file ends `ABORTED` (or is skipped when the
//! policy says so). The delay never grows between attempts.

use crate::config::RetryPolicy;
use std::time::Duration;

/// What to do after attempt number `attempt` (1-based) failed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RetryDecision {
    /// Wait, then make attempt `next_attempt`.
    RetryAfter { delay: Duration, next_attempt: u32 },
    /// The budget is spent.
    Exhausted,
}

/// Decide the follow-up to failed attempt `attempt` under `policy`.
#[must_use]
pub fn decide(policy: &RetryPolicy, attempt: u32) -> RetryDecision {
    if attempt < policy.attempts {
        RetryDecision::RetryAfter {
            delay: policy.delay(),
            next_attempt: attempt + 1,
        }
    } else {
        RetryDecision::Exhausted
    }
}

/// Block the calling thread for `delay`. Zero delays return immediately.
pub(crate) fn pause(delay: Duration) {
    if !delay.is_zero() {
        std::thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retries_until_the_budget_is_spent() {
        let policy = RetryPolicy::new(3, 0.5);
        assert_eq!(
            decide(&policy, 1),
            RetryDecision::RetryAfter {
                delay: Duration::from_millis(500),
                next_attempt: 2,
            }
        );
        assert_eq!(
            decide(&policy, 2),
            RetryDecision::RetryAfter {
                delay: Duration::from_millis(500),
                next_attempt: 3,
            }
        );
        assert_eq!(decide(&policy, 3), RetryDecision::Exhausted);
    }

    #[test]
    fn single_attempt_never_retries() {
        assert_eq!(decide(&RetryPolicy::new(1, 0.0), 1), RetryDecision::Exhausted);
    }
}
