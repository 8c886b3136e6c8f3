//! Bounded retry for telemetry reads.
//!
//! Amplifier telemetry occasionally returns a transient RPC failure while the
//! card is settling. Reads of that kind go through [`retry_bounded`]; writes
//! never do. Exhausting the budget returns the last error unchanged.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::config::defaults;
use crate::error::WdmResult;

/// Attempt budget and pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(defaults::TELEMETRY_RETRIES, Duration::ZERO)
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are used up.
///
/// `op` receives the 1-based attempt number.
pub fn retry_bounded<T, F>(operation: &str, policy: RetryPolicy, mut op: F) -> WdmResult<T>
where
    F: FnMut(u32) -> WdmResult<T>,
{
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                warn!(
                    operation = %operation,
                    attempt = attempt,
                    max_attempts = policy.max_attempts,
                    "Attempt failed, retrying: {}",
                    e
                );
                if !policy.delay.is_zero() {
                    thread::sleep(policy.delay);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::WdmError;

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = retry_bounded("read", RetryPolicy::default(), |attempt| {
            calls += 1;
            if attempt < 3 {
                Err(WdmError::rpc("read", "busy", ""))
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(result.unwrap(), 3);
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let mut calls = 0;
        let result: WdmResult<()> = retry_bounded("read", RetryPolicy::default(), |attempt| {
            calls += 1;
            Err(WdmError::rpc("read", format!("attempt {}", attempt), ""))
        });
        assert_eq!(calls, 10);
        assert!(result.unwrap_err().to_string().contains("attempt 10"));
    }

    #[test]
    fn test_non_retryable_not_retried() {
        let mut calls = 0;
        let result: WdmResult<()> = retry_bounded("read", RetryPolicy::default(), |_| {
            calls += 1;
            Err(WdmError::validation("module", "3"))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_policy_floor() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts, 1);
    }
}
