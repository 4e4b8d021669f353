use std::time::Duration;

use http::Method;

use crate::ErrorKind;

/// An immutable retry configuration.
///
/// `delay_for` computes the wait *before* the next attempt as
/// `initial_delay * round(backoff_multiplier ^ attempt)`, capped at
/// `max_delay`. The multiplier power is rounded to an integer before the
/// multiplication; callers depend on the resulting step-shaped delay curve,
/// so keep that order.
///
/// Invariants expected from custom policies: `max_attempts >= 1` and
/// `backoff_multiplier >= 1.0`. `delay_for` clamps the multiplier so a
/// misconfigured policy still yields non-decreasing delays.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one.
    pub max_attempts: u32,
    /// Wait before the second attempt.
    pub initial_delay: Duration,
    /// Growth factor applied per attempt.
    pub backoff_multiplier: f64,
    /// Ceiling for any single wait.
    pub max_delay: Duration,
    /// Error kinds that are worth another attempt. Everything else fails the
    /// call immediately.
    pub retryable_errors: Vec<ErrorKind>,
}

impl RetryPolicy {
    /// Preset for operations that must succeed if at all possible, e.g.
    /// token refresh or checkout confirmation.
    pub fn critical() -> Self {
        RetryPolicy {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            retryable_errors: vec![
                ErrorKind::BadConnection,
                ErrorKind::Server,
                ErrorKind::Cancelled,
            ],
        }
    }

    /// Preset for background data fetches. This is the default for GET-class
    /// requests.
    pub fn data_fetch() -> Self {
        RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 1.5,
            max_delay: Duration::from_secs(5),
            retryable_errors: vec![
                ErrorKind::BadConnection,
                ErrorKind::Server,
                ErrorKind::Cancelled,
            ],
        }
    }

    /// Preset for user-facing mutations. One quick retry, and cancellations
    /// are honoured rather than retried.
    pub fn interactive() -> Self {
        RetryPolicy {
            max_attempts: 2,
            initial_delay: Duration::from_millis(500),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(2),
            retryable_errors: vec![ErrorKind::BadConnection, ErrorKind::Server],
        }
    }

    /// Preset that disables retries entirely.
    pub fn none() -> Self {
        RetryPolicy {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_delay: Duration::ZERO,
            retryable_errors: Vec::new(),
        }
    }

    /// Picks the default policy for a request verb.
    ///
    /// GET-class requests get [`data_fetch`](Self::data_fetch), mutating
    /// verbs (POST/PUT/PATCH) get [`interactive`](Self::interactive),
    /// DELETE gets [`none`](Self::none), and anything else falls back to
    /// [`data_fetch`](Self::data_fetch).
    pub fn for_method(method: &Method) -> Self {
        match method.as_str().to_ascii_uppercase().as_str() {
            "GET" => RetryPolicy::data_fetch(),
            "POST" | "PUT" | "PATCH" => RetryPolicy::interactive(),
            "DELETE" => RetryPolicy::none(),
            _ => RetryPolicy::data_fetch(),
        }
    }

    /// Whether a failure of the given kind should be attempted again.
    pub fn is_retryable(&self, kind: ErrorKind) -> bool {
        self.retryable_errors.contains(&kind)
    }

    /// Wait before attempt `attempt_index + 2`, i.e. `delay_for(0)` is the
    /// pause between the first and second attempt.
    pub fn delay_for(&self, attempt_index: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .max(1.0)
            .powi(attempt_index as i32)
            .round();
        // f64 -> u32 casts saturate, so a runaway exponent degrades to the
        // max_delay cap instead of wrapping.
        self.initial_delay
            .saturating_mul(factor as u32)
            .min(self.max_delay)
    }
}

/// Default retry eligibility when the caller neither opts in nor out:
/// only GET-class requests are retried.
pub fn retries_by_default(method: &Method) -> bool {
    method.as_str().eq_ignore_ascii_case("GET")
}
