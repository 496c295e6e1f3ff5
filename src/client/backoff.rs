//! Retry policy helpers: transient-error classification and capped
//! exponential backoff.

use crate::Error;
use std::time::Duration;

/// Delay before retry number `attempt` (1-based attempt that just failed).
///
/// base * 2^(attempt-1), capped.
pub(crate) fn delay_for_attempt(base: Duration, cap: Duration, attempt: u32) -> Duration {
    let base_ms = base.as_millis() as u64;
    let cap_ms = cap.as_millis() as u64;
    let exp = attempt.saturating_sub(1).min(16);
    Duration::from_millis(base_ms.saturating_mul(1u64 << exp).min(cap_ms))
}

/// Only per-attempt timeouts and network connectivity failures are worth
/// retrying. Rate limits, API errors, and malformed replies surface
/// immediately.
pub(crate) fn is_transient(err: &Error) -> bool {
    matches!(
        err,
        Error::Timeout { .. } | Error::ServiceUnavailable { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorContext;

    #[test]
    fn test_backoff_doubles_up_to_cap() {
        let base = Duration::from_millis(1_000);
        let cap = Duration::from_millis(10_000);

        assert_eq!(delay_for_attempt(base, cap, 1), Duration::from_millis(1_000));
        assert_eq!(delay_for_attempt(base, cap, 2), Duration::from_millis(2_000));
        assert_eq!(delay_for_attempt(base, cap, 3), Duration::from_millis(4_000));
        assert_eq!(delay_for_attempt(base, cap, 4), Duration::from_millis(8_000));
        // Capped from here on
        assert_eq!(delay_for_attempt(base, cap, 5), Duration::from_millis(10_000));
        assert_eq!(delay_for_attempt(base, cap, 30), Duration::from_millis(10_000));
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(&Error::timeout("t", ErrorContext::new())));
        assert!(is_transient(&Error::service_unavailable(
            "connect refused",
            ErrorContext::new()
        )));
        assert!(!is_transient(&Error::rate_limited("429", ErrorContext::new())));
        assert!(!is_transient(&Error::api(500, "boom", ErrorContext::new())));
        assert!(!is_transient(&Error::invalid_response(
            "bad json",
            ErrorContext::new()
        )));
    }
}
