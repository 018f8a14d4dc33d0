//! Retry policy for transient model failures.
//!
//! Decides which [`AnalysisError`]s deserve another attempt and how long to
//! wait first. Server-provided waits share the ceiling of computed backoff.

use crate::error::AnalysisError;
use std::time::Duration;

/// Upper bound for any wait between attempts.
pub(crate) const MAX_DELAY: Duration = Duration::from_secs(30);

/// Whether another attempt at the same image could succeed.
///
/// Unreachable endpoints, timeouts, 429 and 5xx are transient. Other HTTP
/// statuses, undecodable responses, unreadable files and unparseable
/// replies fail the same way every time.
pub fn is_retryable(error: &AnalysisError) -> bool {
    match error {
        AnalysisError::Connect { .. } | AnalysisError::Timeout { .. } => true,
        AnalysisError::Remote {
            status_code: Some(code),
            ..
        } => *code == 429 || (500..=599).contains(code),
        AnalysisError::Remote {
            status_code: None, ..
        } => false,
        AnalysisError::Read { .. } | AnalysisError::Parse { .. } => false,
    }
}

/// Wait before retry number `attempt + 1`: `base_delay * 2^attempt`, capped
/// at [`MAX_DELAY`].
pub fn backoff_duration(attempt: u32, base_delay_ms: u64) -> Duration {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    Duration::from_millis(base_delay_ms.saturating_mul(factor)).min(MAX_DELAY)
}

/// Interpret a `Retry-After` header given in seconds, capped at [`MAX_DELAY`].
///
/// The HTTP-date form is not understood and yields `None`.
pub(crate) fn retry_after_from_header(value: &str) -> Option<Duration> {
    let secs: u64 = value.trim().parse().ok()?;
    Some(Duration::from_secs(secs).min(MAX_DELAY))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn status(code: u16) -> AnalysisError {
        AnalysisError::Remote {
            message: format!("HTTP {code}"),
            status_code: Some(code),
            retry_after: None,
        }
    }

    #[test]
    fn test_transient_failures() {
        assert!(is_retryable(&AnalysisError::Timeout { timeout_ms: 60_000 }));
        assert!(is_retryable(&AnalysisError::Connect {
            message: "tcp connect error".to_string(),
        }));
        assert!(is_retryable(&status(429)));
        assert!(is_retryable(&status(500)));
        assert!(is_retryable(&status(503)));
    }

    #[test]
    fn test_permanent_failures() {
        assert!(!is_retryable(&status(400)));
        assert!(!is_retryable(&status(401)));
        assert!(!is_retryable(&status(404)));
        assert!(!is_retryable(&AnalysisError::remote(
            "Azure OpenAI returned empty choices array"
        )));
        assert!(!is_retryable(&AnalysisError::Parse {
            message: "missing field `analysis`".to_string(),
        }));
        assert!(!is_retryable(&AnalysisError::Read {
            path: PathBuf::from("gone.jpg"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        }));
    }

    #[test]
    fn test_backoff_doubles_until_ceiling() {
        assert_eq!(backoff_duration(0, 500), Duration::from_millis(500));
        assert_eq!(backoff_duration(1, 500), Duration::from_millis(1000));
        assert_eq!(backoff_duration(3, 500), Duration::from_millis(4000));
        assert_eq!(backoff_duration(10, 500), MAX_DELAY);
        assert_eq!(backoff_duration(200, u64::MAX), MAX_DELAY);
    }

    #[test]
    fn test_retry_after_header() {
        assert_eq!(retry_after_from_header(" 7 "), Some(Duration::from_secs(7)));
        assert_eq!(retry_after_from_header("18446744073709551615"), Some(MAX_DELAY));
        assert_eq!(retry_after_from_header("Wed, 21 Oct 2015 07:28:00 GMT"), None);
        assert_eq!(retry_after_from_header("-1"), None);
    }
}
