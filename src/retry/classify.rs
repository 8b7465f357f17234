//! Retryability heuristic.
//!
//! An error is considered transient when its message, or the message of any
//! error in its source chain, contains one of the known transient markers.

use std::error::Error;
use std::sync::Arc;

/// Decides whether an error is worth another attempt.
pub type Classifier = Arc<dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync>;

const TRANSIENT_MARKERS: &[&str] = &[
    "timeout",
    "timed out",
    "temporar",
    "connection reset",
    "connection refused",
    "rate limit",
    "rate-limit",
    "too many requests",
    "throttl",
    "service unavailable",
    "service-unavailable",
    "429",
    "503",
    "504",
];

/// Case-insensitive marker match on a plain message.
pub fn is_transient_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    TRANSIENT_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Default classifier: inspects the error and its whole source chain.
pub fn is_transient(err: &(dyn Error + 'static)) -> bool {
    let mut current = Some(err);
    while let Some(e) = current {
        if is_transient_message(&e.to_string()) {
            return true;
        }
        current = e.source();
    }
    false
}

pub(crate) fn default_classifier() -> Classifier {
    Arc::new(is_transient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("{0}")]
    struct Plain(String);

    #[derive(Debug, Error)]
    #[error("request failed")]
    struct Wrapped(#[source] Plain);

    #[test]
    fn recognises_transient_markers() {
        for message in [
            "Connection reset by peer",
            "connection refused",
            "request TIMEOUT",
            "operation timed out",
            "temporarily unavailable",
            "Rate limit exceeded",
            "client is throttled",
            "HTTP 503 Service Unavailable",
            "status 429",
            "gateway returned 504",
        ] {
            assert!(is_transient_message(message), "{message}");
        }
    }

    #[test]
    fn permanent_errors_are_not_transient() {
        for message in ["invalid argument", "not found", "permission denied"] {
            assert!(!is_transient_message(message), "{message}");
        }
    }

    #[test]
    fn walks_the_source_chain() {
        let err = Wrapped(Plain("upstream timeout".to_string()));
        assert!(is_transient(&err));

        let err = Wrapped(Plain("bad input".to_string()));
        assert!(!is_transient(&err));
    }
}
