//! Classification of transient failures
//!
//! The client never retries a remote job. The only place a failure is retried
//! is a single status check inside a polling loop: if the check itself failed
//! for a transient reason, the poller logs it and asks again after the current
//! interval.

use crate::error::Error;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, refused or reset connections) should return `true`.
/// Permanent failures (bad credentials, malformed responses, job errors) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the status check should be repeated
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Timeouts and connection failures are worth another status check
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // The service said the job failed; asking again will not change that
            Error::Remote(_) => false,
            Error::Timeout { .. } => false,
            Error::Download(_) => false,
            Error::InvalidResponse(_) => false,
            Error::Usage(_) | Error::Config { .. } => false,
            Error::Serialization(_) => false,
            Error::InvalidUrl(_) => false,
        }
    }
}
