//! Error types for deckgen
//!
//! This module provides the error taxonomy for the client:
//! - Usage and configuration errors raised before any request is sent
//! - Remote errors (non-2xx on create/start calls, `status=error` on a job)
//! - Poll deadline timeouts
//! - Download errors (bad final status, redirect problems, missing URL)
//! - Exit code and machine-readable code mapping for the binary

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for deckgen operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for deckgen
///
/// Every fatal condition in the create → poll → export → download flow maps to
/// one of these variants. Transient poll failures are not represented here;
/// the poller logs and retries them without surfacing an error.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid invocation (e.g. empty prompt)
    #[error("usage error: {0}")]
    Usage(String),

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// The remote service rejected a call or reported a failed job
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    /// A polling loop reached its deadline without a terminal state
    #[error("timed out after {}s waiting for {operation}", .timeout.as_secs_f64())]
    Timeout {
        /// What was being waited for (e.g. "deck generation")
        operation: String,
        /// The configured deadline
        timeout: Duration,
    },

    /// Artifact download error
    #[error("download error: {0}")]
    Download(#[from] DownloadError),

    /// A successful response whose body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL could not be parsed or joined
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Errors reported by (or about) the remote service
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A create or start call returned a non-2xx status
    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        /// The call that failed (e.g. "create deck")
        operation: String,
        /// HTTP status code returned by the service
        status: u16,
        /// Error message extracted from the response body
        message: String,
    },

    /// The deck reported `status=error`
    #[error("deck {id} failed: {message}")]
    DeckFailed {
        /// The deck id
        id: String,
        /// Error message reported by the service
        message: String,
    },

    /// The export job reported `status=error`
    #[error("export {export_id} of deck {deck_id} failed: {message}")]
    ExportFailed {
        /// The deck id the export belongs to
        deck_id: String,
        /// The export id
        export_id: String,
        /// Error message reported by the service
        message: String,
    },
}

/// Artifact download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    /// Final response in the redirect chain was not 200
    #[error("HTTP {status} downloading {url}")]
    HttpStatus {
        /// The URL that returned the status
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// A redirect response without a usable `Location` header
    #[error("redirect {status} from {url} has no Location header")]
    MissingLocation {
        /// The URL that returned the redirect
        url: String,
        /// The redirect status code
        status: u16,
    },

    /// The redirect chain exceeded the hop limit
    #[error("more than {limit} redirects starting at {url}")]
    TooManyRedirects {
        /// The URL the download started from
        url: String,
        /// The hop limit
        limit: usize,
    },

    /// The export completed without a download URL
    #[error("export {export_id} of deck {deck_id} completed without a download URL")]
    MissingDownloadUrl {
        /// The deck id
        deck_id: String,
        /// The export id
        export_id: String,
    },

    /// The destination path cannot hold a file
    #[error("invalid destination {}: {reason}", .path.display())]
    InvalidDestination {
        /// The rejected path
        path: PathBuf,
        /// Why the path was rejected
        reason: String,
    },
}

/// Map errors to process exit codes and machine-readable codes
///
/// The binary uses this to pick its exit status and to tag the final
/// diagnostic line.
pub trait ToExitCode {
    /// Process exit code for this error (never 0)
    fn exit_code(&self) -> i32;

    /// Machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToExitCode for Error {
    fn exit_code(&self) -> i32 {
        match self {
            // 2 - caller mistakes, nothing was sent to the service
            Error::Usage(_) | Error::Config { .. } => 2,
            // 1 - everything that happened during the run
            Error::Remote(_)
            | Error::Timeout { .. }
            | Error::Download(_)
            | Error::InvalidResponse(_)
            | Error::Network(_)
            | Error::Io(_)
            | Error::Serialization(_)
            | Error::InvalidUrl(_) => 1,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Usage(_) => "usage_error",
            Error::Config { .. } => "config_error",
            Error::Remote(e) => match e {
                RemoteError::Api { .. } => "api_error",
                RemoteError::DeckFailed { .. } => "deck_failed",
                RemoteError::ExportFailed { .. } => "export_failed",
            },
            Error::Timeout { .. } => "timeout",
            Error::Download(e) => match e {
                DownloadError::HttpStatus { .. } => "download_http_status",
                DownloadError::MissingLocation { .. } => "redirect_without_location",
                DownloadError::TooManyRedirects { .. } => "too_many_redirects",
                DownloadError::MissingDownloadUrl { .. } => "missing_download_url",
                DownloadError::InvalidDestination { .. } => "invalid_destination",
            },
            Error::InvalidResponse(_) => "invalid_response",
            Error::Network(_) => "network_error",
            Error::Io(_) => "io_error",
            Error::Serialization(_) => "serialization_error",
            Error::InvalidUrl(_) => "invalid_url",
        }
    }
}

impl Error {
    /// Create a configuration error tied to a key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}
