//! Deadline-bounded polling of remote jobs
//!
//! Both remote resources (deck generation and export) are watched with the
//! same loop shape: fetch status, decide, sleep, repeat until a terminal state
//! or until the deadline computed once at loop entry has passed.
//!
//! The decisions themselves are pure functions ([`evaluate_deck`],
//! [`evaluate_export`], [`export_wait_interval`]) so they can be tested without
//! a network.

use crate::client::{ApiClient, ApiResponse};
use crate::config::PollConfig;
use crate::error::{Error, RemoteError, Result};
use crate::retry::IsRetryable;
use crate::types::{Deck, ExportJob, JobStatus};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// Progress percentage from which exports are polled more tightly
pub const FAST_POLL_PROGRESS: f64 = 50.0;

/// Factor applied to the export interval once progress reaches [`FAST_POLL_PROGRESS`]
pub const FAST_POLL_FACTOR: f64 = 0.3;

/// Floor for the shortened export interval
pub const MIN_FAST_POLL_INTERVAL: Duration = Duration::from_millis(300);

/// What to do after looking at one status response
#[derive(Clone, Debug, PartialEq)]
pub enum PollDecision {
    /// The job finished successfully
    Succeeded,
    /// The job reported an error; stop polling
    Failed(String),
    /// Not terminal yet; check again after this long
    WaitFor(Duration),
}

/// Result of one iteration of [`poll_until`]
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome<T> {
    /// Terminal success with the final value
    Ready(T),
    /// Not done; sleep this long before the next check
    Pending(Duration),
}

/// Decide what a deck status response means
///
/// A deck is done only when it reports `complete` with a positive slide count
/// and every slide finished. A server-supplied `retry-after` takes precedence
/// over the configured interval.
pub fn evaluate_deck(deck: &Deck, retry_after: Option<Duration>, interval: Duration) -> PollDecision {
    match deck.status {
        JobStatus::Complete
            if deck.slides_count > 0 && deck.slides_complete >= deck.slides_count =>
        {
            PollDecision::Succeeded
        }
        JobStatus::Error => PollDecision::Failed(
            deck.error
                .clone()
                .unwrap_or_else(|| "deck generation failed".to_string()),
        ),
        _ => PollDecision::WaitFor(retry_after.unwrap_or(interval)),
    }
}

/// Decide what an export status response means
///
/// Either signal is enough for success: some exports publish the download URL
/// before the status flips to `complete`.
pub fn evaluate_export(job: &ExportJob, interval: Duration) -> PollDecision {
    if job.status == JobStatus::Complete || job.download_url.is_some() {
        return PollDecision::Succeeded;
    }
    if job.status == JobStatus::Error {
        return PollDecision::Failed(
            job.error
                .clone()
                .unwrap_or_else(|| "export failed".to_string()),
        );
    }
    PollDecision::WaitFor(export_wait_interval(job.progress, interval))
}

/// Wait before the next export check
///
/// From 50% progress on, the wait shrinks to `max(0.3s, interval * 0.3)`;
/// below that it is exactly `interval`.
pub fn export_wait_interval(progress: f64, interval: Duration) -> Duration {
    if progress >= FAST_POLL_PROGRESS {
        interval.mul_f64(FAST_POLL_FACTOR).max(MIN_FAST_POLL_INTERVAL)
    } else {
        interval
    }
}

/// Read a `retry-after` header given in (possibly fractional) seconds
///
/// Missing, negative or non-numeric values are ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();
    let secs: f64 = value.parse().ok()?;
    Duration::try_from_secs_f64(secs).ok()
}

/// Repeatedly run `check` until it is ready, fails, or the deadline passes
///
/// The deadline is `now + timeout`, computed once on entry and checked before
/// every iteration. Sleeps are cut short at the deadline, so a long
/// `retry-after` never pushes the timeout back. A timeout too large to be
/// represented as an instant means no deadline. `check` receives the wait that
/// was requested after the previous iteration (`initial_wait` on the first
/// call) so it can reuse it when a check fails transiently.
///
/// # Errors
/// Propagates the first error returned by `check`, or [`Error::Timeout`] once
/// the deadline has passed.
pub async fn poll_until<T, F, Fut>(
    operation: &str,
    timeout: Duration,
    initial_wait: Duration,
    mut check: F,
) -> Result<T>
where
    F: FnMut(Duration) -> Fut,
    Fut: Future<Output = Result<PollOutcome<T>>>,
{
    let deadline = Instant::now().checked_add(timeout);
    let mut last_wait = initial_wait;
    let mut attempt: u32 = 0;

    while deadline.is_none_or(|deadline| Instant::now() < deadline) {
        attempt += 1;
        match check(last_wait).await? {
            PollOutcome::Ready(value) => {
                debug!(operation, attempts = attempt, "poll reached terminal state");
                return Ok(value);
            }
            PollOutcome::Pending(wait) => {
                debug!(
                    operation,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    "waiting before next poll"
                );
                last_wait = wait;
                let remaining = match deadline {
                    Some(deadline) => wait.min(deadline.saturating_duration_since(Instant::now())),
                    None => wait,
                };
                tokio::time::sleep(remaining).await;
            }
        }
    }

    Err(Error::Timeout {
        operation: operation.to_string(),
        timeout,
    })
}

/// Classify the outcome of a status request
///
/// Returns `Ok(Some(response))` for a 2xx, `Ok(None)` for a transient failure
/// that was logged and should be retried, and `Err` for anything fatal.
fn transient_or_response(
    result: Result<ApiResponse>,
    operation: &str,
) -> Result<Option<ApiResponse>> {
    match result {
        Ok(response) if response.is_success() => Ok(Some(response)),
        Ok(response) => {
            warn!(
                operation,
                status = response.status.as_u16(),
                error = %response.error_message(),
                "status check failed, will retry"
            );
            Ok(None)
        }
        Err(e) if e.is_retryable() => {
            warn!(operation, error = %e, "status check failed, will retry");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Poll a deck until generation completes
///
/// # Errors
/// - [`RemoteError::DeckFailed`] if the deck reports `status=error`
/// - [`Error::Timeout`] if `polling.timeout` passes first
/// - [`Error::InvalidResponse`] if a 2xx body is not a deck
pub async fn wait_for_deck(client: &ApiClient, deck_id: &str, polling: &PollConfig) -> Result<Deck> {
    let interval = polling.deck_interval;
    poll_until("deck generation", polling.timeout, interval, move |_| {
        check_deck(client, deck_id, interval)
    })
    .await
}

async fn check_deck(
    client: &ApiClient,
    deck_id: &str,
    interval: Duration,
) -> Result<PollOutcome<Deck>> {
    let result = client.get_deck(deck_id).await;
    let retry_after = result
        .as_ref()
        .ok()
        .and_then(|response| parse_retry_after(&response.headers));

    let Some(response) = transient_or_response(result, "deck status")? else {
        return Ok(PollOutcome::Pending(retry_after.unwrap_or(interval)));
    };

    let deck: Deck = response.json()?;
    info!(
        deck_id,
        status = %deck.status,
        slides_complete = deck.slides_complete,
        slides_count = deck.slides_count,
        "deck status"
    );

    match evaluate_deck(&deck, retry_after, interval) {
        PollDecision::Succeeded => Ok(PollOutcome::Ready(deck)),
        PollDecision::Failed(message) => Err(RemoteError::DeckFailed {
            id: deck_id.to_string(),
            message,
        }
        .into()),
        PollDecision::WaitFor(wait) => Ok(PollOutcome::Pending(wait)),
    }
}

/// Poll an export job until it completes or publishes a download URL
///
/// # Errors
/// - [`RemoteError::ExportFailed`] if the job reports `status=error`
/// - [`Error::Timeout`] if `polling.timeout` passes first
/// - [`Error::InvalidResponse`] if a 2xx body is not an export job
pub async fn wait_for_export(
    client: &ApiClient,
    deck_id: &str,
    export_id: &str,
    polling: &PollConfig,
) -> Result<ExportJob> {
    let interval = polling.export_interval;
    poll_until("export", polling.timeout, interval, move |last_wait| {
        check_export(client, deck_id, export_id, interval, last_wait)
    })
    .await
}

async fn check_export(
    client: &ApiClient,
    deck_id: &str,
    export_id: &str,
    interval: Duration,
    last_wait: Duration,
) -> Result<PollOutcome<ExportJob>> {
    let result = client.get_export(deck_id, export_id).await;
    let Some(response) = transient_or_response(result, "export status")? else {
        return Ok(PollOutcome::Pending(last_wait));
    };

    let job: ExportJob = response.json()?;
    info!(
        deck_id,
        export_id,
        status = %job.status,
        progress = job.progress,
        "export status"
    );

    match evaluate_export(&job, interval) {
        PollDecision::Succeeded => Ok(PollOutcome::Ready(job)),
        PollDecision::Failed(message) => Err(RemoteError::ExportFailed {
            deck_id: deck_id.to_string(),
            export_id: export_id.to_string(),
            message,
        }
        .into()),
        PollDecision::WaitFor(wait) => Ok(PollOutcome::Pending(wait)),
    }
}
