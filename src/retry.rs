//! Retry logic with exponential backoff
//!
//! Used around blocking points that talk to the network through the extractor
//! (metadata queries). Delays grow exponentially and can be jittered so that
//! concurrent requests for the same host do not retry in lockstep.
//!
//! # Example
//!
//! ```no_run
//! use media_acquire::retry::{IsRetryable, with_retry};
//! use media_acquire::config::RetryConfig;
//!
//! #[derive(Debug)]
//! enum LookupError {
//!     Busy,
//!     Gone,
//! }
//!
//! impl std::fmt::Display for LookupError {
//!     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
//!         write!(f, "{:?}", self)
//!     }
//! }
//!
//! impl IsRetryable for LookupError {
//!     fn is_retryable(&self) -> bool {
//!         matches!(self, LookupError::Busy)
//!     }
//! }
//!
//! # async fn example() -> Result<(), LookupError> {
//! let config = RetryConfig::default();
//! let title = with_retry(&config, || async { Ok::<_, LookupError>("title") }).await?;
//! # Ok(())
//! # }
//! ```

use crate::config::RetryConfig;
use crate::error::Error;
use rand::Rng;
use std::future::Future;
use std::time::Duration;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, throttling, connection resets) return `true`.
/// Permanent failures (unavailable video, bad request, missing tool) return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

// Substrings the extractor prints for failures that usually clear on their own.
const TRANSIENT_MARKERS: &[&str] = &[
    "timed out",
    "timeout",
    "temporary failure",
    "connection reset",
    "connection refused",
    "http error 429",
    "http error 500",
    "http error 502",
    "http error 503",
    "http error 504",
];

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            Error::Network(e) => e.is_timeout() || e.is_connect(),
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::Interrupted
            ),
            Error::ExternalToolFailure { reason, .. } => {
                let reason = reason.to_ascii_lowercase();
                TRANSIENT_MARKERS.iter().any(|m| reason.contains(m))
            }
            Error::Config { .. }
            | Error::InvalidRequest(_)
            | Error::MetadataUnavailable { .. }
            | Error::NoResolutionsAvailable
            | Error::TranscodeToolMissing(_)
            | Error::ArtifactNotFound { .. }
            | Error::MoveFailure { .. }
            | Error::FetchAllCandidatesFailed { .. }
            | Error::ShuttingDown
            | Error::Serialization(_) => false,
        }
    }
}

/// Execute an async operation with exponential backoff retry logic
///
/// `config.max_attempts` counts retries, so the operation runs at most
/// `max_attempts + 1` times. Non-retryable errors are returned immediately.
pub async fn with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: IsRetryable + std::fmt::Display,
{
    let mut attempt = 0;
    let mut delay = config.initial_delay;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    tracing::info!(attempts = attempt + 1, "operation succeeded after retry");
                }
                return Ok(result);
            }
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                attempt += 1;

                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = config.max_attempts,
                    delay_ms = delay.as_millis(),
                    "operation failed, retrying"
                );

                let wait = if config.jitter {
                    add_jitter(delay)
                } else {
                    delay
                };
                tokio::time::sleep(wait).await;

                let next = Duration::from_secs_f64(delay.as_secs_f64() * config.backoff_multiplier);
                delay = next.min(config.max_delay);
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::debug!(error = %e, attempts = attempt + 1, "retry attempts exhausted");
                } else {
                    tracing::debug!(error = %e, "operation failed with non-retryable error");
                }
                return Err(e);
            }
        }
    }
}

/// Jitter uniformly between 0% and 100% of `delay`, giving `[delay, 2 * delay]`
fn add_jitter(delay: Duration) -> Duration {
    let mut rng = rand::thread_rng();
    let factor: f64 = rng.gen_range(0.0..=1.0);
    Duration::from_secs_f64(delay.as_secs_f64() * (1.0 + factor))
}
