//! Error kinds for the watch loop.
//!
//! Every variant here is recoverable: errors are caught at the tracked-item
//! or cycle boundary, logged, and the loop moves on.  Nothing in this crate
//! treats a `WatchError` as fatal.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WatchError {
    /// The remote configuration document (or its local fallback) could not
    /// be fetched or did not have the expected shape.  The previous sleep
    /// interval stays in effect.
    #[error("configuration load failed: {0}")]
    ConfigLoad(String),

    /// A source request failed: connection error, timeout, or non-2xx
    /// status.  Skips the tracked item for this cycle.
    #[error("fetch failed: {0}")]
    Fetch(#[from] reqwest::Error),

    /// A fetched payload was missing a required field or did not parse.
    #[error("unexpected payload shape: {0}")]
    Parse(String),

    /// The webhook endpoint rejected a notice.  The notice is dropped, not
    /// retried.
    #[error("webhook rejected notice: {0}")]
    Notify(String),

    /// A tracked item names a source kind with no registered adapter.
    #[error("no adapter registered for source kind {0:?}")]
    UnknownKind(String),
}

pub type Result<T> = std::result::Result<T, WatchError>;
