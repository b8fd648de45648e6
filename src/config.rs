//! The remote configuration document.
//!
//! Tracked items and the sleep interval live in a JSON document fetched
//! from a URL, re-read at the start of every cycle so edits take effect
//! without a restart.  If the remote body does not have the expected shape
//! (a proxy error page, a half-written upload), the local fallback copy is
//! read instead.
//!
//! Wire shape:
//!
//! ```json
//! {
//!   "push": { "sleep": 600 },
//!   "items": [
//!     { "name": "...", "detailURL": "...", "resourceURL": "...",
//!       "pushURL": "...", "kind": "zimuzu" }
//!   ]
//! }
//! ```

use std::fs;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, WatchError};

/// Local copy consulted when the remote document is unusable.
pub const FALLBACK_PATH: &str = "default.conf";

/// One monitored show, replaced wholesale on every reload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TrackedItem {
    pub name: String,
    /// Human-facing page linked from every notice.
    #[serde(rename = "detailURL")]
    pub detail_url: String,
    /// Endpoint the source adapter polls.
    #[serde(rename = "resourceURL")]
    pub resource_url: String,
    /// Webhook that receives this item's notices.
    #[serde(rename = "pushURL")]
    pub push_url: String,
    /// Selects the source adapter (registry key).
    pub kind: String,
}

#[derive(Debug, Clone, Deserialize)]
struct PushSettings {
    sleep: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    push: PushSettings,
    pub items: Vec<TrackedItem>,
}

impl Config {
    /// Seconds to sleep between cycles.
    pub fn sleep_secs(&self) -> u64 {
        self.push.sleep
    }
}

/// Parse a configuration document body.  Pure — no I/O.
pub fn parse(text: &str) -> Result<Config> {
    serde_json::from_str(text).map_err(|e| WatchError::ConfigLoad(format!("bad document: {e}")))
}

/// Fetch and parse the remote document, falling back to [`FALLBACK_PATH`]
/// when the remote body has the wrong shape.  A network failure is not
/// recovered here — the watcher logs it and retries next cycle.
pub fn load(client: &Client, url: &str) -> Result<Config> {
    let text = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text())
        .map_err(|e| WatchError::ConfigLoad(format!("fetch {url}: {e}")))?;

    match parse(&text) {
        Ok(config) => Ok(config),
        Err(err) => {
            warn!("remote configuration unusable ({err}), reading {FALLBACK_PATH}");
            let local = fs::read_to_string(FALLBACK_PATH)
                .map_err(|e| WatchError::ConfigLoad(format!("fallback {FALLBACK_PATH}: {e}")))?;
            parse(&local)
        }
    }
}
