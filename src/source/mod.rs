//! Source adapter abstraction layer.
//!
//! This module defines the [`SourceAdapter`] trait, the common [`Resource`]
//! record, and the registry mapping a tracked item's `kind` string to the
//! adapter that handles it.  Concrete adapters live in sub-modules, one file
//! per source family:
//!
//! * [`feed`] — RSS feed catalog (`zimuzu`), the only source with stable
//!   server-side ids.
//! * [`catalog`] — HTML episode-list pages (`bilibili`, `iqiyi`).
//! * [`listing`] — JSON episode listing (`mgtv`).
//!
//! Adding a new source means implementing [`SourceAdapter`] in a new file
//! here and registering it in [`registry`] — the watch loop, dedup, and
//! notification plumbing are all source-agnostic.

mod catalog;
mod feed;
mod listing;

pub use catalog::CatalogSource;
pub use feed::FeedSource;
pub use listing::ListingSource;

use std::collections::HashMap;

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};

use crate::config::TrackedItem;
use crate::error::Result;

/// Desktop browser user-agent sent to sources that dislike bot traffic.
pub(crate) const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_14_6) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/75.0.3770.142 Safari/537.36";

/// One discovered episode/listing entry, normalised from any source.
///
/// `guid` must be stable across polls for the same underlying item — that is
/// what the seen-set dedups on.  Records are created fresh on every fetch
/// and never outlive one poll cycle; the owning [`TrackedItem`] is passed
/// alongside wherever both are needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Dedup identifier: the source's own id when it has one, otherwise a
    /// content hash of the title (see [`content_id`]).
    pub guid: String,
    /// Human-readable episode/listing title.
    pub title: String,
    /// Download link, for the sources that expose one.
    pub download: Option<String>,
}

/// Identifier for sources that provide none: hex of the first 8 bytes of
/// SHA-256 over the title text.
///
/// SHA-256 is fixed deliberately so identifiers stay stable across runs and
/// platforms.  If the title text itself changes, the record re-notifies —
/// an accepted risk of content-derived ids.
pub fn content_id(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(&hasher.finalize()[..8])
}

/// Capability implemented once per source kind.
///
/// `fetch_resources` does the network + parse work; `format_update` applies
/// the per-variant filtering and phrasing rules from [`crate::format`].
pub trait SourceAdapter: Send {
    /// The `kind` string tracked items use to select this adapter.
    fn kind(&self) -> &'static str;

    /// One GET against `item.resource_url` with this source's header set,
    /// parsed into records.  Non-2xx status and missing required fields are
    /// per-item errors; the caller skips the item and moves on.
    fn fetch_resources(&self, client: &Client, item: &TrackedItem) -> Result<Vec<Resource>>;

    /// Turn a batch of *new* (post-diff) records into notification strings.
    fn format_update(&self, item: &TrackedItem, new: &[Resource]) -> Vec<String>;
}

pub type Registry = HashMap<&'static str, Box<dyn SourceAdapter>>;

/// All built-in adapters, keyed by source kind.
pub fn registry() -> Registry {
    let adapters: Vec<Box<dyn SourceAdapter>> = vec![
        Box::new(FeedSource),
        Box::new(CatalogSource::bilibili()),
        Box::new(CatalogSource::iqiyi()),
        Box::new(ListingSource),
    ];
    adapters.into_iter().map(|a| (a.kind(), a)).collect()
}
