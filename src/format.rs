//! Notification phrasing rules.
//!
//! Shared policy with per-source overrides: a batch of new records larger
//! than the source's collapse threshold becomes one summary notice (a season
//! drop would otherwise flood the webhook), anything smaller is formatted
//! record by record.  Notices use Slack's `<url|label>` link syntax, which
//! is what the webhook consumer renders.

use std::sync::LazyLock;

use regex::Regex;

use crate::config::TrackedItem;
use crate::source::Resource;

/// Titles carrying this marker are preview/trailer entries, never notified.
pub const TRAILER_MARKER: &str = "预告";

/// Batches strictly larger than this collapse into one summary notice.
pub const COLLAPSE_THRESHOLD: usize = 3;

/// The JSON listing source updates in larger steady batches; it collapses
/// one record later.
pub const LISTING_COLLAPSE_THRESHOLD: usize = 4;

/// Trailing season/episode marker: word/dot/space run followed directly by
/// `S<digits>E<digits>`, as scene-release titles are written.
static SEASON_EPISODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\w[\w. ]*?)(S\d+E\d+)").expect("hardcoded pattern"));

/// Single summary notice for a flood of new records: names only the tracked
/// item and its detail page, individual titles are dropped.
pub fn collapse_notice(item: &TrackedItem) -> String {
    format!(
        "\"{}\" has multiple updates <{}|details>",
        item.name, item.detail_url
    )
}

/// Feed-style phrasing for one record.
///
/// Best effort: when the title carries an `S01E02`-style marker, the leading
/// part is cleaned (dots to spaces) and the notice links a `http://` +
/// raw-title "file" URL — a cosmetic quirk kept from the webhook consumer's
/// expectations, not a resolvable link.  Otherwise the raw title is used.
fn feed_notice(item: &TrackedItem, res: &Resource) -> String {
    match SEASON_EPISODE.captures(&res.title) {
        Some(caps) => {
            let cleaned = caps[1].replace('.', " ");
            format!(
                "\"{}\" updated - {} <http://{}|file> <{}|details>",
                cleaned.trim(),
                &caps[2],
                res.title,
                item.detail_url
            )
        }
        None => format!("[update] {} <{}|details>", res.title, item.detail_url),
    }
}

/// Feed variant: collapse over [`COLLAPSE_THRESHOLD`], no trailer filter
/// (the feed never lists trailers).
pub fn format_feed(item: &TrackedItem, new: &[Resource]) -> Vec<String> {
    if new.len() > COLLAPSE_THRESHOLD {
        return vec![collapse_notice(item)];
    }
    new.iter().map(|res| feed_notice(item, res)).collect()
}

/// Catalog-link variants: collapse over [`COLLAPSE_THRESHOLD`], trailer
/// records dropped before phrasing.  The threshold is checked against the
/// unfiltered batch, so a trailer-heavy flood still collapses.
pub fn format_catalog(item: &TrackedItem, new: &[Resource]) -> Vec<String> {
    if new.len() > COLLAPSE_THRESHOLD {
        return vec![collapse_notice(item)];
    }
    new.iter()
        .filter(|res| !res.title.contains(TRAILER_MARKER))
        .map(|res| {
            format!(
                "[{}] update: {} <{}|details>",
                item.name, res.title, item.detail_url
            )
        })
        .collect()
}

/// JSON listing variant: collapse over [`LISTING_COLLAPSE_THRESHOLD`],
/// same trailer filter, terser phrasing.
pub fn format_listing(item: &TrackedItem, new: &[Resource]) -> Vec<String> {
    if new.len() > LISTING_COLLAPSE_THRESHOLD {
        return vec![collapse_notice(item)];
    }
    new.iter()
        .filter(|res| !res.title.contains(TRAILER_MARKER))
        .map(|res| format!("{} <{}|details>", res.title, item.detail_url))
        .collect()
}
