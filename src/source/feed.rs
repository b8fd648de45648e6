//! RSS feed catalog source (`zimuzu` kind).
//!
//! The only variant with stable server-side identifiers: every `<item>` in
//! the feed carries a `<guid>`, so dedup never depends on title hashing
//! here.  Fetching and parsing are split so tests can exercise the parse
//! step on inline XML without touching the network.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

use crate::config::TrackedItem;
use crate::error::{Result, WatchError};
use crate::format;

use super::{Resource, SourceAdapter, DESKTOP_UA};

pub struct FeedSource;

impl FeedSource {
    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_UA));
        headers
    }

    /// Parse an RSS body into records.  Pure — no I/O.
    ///
    /// `<guid>` and `<title>` are required per item; a feed missing either
    /// is a parse failure for the whole tracked item.  The download link
    /// comes from `<enclosure>` when the feed provides one.
    pub fn parse_feed(body: &[u8]) -> Result<Vec<Resource>> {
        let channel = rss::Channel::read_from(body)
            .map_err(|e| WatchError::Parse(format!("rss channel: {e}")))?;

        channel
            .items()
            .iter()
            .map(|item| {
                let guid = item
                    .guid()
                    .map(|g| g.value().to_string())
                    .ok_or_else(|| WatchError::Parse("feed item without <guid>".into()))?;
                let title = item
                    .title()
                    .ok_or_else(|| WatchError::Parse("feed item without <title>".into()))?
                    .to_string();
                let download = item.enclosure().map(|e| e.url().to_string());

                Ok(Resource {
                    guid,
                    title,
                    download,
                })
            })
            .collect()
    }
}

impl SourceAdapter for FeedSource {
    fn kind(&self) -> &'static str {
        "zimuzu"
    }

    fn fetch_resources(&self, client: &Client, item: &TrackedItem) -> Result<Vec<Resource>> {
        let body = client
            .get(&item.resource_url)
            .headers(Self::headers())
            .send()?
            .error_for_status()?
            .bytes()?;
        Self::parse_feed(&body)
    }

    fn format_update(&self, item: &TrackedItem, new: &[Resource]) -> Vec<String> {
        format::format_feed(item, new)
    }
}
