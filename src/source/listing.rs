//! JSON episode-listing source (`mgtv` kind).
//!
//! The site serves its episode list as JSON: titles live at
//! `data.list[].t3`.  No id field, so records are identified by a content
//! hash of the title.

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use serde::Deserialize;

use crate::config::TrackedItem;
use crate::error::{Result, WatchError};
use crate::format;

use super::{content_id, Resource, SourceAdapter, DESKTOP_UA};

#[derive(Debug, Deserialize)]
struct ListingBody {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    list: Vec<ListingEntry>,
}

#[derive(Debug, Deserialize)]
struct ListingEntry {
    /// Episode title field, as the endpoint names it.
    t3: String,
}

pub struct ListingSource;

impl ListingSource {
    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("zh-CN,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(DESKTOP_UA));
        headers
    }

    /// Parse a listing body into records.  Pure — no I/O.
    pub fn parse_listing(body: &str) -> Result<Vec<Resource>> {
        let parsed: ListingBody = serde_json::from_str(body)
            .map_err(|e| WatchError::Parse(format!("listing json: {e}")))?;

        Ok(parsed
            .data
            .list
            .into_iter()
            .map(|entry| {
                let guid = content_id(&entry.t3);
                Resource {
                    guid,
                    title: entry.t3,
                    download: None,
                }
            })
            .collect())
    }
}

impl SourceAdapter for ListingSource {
    fn kind(&self) -> &'static str {
        "mgtv"
    }

    fn fetch_resources(&self, client: &Client, item: &TrackedItem) -> Result<Vec<Resource>> {
        let body = client
            .get(&item.resource_url)
            .headers(Self::headers())
            .send()?
            .error_for_status()?
            .text()?;
        Self::parse_listing(&body)
    }

    fn format_update(&self, item: &TrackedItem, new: &[Resource]) -> Vec<String> {
        format::format_listing(item, new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_listing_extracts_titles_in_order() {
        let body = r#"{"data":{"list":[{"t3":"第1期"},{"t3":"第2期"},{"t3":"第3期 预告"}]}}"#;

        let records = ListingSource::parse_listing(body).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].title, "第1期");
        assert_eq!(records[2].title, "第3期 预告");
        assert_eq!(records[0].guid, content_id("第1期"));
    }

    #[test]
    fn parse_listing_tolerates_extra_fields() {
        let body = r#"{"code":200,"data":{"total":1,"list":[{"t1":"x","t3":"第1期"}]}}"#;

        let records = ListingSource::parse_listing(body).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn parse_listing_rejects_missing_list() {
        let err = ListingSource::parse_listing(r#"{"data":{}}"#).unwrap_err();
        assert!(matches!(err, WatchError::Parse(_)));
    }

    #[test]
    fn parse_listing_rejects_non_json_body() {
        let err = ListingSource::parse_listing("<html>gateway timeout</html>").unwrap_err();
        assert!(matches!(err, WatchError::Parse(_)));
    }
}
