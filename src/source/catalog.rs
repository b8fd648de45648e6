//! HTML catalog-link sources (`bilibili` and `iqiyi` kinds).
//!
//! Both sites render their episode list as `.title-link` elements; entries
//! that carry an `href` are navigation chrome around the list and are
//! skipped.  Neither site exposes an id, so records are identified by a
//! content hash of the title text.

use std::sync::LazyLock;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use scraper::{Html, Selector};

use crate::config::TrackedItem;
use crate::error::Result;
use crate::format;

use super::{content_id, Resource, SourceAdapter, DESKTOP_UA};

const EDGE_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/83.0.4103.97 Safari/537.36 Edg/83.0.478.45";

static TITLE_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".title-link").expect("hardcoded selector"));

/// One adapter covers both catalog sites; they differ only in the `kind`
/// string and the browser identity the site expects.
pub struct CatalogSource {
    kind: &'static str,
    user_agent: &'static str,
}

impl CatalogSource {
    pub fn bilibili() -> Self {
        Self {
            kind: "bilibili",
            user_agent: EDGE_UA,
        }
    }

    pub fn iqiyi() -> Self {
        Self {
            kind: "iqiyi",
            user_agent: DESKTOP_UA,
        }
    }

    fn headers(&self) -> HeaderMap {
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
        headers.insert(USER_AGENT, HeaderValue::from_static(self.user_agent));
        headers
    }

    /// Extract episode records from a catalog page.  Pure — no I/O.
    ///
    /// A page without any matching elements yields an empty batch, not an
    /// error: the sites render an empty list for shows between seasons.
    pub fn parse_page(body: &str) -> Vec<Resource> {
        let doc = Html::parse_document(body);
        doc.select(&TITLE_LINK)
            .filter(|el| el.value().attr("href").is_none())
            .map(|el| {
                let title = el.text().collect::<String>().trim().to_string();
                Resource {
                    guid: content_id(&title),
                    title,
                    download: None,
                }
            })
            .collect()
    }
}

impl SourceAdapter for CatalogSource {
    fn kind(&self) -> &'static str {
        self.kind
    }

    fn fetch_resources(&self, client: &Client, item: &TrackedItem) -> Result<Vec<Resource>> {
        let body = client
            .get(&item.resource_url)
            .headers(self.headers())
            .send()?
            .error_for_status()?
            .text()?;
        Ok(Self::parse_page(&body))
    }

    fn format_update(&self, item: &TrackedItem, new: &[Resource]) -> Vec<String> {
        format::format_catalog(item, new)
    }
}
