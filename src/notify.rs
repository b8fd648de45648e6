//! Webhook delivery of formatted notices.

use reqwest::blocking::Client;
use serde_json::json;

use crate::error::{Result, WatchError};

/// Delivery of one notice to one destination.  A trait so the watch loop
/// can be exercised with a recording stand-in instead of a live webhook.
pub trait Notifier {
    fn send(&self, url: &str, text: &str) -> Result<()>;
}

/// Slack-style incoming webhook: POST `{"text": ...}` as JSON.
pub struct WebhookNotifier {
    client: Client,
}

impl WebhookNotifier {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Notifier for WebhookNotifier {
    fn send(&self, url: &str, text: &str) -> Result<()> {
        let body = self
            .client
            .post(url)
            .json(&json!({ "text": text }))
            .send()?
            .text()?;

        // The webhook acknowledges with a literal "ok" body; anything else
        // is a rejected notice, even on a 2xx status.
        if body != "ok" {
            return Err(WatchError::Notify(body));
        }
        Ok(())
    }
}
