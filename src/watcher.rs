//! The watch loop: reload configuration, poll every tracked item, sleep,
//! repeat.
//!
//! Failure isolation is the whole point of this module.  Each tracked item
//! is processed inside its own `Result`; a dead source or a rejected notice
//! is logged and skipped, never aborting the rest of the cycle.  A failed
//! configuration reload skips the cycle but keeps the previous sleep
//! interval, so the loop degrades into infinite retry with a fixed backoff.

use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{error, info, warn};

use crate::config::{self, TrackedItem};
use crate::error::{Result, WatchError};
use crate::notify::Notifier;
use crate::seen::SeenSet;
use crate::source::Registry;

/// Interval used until the first successful configuration load.
const DEFAULT_SLEEP_SECS: u64 = 300;

/// How one tracked item fared in a cycle: notices delivered, or the error
/// that stopped it.
pub struct CycleOutcome {
    pub item: String,
    pub result: Result<usize>,
}

pub struct Watcher<N: Notifier> {
    config_url: String,
    client: Client,
    adapters: Registry,
    notifier: N,
    seen: SeenSet,
    sleep_secs: u64,
}

impl<N: Notifier> Watcher<N> {
    pub fn new(config_url: String, client: Client, adapters: Registry, notifier: N) -> Self {
        Self {
            config_url,
            client,
            adapters,
            notifier,
            seen: SeenSet::new(),
            sleep_secs: DEFAULT_SLEEP_SECS,
        }
    }

    /// Poll forever.  Only process termination ends the loop; termination
    /// is safe at any point since no durable state is written.
    pub fn run(&mut self) {
        info!("starting watch loop");
        loop {
            match config::load(&self.client, &self.config_url) {
                Ok(cfg) => {
                    self.sleep_secs = cfg.sleep_secs();
                    info!(
                        sleep_secs = self.sleep_secs,
                        items = cfg.items.len(),
                        "configuration refreshed"
                    );

                    let outcomes = self.run_cycle(&cfg.items);
                    let delivered: usize =
                        outcomes.iter().filter_map(|o| o.result.as_ref().ok()).sum();
                    let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
                    info!(delivered, failed, seen = self.seen.len(), "cycle complete");
                }
                // Keep the previous interval and retry next cycle.
                Err(err) => error!("configuration reload failed: {err}"),
            }

            info!(secs = self.sleep_secs, "sleeping until next cycle");
            thread::sleep(Duration::from_secs(self.sleep_secs));
        }
    }

    /// Process every tracked item strictly in order, capturing one outcome
    /// per item.  A failing item never takes the rest of the cycle down.
    pub fn run_cycle(&mut self, items: &[TrackedItem]) -> Vec<CycleOutcome> {
        items
            .iter()
            .map(|item| {
                let result = self.process_item(item);
                if let Err(err) = &result {
                    warn!(item = %item.name, "skipping item: {err}");
                }
                CycleOutcome {
                    item: item.name.clone(),
                    result,
                }
            })
            .collect()
    }

    /// fetch → diff → store → format → notify, for one tracked item.
    ///
    /// Store runs before formatting, so records the formatter later drops
    /// (trailers, collapsed batches) are still marked seen and never
    /// resurface.
    fn process_item(&mut self, item: &TrackedItem) -> Result<usize> {
        let adapter = self
            .adapters
            .get(item.kind.as_str())
            .ok_or_else(|| WatchError::UnknownKind(item.kind.clone()))?;

        info!(item = %item.name, kind = %item.kind, "checking resources");
        let resources = adapter.fetch_resources(&self.client, item)?;

        let new = self.seen.diff(resources);
        self.seen.store(&new);

        let notices = adapter.format_update(item, &new);
        for notice in &notices {
            info!(item = %item.name, "push: {notice}");
            self.notifier.send(&item.push_url, notice)?;
        }
        Ok(notices.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    use crate::source::{Resource, SourceAdapter};

    /// Adapter returning a fixed batch, no network.
    struct StaticSource {
        kind: &'static str,
        resources: Vec<Resource>,
    }

    impl SourceAdapter for StaticSource {
        fn kind(&self) -> &'static str {
            self.kind
        }

        fn fetch_resources(&self, _client: &Client, _item: &TrackedItem) -> Result<Vec<Resource>> {
            Ok(self.resources.clone())
        }

        fn format_update(&self, _item: &TrackedItem, new: &[Resource]) -> Vec<String> {
            new.iter().map(|r| r.title.clone()).collect()
        }
    }

    /// Adapter whose fetch always fails, like a source behind a dead proxy.
    struct BrokenSource;

    impl SourceAdapter for BrokenSource {
        fn kind(&self) -> &'static str {
            "broken"
        }

        fn fetch_resources(&self, _client: &Client, _item: &TrackedItem) -> Result<Vec<Resource>> {
            Err(WatchError::Parse("no such field".into()))
        }

        fn format_update(&self, _item: &TrackedItem, _new: &[Resource]) -> Vec<String> {
            Vec::new()
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        sent: RefCell<Vec<(String, String)>>,
    }

    impl Notifier for RecordingNotifier {
        fn send(&self, url: &str, text: &str) -> Result<()> {
            self.sent.borrow_mut().push((url.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn res(guid: &str, title: &str) -> Resource {
        Resource {
            guid: guid.to_string(),
            title: title.to_string(),
            download: None,
        }
    }

    fn tracked(name: &str, kind: &str) -> TrackedItem {
        TrackedItem {
            name: name.to_string(),
            detail_url: format!("http://example.com/detail/{name}"),
            resource_url: format!("http://example.com/resource/{name}"),
            push_url: format!("http://example.com/hook/{name}"),
            kind: kind.to_string(),
        }
    }

    fn watcher_with(adapters: Vec<Box<dyn SourceAdapter>>) -> Watcher<RecordingNotifier> {
        let registry: Registry = adapters.into_iter().map(|a| (a.kind(), a)).collect();
        Watcher::new(
            "http://example.com/conf".to_string(),
            Client::new(),
            registry,
            RecordingNotifier::default(),
        )
    }

    #[test]
    fn new_records_are_notified_in_order() {
        let mut watcher = watcher_with(vec![Box::new(StaticSource {
            kind: "static",
            resources: vec![res("1", "ep one"), res("2", "ep two")],
        })]);

        let outcomes = watcher.run_cycle(&[tracked("show", "static")]);

        assert!(matches!(outcomes[0].result, Ok(2)));
        let sent = watcher.notifier.sent.borrow();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], ("http://example.com/hook/show".to_string(), "ep one".to_string()));
        assert_eq!(sent[1].1, "ep two");
    }

    #[test]
    fn second_cycle_with_same_records_notifies_nothing() {
        let mut watcher = watcher_with(vec![Box::new(StaticSource {
            kind: "static",
            resources: vec![res("1", "ep one")],
        })]);
        let items = [tracked("show", "static")];

        watcher.run_cycle(&items);
        let outcomes = watcher.run_cycle(&items);

        assert!(matches!(outcomes[0].result, Ok(0)));
        assert_eq!(watcher.notifier.sent.borrow().len(), 1);
    }

    #[test]
    fn failing_item_does_not_abort_the_rest_of_the_cycle() {
        let mut watcher = watcher_with(vec![
            Box::new(BrokenSource),
            Box::new(StaticSource {
                kind: "static",
                resources: vec![res("1", "ep one")],
            }),
        ]);

        let outcomes = watcher.run_cycle(&[tracked("dead", "broken"), tracked("live", "static")]);

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].item, "dead");
        assert!(matches!(outcomes[0].result, Err(WatchError::Parse(_))));
        assert_eq!(outcomes[1].item, "live");
        assert!(matches!(outcomes[1].result, Ok(1)));
        assert_eq!(watcher.notifier.sent.borrow().len(), 1);
    }

    #[test]
    fn unknown_kind_is_a_per_item_error() {
        let mut watcher = watcher_with(vec![Box::new(StaticSource {
            kind: "static",
            resources: vec![res("1", "ep one")],
        })]);

        let outcomes = watcher.run_cycle(&[tracked("mystery", "nope"), tracked("live", "static")]);

        assert!(matches!(&outcomes[0].result, Err(WatchError::UnknownKind(k)) if k == "nope"));
        assert!(matches!(outcomes[1].result, Ok(1)));
    }

    #[test]
    fn seen_state_is_shared_across_items_within_a_cycle() {
        // Two tracked items backed by the same underlying records: the
        // second one must not re-notify.
        let shared = vec![res("1", "ep one")];
        let mut watcher = watcher_with(vec![
            Box::new(StaticSource {
                kind: "a",
                resources: shared.clone(),
            }),
            Box::new(StaticSource {
                kind: "b",
                resources: shared,
            }),
        ]);

        let outcomes = watcher.run_cycle(&[tracked("first", "a"), tracked("second", "b")]);

        assert!(matches!(outcomes[0].result, Ok(1)));
        assert!(matches!(outcomes[1].result, Ok(0)));
    }
}
