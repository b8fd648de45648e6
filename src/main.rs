//! mediapush — polls media catalogs for new episode listings and pushes
//! update notices to a webhook.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ reload  ┌────────────┐ fetch ┌────────────┐
//! │ config.rs │ ──────► │ watcher.rs │ ────► │  source/   │
//! │ (remote)  │         │  (loop)    │       │ (adapters) │
//! └───────────┘         └─────┬──────┘       └────────────┘
//!                      diff/store │ format
//!                 ┌─────────┐    ▼     ┌───────────┐
//!                 │ seen.rs │ ◄──┴───► │ format.rs │
//!                 └─────────┘          └─────┬─────┘
//!                                            ▼
//!                                      ┌───────────┐
//!                                      │ notify.rs │ ──► webhook
//!                                      └───────────┘
//! ```
//!
//! * **`source/`** — the `SourceAdapter` trait and one implementation per
//!   catalog kind.
//! * **`seen`** — the bounded dedup store of already-notified identifiers.
//! * **`format`** — collapse/phrasing rules turning records into notices.
//! * **`watcher`** — the infinite reload→poll→sleep loop with per-item
//!   failure isolation.
//! * **`main`** — wires everything together: parse args, init logging,
//!   build the registry, run.

mod config;
mod error;
mod format;
mod notify;
mod seen;
mod source;
mod watcher;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use reqwest::blocking::Client;
use tracing_subscriber::EnvFilter;

use notify::WebhookNotifier;
use watcher::Watcher;

/// Default location of the tracked-item configuration document.
const DEFAULT_CONFIG_URL: &str = "http://conf.mazhangjing.com/mediapush.conf";

/// Every source request and webhook post shares this timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Watches media catalogs and pushes episode-update notices to a webhook.
#[derive(Debug, Parser)]
#[command(name = "mediapush")]
struct Args {
    /// URL of the remote configuration document.
    #[arg(short, long)]
    config: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config_url = args.config.unwrap_or_else(|| DEFAULT_CONFIG_URL.to_string());

    let client = Client::builder().timeout(HTTP_TIMEOUT).build()?;
    let notifier = WebhookNotifier::new(client.clone());

    let mut watcher = Watcher::new(config_url, client, source::registry(), notifier);
    watcher.run();

    // run() loops until the process is terminated.
    Ok(())
}
