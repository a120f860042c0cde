pub mod check;
pub mod events;
pub mod fingerprint;
pub mod reset;
pub mod watch;

use std::path::Path;

use anyhow::{Context, Result};
use icswatch_core::ChangeDetector;
use icswatch_core::Watcher;
use icswatch_core::config::{ConfigOverrides, WatchConfig};
use icswatch_core::fetch::HttpFeed;
use icswatch_core::store::FileStore;

/// Load config and apply command-line overrides, without validating the feed.
pub fn load_settings(path: Option<&Path>, overrides: ConfigOverrides) -> Result<WatchConfig> {
    let mut cfg = WatchConfig::load(path).context("Failed to load configuration")?;
    overrides.apply(&mut cfg);
    Ok(cfg)
}

/// Load config for polling. Misconfiguration stops the process here.
pub fn load_config(path: Option<&Path>, overrides: ConfigOverrides) -> Result<WatchConfig> {
    let cfg = load_settings(path, overrides)?;

    if cfg.url.is_none() {
        anyhow::bail!(
            "No feed URL configured.\n\n\
            Pass one with --url, set ICSWATCH_URL, or add it to {}:\n\n\
            url = \"https://example.edu/events/?ical=1\"",
            WatchConfig::config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "config.toml".into())
        );
    }

    cfg.validate().context("Invalid configuration")?;
    Ok(cfg)
}

pub fn build_watcher(cfg: &WatchConfig) -> Result<Watcher<HttpFeed, FileStore>> {
    let feed = HttpFeed::new(
        cfg.feed_url()?,
        &cfg.user_agent,
        &cfg.headers,
        cfg.request_timeout(),
    )?;

    let store = FileStore::new(cfg.state_path());
    tracing::debug!(path = %store.path().display(), "Using fingerprint store");

    Ok(Watcher::new(feed, ChangeDetector::new(store), cfg.poll_interval()))
}
