//! Watcher configuration.
//!
//! Settings are layered: built-in defaults, then `~/.config/icswatch/config.toml`
//! (or an explicit file), then `ICSWATCH_*` environment variables, then
//! command-line overrides.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File, Map};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_EVENTS: usize = 5;
pub const DEFAULT_STATE_FILE_NAME: &str = "events_hash.txt";

/// Many event sites refuse requests without a browser-like user agent.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_max_events() -> usize {
    DEFAULT_MAX_EVENTS
}

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Feed URL (http, https or webcal)
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Extra request headers
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// How many events to show after a change
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Where the last fingerprint is kept. `~` is expanded.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        WatchConfig {
            url: None,
            user_agent: default_user_agent(),
            headers: BTreeMap::new(),
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_events: DEFAULT_MAX_EVENTS,
            state_file: None,
        }
    }
}

/// Values given on the command line. `None` leaves the loaded value alone.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub url: Option<String>,
    pub poll_interval_secs: Option<u64>,
    pub max_events: Option<usize>,
    pub state_file: Option<PathBuf>,
    pub user_agent: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut WatchConfig) {
        if let Some(url) = self.url {
            config.url = Some(url);
        }
        if let Some(secs) = self.poll_interval_secs {
            config.poll_interval_secs = secs;
        }
        if let Some(max) = self.max_events {
            config.max_events = max;
        }
        if let Some(path) = self.state_file {
            config.state_file = Some(path);
        }
        if let Some(ua) = self.user_agent {
            config.user_agent = ua;
        }
    }
}

impl WatchConfig {
    /// Default config file location (~/.config/icswatch/config.toml).
    pub fn config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".into()))?
            .join("icswatch");

        Ok(config_dir.join("config.toml"))
    }

    /// Load configuration. An explicit `path` must exist; the default path
    /// is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, None)
    }

    /// Like [`WatchConfig::load`], reading `ICSWATCH_*` variables from `env`
    /// instead of the process environment when it is given.
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<Map<String, String>>,
    ) -> Result<Self, ConfigError> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Self::config_path()?, false),
        };

        tracing::debug!(path = %file.display(), required, "Loading configuration");

        let config: WatchConfig = Config::builder()
            .add_source(File::from(file).required(required))
            .add_source(
                Environment::with_prefix("ICSWATCH")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Check the settings that would otherwise fail on the first poll.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.feed_url()?;
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::Invalid("poll_interval_secs must be greater than 0".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be greater than 0".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent must not be empty".into()));
        }
        Ok(())
    }

    /// The feed URL, with `webcal://` rewritten to `https://`.
    pub fn feed_url(&self) -> Result<Url, ConfigError> {
        let raw = self.url.as_deref().ok_or(ConfigError::Missing("url"))?;
        normalize_feed_url(raw)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Resolved fingerprint file path.
    pub fn state_path(&self) -> PathBuf {
        match &self.state_file {
            Some(path) => {
                PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
            }
            None => dirs::cache_dir()
                .map(|dir| dir.join("icswatch").join(DEFAULT_STATE_FILE_NAME))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE_NAME)),
        }
    }
}

/// Parse a feed URL, accepting `webcal://` subscription links.
pub fn normalize_feed_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let rewritten = match raw.split_once("://") {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case("webcal") || scheme.eq_ignore_ascii_case("webcals") =>
        {
            format!("https://{rest}")
        }
        _ => raw.to_string(),
    };

    let url = Url::parse(&rewritten)
        .map_err(|e| ConfigError::Invalid(format!("Invalid feed URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid(format!(
            "Unsupported URL scheme '{other}' (expected http, https or webcal)"
        ))),
    }
}
