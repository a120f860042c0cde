//! Error types for icswatch.

use thiserror::Error;

/// Errors retrieving the feed payload.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Failed to read response body from {url}: {source}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// Structural errors in a calendar document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Calendar document is empty")]
    Empty,

    #[error("Expected BEGIN:VCALENDAR, found '{0}'")]
    MissingCalendar(String),

    #[error("Block {0} is never closed")]
    Unterminated(String),

    #[error("END:{found} does not close the open {expected} block (line {line})")]
    MismatchedEnd {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("END:{found} without a matching BEGIN (line {line})")]
    UnexpectedEnd { found: String, line: usize },

    #[error("ICS parse error: {0}")]
    Syntax(String),
}

/// Errors reading or writing the persisted fingerprint.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored fingerprint is corrupt: {0}")]
    Corrupt(String),
}

/// Errors in the watcher configuration. These are fatal at startup.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Invalid(String),

    #[error("Missing required setting '{0}'")]
    Missing(&'static str),

    #[error("Could not load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

/// A failed poll cycle, by stage.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl WatchError {
    /// Short label for the failing stage.
    pub fn stage(&self) -> &'static str {
        match self {
            WatchError::Fetch(_) => "fetch",
            WatchError::Parse(_) => "parse",
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
