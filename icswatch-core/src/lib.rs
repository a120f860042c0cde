//! Core of icswatch: polling a remote ICS feed for changes.
//!
//! - `fingerprint` and `detector` decide whether a fetched payload is new
//! - `store` keeps the last fingerprint across restarts
//! - `ics` turns a payload into event records
//! - `fetch`, `watch` and `config` drive the poll loop

pub mod config;
pub mod detector;
pub mod error;
pub mod event;
pub mod fetch;
pub mod fingerprint;
pub mod ics;
pub mod store;
pub mod watch;

pub use detector::{ChangeDetector, Observation};
pub use error::{ConfigError, FetchError, ParseError, StoreError, WatchError};
pub use event::{EventRecord, EventTime};
pub use fingerprint::{Fingerprint, fingerprint};
pub use watch::{CycleOutcome, Reporter, Watcher};
