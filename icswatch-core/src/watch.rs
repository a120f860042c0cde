//! The poll loop: fetch, detect, extract, report, wait.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::detector::{ChangeDetector, Observation};
use crate::error::{StoreError, WatchError};
use crate::event::EventRecord;
use crate::fetch::FeedSource;
use crate::fingerprint::Fingerprint;
use crate::ics::extract;
use crate::store::FingerprintStore;

/// What one poll cycle produced. Every cycle yields exactly one.
#[derive(Debug)]
pub enum CycleOutcome {
    Unchanged {
        /// A pending fingerprint save was retried and failed again.
        store_error: Option<StoreError>,
    },
    Changed {
        fingerprint: Fingerprint,
        calendar_name: Option<String>,
        /// All events, in document order
        events: Vec<EventRecord>,
        store_error: Option<StoreError>,
    },
    Failed(WatchError),
}

impl CycleOutcome {
    pub fn is_changed(&self) -> bool {
        matches!(self, CycleOutcome::Changed { .. })
    }
}

/// Receives cycle outcomes as they happen.
pub trait Reporter {
    fn report(&mut self, outcome: &CycleOutcome);

    /// Called before sleeping until the next cycle.
    fn waiting(&mut self, _interval: Duration) {}
}

pub struct Watcher<F, S> {
    source: F,
    detector: ChangeDetector<S>,
    interval: Duration,
}

impl<F: FeedSource, S: FingerprintStore> Watcher<F, S> {
    pub fn new(source: F, detector: ChangeDetector<S>, interval: Duration) -> Self {
        Watcher {
            source,
            detector,
            interval,
        }
    }

    pub fn detector(&self) -> &ChangeDetector<S> {
        &self.detector
    }

    /// Run a single cycle.
    ///
    /// The fingerprint is committed before parsing, so a feed that fails to
    /// parse is reported once and then counts as unchanged until its bytes
    /// change again.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        let payload = match self.source.fetch().await {
            Ok(payload) => payload,
            Err(e) => return CycleOutcome::Failed(e.into()),
        };

        let (fingerprint, store_error) = match self.detector.observe(&payload) {
            Observation::Unchanged { store_error } => {
                return CycleOutcome::Unchanged { store_error };
            }
            Observation::Changed {
                fingerprint,
                store_error,
            } => (fingerprint, store_error),
        };

        match extract(&payload) {
            Ok(document) => CycleOutcome::Changed {
                fingerprint,
                calendar_name: document.name(),
                events: document.events().collect(),
                store_error,
            },
            Err(e) => CycleOutcome::Failed(e.into()),
        }
    }

    /// Poll until `shutdown` turns true. Returns the number of cycles run.
    ///
    /// The signal is checked between cycles and while waiting; a fetch in
    /// progress is allowed to finish.
    pub async fn run<R: Reporter>(
        &mut self,
        mut shutdown: watch::Receiver<bool>,
        reporter: &mut R,
    ) -> u64 {
        tracing::info!(interval = ?self.interval, "Watcher started");
        let mut cycles = 0;

        while !*shutdown.borrow_and_update() {
            let outcome = self.run_cycle().await;
            log_outcome(&outcome);
            reporter.report(&outcome);
            cycles += 1;

            if *shutdown.borrow_and_update() {
                break;
            }

            reporter.waiting(self.interval);
            if wait_or_shutdown(self.interval, &mut shutdown).await {
                break;
            }
        }

        tracing::info!(cycles, "Watcher stopped");
        cycles
    }
}

/// Sleep for `interval`. Returns true if shutdown was requested first.
async fn wait_or_shutdown(interval: Duration, shutdown: &mut watch::Receiver<bool>) -> bool {
    let sleep = time::sleep(interval);
    tokio::pin!(sleep);

    loop {
        tokio::select! {
            _ = &mut sleep => return false,
            changed = shutdown.changed() => match changed {
                Ok(()) if *shutdown.borrow_and_update() => return true,
                Ok(()) => continue,
                // Sender gone: nobody can ask us to stop any more.
                Err(_) => {
                    (&mut sleep).await;
                    return false;
                }
            },
        }
    }
}

fn log_outcome(outcome: &CycleOutcome) {
    match outcome {
        CycleOutcome::Unchanged { store_error } => {
            tracing::debug!("Feed unchanged");
            if let Some(e) = store_error {
                tracing::warn!("Fingerprint still not persisted: {}", e);
            }
        }
        CycleOutcome::Changed {
            fingerprint,
            events,
            store_error,
            ..
        } => {
            tracing::info!(fingerprint = %fingerprint.short(), events = events.len(), "Feed changed");
            if let Some(e) = store_error {
                tracing::warn!("Fingerprint not persisted, a restart may repeat this notice: {}", e);
            }
        }
        CycleOutcome::Failed(e) => tracing::error!(stage = e.stage(), "Poll cycle failed: {}", e),
    }
}
