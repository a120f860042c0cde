//! Change detection over successive payloads.

use crate::error::StoreError;
use crate::fingerprint::{Fingerprint, fingerprint};
use crate::store::{FingerprintStore, MemoryStore};

/// Result of observing one payload.
#[derive(Debug)]
pub enum Observation {
    Unchanged {
        /// Set when retrying an earlier failed save failed again.
        store_error: Option<StoreError>,
    },
    Changed {
        fingerprint: Fingerprint,
        /// Set when the new fingerprint could not be persisted. The in-memory
        /// state has still moved on.
        store_error: Option<StoreError>,
    },
}

impl Observation {
    pub fn is_changed(&self) -> bool {
        matches!(self, Observation::Changed { .. })
    }

    pub fn fingerprint(&self) -> Option<&Fingerprint> {
        match self {
            Observation::Changed { fingerprint, .. } => Some(fingerprint),
            Observation::Unchanged { .. } => None,
        }
    }
}

/// Remembers the last committed fingerprint and reports when a payload differs.
///
/// Only one fingerprint is kept, so A, B, A reports a change every time.
/// A fingerprint that could not be saved is saved again on every later
/// observation until the store accepts it.
pub struct ChangeDetector<S = MemoryStore> {
    last: Option<Fingerprint>,
    /// Last value known to be in the store
    persisted: Option<Fingerprint>,
    store: S,
}

impl ChangeDetector<MemoryStore> {
    /// Detector with no prior state and no durability.
    pub fn in_memory() -> Self {
        ChangeDetector {
            last: None,
            persisted: None,
            store: MemoryStore::new(),
        }
    }
}

impl<S: FingerprintStore> ChangeDetector<S> {
    /// Build a detector, seeding its state from `store`.
    ///
    /// A store that cannot be read counts as empty, so the next payload is
    /// reported as a change rather than silently suppressed.
    pub fn new(store: S) -> Self {
        let last = match store.load() {
            Ok(last) => last,
            Err(e) => {
                tracing::warn!("Could not read stored fingerprint, starting fresh: {}", e);
                None
            }
        };

        if let Some(fp) = &last {
            tracing::debug!(fingerprint = %fp.short(), "Loaded previous fingerprint");
        }

        ChangeDetector {
            persisted: last.clone(),
            last,
            store,
        }
    }

    pub fn last(&self) -> Option<&Fingerprint> {
        self.last.as_ref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// True while the committed fingerprint has not reached the store.
    pub fn save_pending(&self) -> bool {
        self.last != self.persisted
    }

    /// Compare `payload` against the last committed fingerprint, committing it
    /// if it differs.
    pub fn observe(&mut self, payload: &[u8]) -> Observation {
        let fp = fingerprint(payload);

        if self.last.as_ref() == Some(&fp) {
            let store_error = if self.save_pending() {
                tracing::debug!(fingerprint = %fp.short(), "Retrying fingerprint save");
                self.persist(&fp)
            } else {
                None
            };
            return Observation::Unchanged { store_error };
        }

        self.last = Some(fp.clone());
        let store_error = self.persist(&fp);

        Observation::Changed {
            fingerprint: fp,
            store_error,
        }
    }

    fn persist(&mut self, fp: &Fingerprint) -> Option<StoreError> {
        match self.store.save(fp) {
            Ok(()) => {
                self.persisted = Some(fp.clone());
                None
            }
            Err(e) => {
                tracing::warn!("Could not persist fingerprint {}: {}", fp.short(), e);
                Some(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreResult;
    use crate::store::FileStore;

    /// Store that refuses every operation.
    struct BrokenStore;

    impl FingerprintStore for BrokenStore {
        fn load(&self) -> StoreResult<Option<Fingerprint>> {
            Err(StoreError::Corrupt("unreadable".into()))
        }

        fn save(&mut self, _fingerprint: &Fingerprint) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    /// Store whose first `fail` saves fail.
    #[derive(Default)]
    struct FlakyStore {
        fail: usize,
        saves: usize,
        value: Option<Fingerprint>,
    }

    impl FingerprintStore for FlakyStore {
        fn load(&self) -> StoreResult<Option<Fingerprint>> {
            Ok(self.value.clone())
        }

        fn save(&mut self, fingerprint: &Fingerprint) -> StoreResult<()> {
            self.saves += 1;
            if self.saves <= self.fail {
                return Err(StoreError::Io(std::io::Error::other("disk full")));
            }
            self.value = Some(fingerprint.clone());
            Ok(())
        }
    }

    #[test]
    fn test_first_observation_is_a_change() {
        let mut detector = ChangeDetector::in_memory();
        assert!(detector.observe(b"").is_changed());
    }

    #[test]
    fn test_same_payload_twice_is_changed_then_unchanged() {
        let mut detector = ChangeDetector::in_memory();
        assert!(detector.observe(b"payload").is_changed());
        assert!(matches!(detector.observe(b"payload"), Observation::Unchanged { .. }));
        assert!(matches!(detector.observe(b"payload"), Observation::Unchanged { .. }));
    }

    #[test]
    fn test_oscillation_reports_every_change() {
        let mut detector = ChangeDetector::in_memory();
        assert!(detector.observe(b"A").is_changed());
        assert!(detector.observe(b"B").is_changed());
        assert!(detector.observe(b"A").is_changed());
    }

    #[test]
    fn test_changed_carries_new_fingerprint() {
        let mut detector = ChangeDetector::in_memory();
        let observation = detector.observe(b"A");
        assert_eq!(observation.fingerprint(), Some(&fingerprint(b"A")));
        assert_eq!(detector.last(), Some(&fingerprint(b"A")));
    }

    #[test]
    fn test_unchanged_does_not_touch_store() {
        let mut detector = ChangeDetector::new(MemoryStore::with_value(fingerprint(b"A")));
        assert!(matches!(detector.observe(b"A"), Observation::Unchanged { .. }));
        assert_eq!(detector.store().load().unwrap(), Some(fingerprint(b"A")));
    }

    #[test]
    fn test_store_roundtrip_across_detectors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events_hash.txt");

        let mut first = ChangeDetector::new(FileStore::new(&path));
        assert!(first.observe(b"calendar v1").is_changed());

        let mut second = ChangeDetector::new(FileStore::new(&path));
        assert!(matches!(second.observe(b"calendar v1"), Observation::Unchanged { .. }));
        assert!(second.observe(b"calendar v2").is_changed());
    }

    #[test]
    fn test_unreadable_store_starts_absent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events_hash.txt");
        std::fs::write(&path, "garbage").unwrap();

        let mut detector = ChangeDetector::new(FileStore::new(&path));
        assert!(detector.last().is_none());
        assert!(detector.observe(b"garbage").is_changed());
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let mut detector = ChangeDetector::new(BrokenStore);

        match detector.observe(b"A") {
            Observation::Changed {
                fingerprint: fp,
                store_error,
            } => {
                assert_eq!(fp, fingerprint(b"A"));
                assert!(store_error.is_some());
            }
            Observation::Unchanged { .. } => panic!("first observation must be a change"),
        }

        assert_eq!(detector.last(), Some(&fingerprint(b"A")));
        assert!(matches!(detector.observe(b"A"), Observation::Unchanged { .. }));
    }

    #[test]
    fn test_failed_save_is_retried_on_next_cycle() {
        let mut detector = ChangeDetector::new(FlakyStore {
            fail: 1,
            ..Default::default()
        });

        match detector.observe(b"A") {
            Observation::Changed { store_error, .. } => assert!(store_error.is_some()),
            other => panic!("expected a change, got {other:?}"),
        }
        assert!(detector.save_pending());

        match detector.observe(b"A") {
            Observation::Unchanged { store_error } => assert!(store_error.is_none()),
            other => panic!("expected unchanged, got {other:?}"),
        }
        assert!(!detector.save_pending());
        assert_eq!(detector.store().value, Some(fingerprint(b"A")));
        assert_eq!(detector.store().saves, 2);

        // Nothing left to retry
        detector.observe(b"A");
        assert_eq!(detector.store().saves, 2);
    }

    #[test]
    fn test_repeated_save_failure_is_reported_while_unchanged() {
        let mut detector = ChangeDetector::new(FlakyStore {
            fail: 2,
            ..Default::default()
        });

        assert!(detector.observe(b"A").is_changed());
        match detector.observe(b"A") {
            Observation::Unchanged { store_error } => assert!(store_error.is_some()),
            other => panic!("expected unchanged, got {other:?}"),
        }
        assert!(detector.save_pending());
        assert!(matches!(
            detector.observe(b"A"),
            Observation::Unchanged { store_error: None }
        ));
        assert_eq!(detector.store().value, Some(fingerprint(b"A")));
    }
}
