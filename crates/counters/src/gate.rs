use crate::error::CounterError;
use crate::store::CounterStore;
use core_types::{validate_path, PathCounter, VisitStatus};
use std::sync::Arc;

/// Decides whether the visit counter of a path is popular enough to show.
#[derive(Clone)]
pub struct DisplayGate {
    store: Arc<dyn CounterStore>,
}

impl DisplayGate {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Returns the current count, threshold and display decision for `path`.
    ///
    /// Unseen paths report `count = 0` with the default threshold and are not
    /// created. A threshold of zero always displays. Storage errors are returned
    /// rather than guessed around.
    pub async fn status(&self, path: &str) -> Result<VisitStatus, CounterError> {
        let path = validate_path(path)?;
        let counter = match self.store.get(path).await? {
            Some(counter) => counter,
            None => PathCounter::new(path, self.store.default_threshold()),
        };
        Ok(VisitStatus::from(counter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::VisitRecorder;
    use crate::store::{MemoryCounterStore, UnavailableStore};
    use crate::thresholds::ThresholdManager;

    #[tokio::test]
    async fn unseen_path_is_hidden_with_default_threshold() {
        let gate = DisplayGate::new(Arc::new(MemoryCounterStore::new(50)));
        let status = gate.status("/never-visited").await.unwrap();
        assert_eq!(status.count, 0);
        assert_eq!(status.display_threshold, 50);
        assert!(!status.should_display);
    }

    #[tokio::test]
    async fn unseen_path_displays_when_default_is_zero() {
        let gate = DisplayGate::new(Arc::new(MemoryCounterStore::new(0)));
        assert!(gate.status("/anything").await.unwrap().should_display);
    }

    #[tokio::test]
    async fn should_display_iff_count_reaches_threshold() {
        let store = Arc::new(MemoryCounterStore::new(50));
        let gate = DisplayGate::new(store.clone());
        let thresholds = ThresholdManager::new(store.clone());

        for (visits, threshold) in [(0u64, 1i64), (2, 3), (3, 3), (4, 3), (0, 0), (7, 0)] {
            let path = format!("/p-{visits}-{threshold}");
            for _ in 0..visits {
                store.upsert_increment(&path).await.unwrap();
            }
            thresholds.set_threshold(&path, threshold).await.unwrap();
            let status = gate.status(&path).await.unwrap();
            assert_eq!(status.count, visits);
            assert_eq!(status.should_display, visits >= threshold as u64, "{path}");
        }
    }

    #[tokio::test]
    async fn pricing_page_scenario() {
        let store = Arc::new(MemoryCounterStore::new(50));
        let recorder = VisitRecorder::new(store.clone());
        let gate = DisplayGate::new(store.clone());

        for _ in 0..49 {
            recorder.record_visit("/pricing").await;
        }
        let status = gate.status("/pricing").await.unwrap();
        assert_eq!(status.count, 49);
        assert!(!status.should_display);

        recorder.record_visit("/pricing").await;
        let status = gate.status("/pricing").await.unwrap();
        assert_eq!(status.count, 50);
        assert!(status.should_display);

        ThresholdManager::new(store.clone()).set_threshold("/fresh", 0).await.unwrap();
        let fresh = gate.status("/fresh").await.unwrap();
        assert_eq!(fresh.count, 0);
        assert!(fresh.should_display);
    }

    #[tokio::test]
    async fn threshold_is_readable_after_write() {
        let store = Arc::new(MemoryCounterStore::new(50));
        ThresholdManager::new(store.clone()).set_threshold("/docs", 12).await.unwrap();
        let status = DisplayGate::new(store).status("/docs").await.unwrap();
        assert_eq!(status.display_threshold, 12);
    }

    #[tokio::test]
    async fn surfaces_storage_errors() {
        let gate = DisplayGate::new(Arc::new(UnavailableStore));
        assert!(matches!(
            gate.status("/pricing").await,
            Err(CounterError::StorageUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn padded_paths_are_not_folded_into_the_bare_path() {
        let store = Arc::new(MemoryCounterStore::new(1));
        let recorder = VisitRecorder::new(store.clone());
        recorder.record_visit(" /pricing").await;
        recorder.record_visit("/pricing ").await;
        assert!(store.is_empty());

        let gate = DisplayGate::new(store);
        assert_eq!(gate.status("/pricing").await.unwrap().count, 0);
        assert!(matches!(
            gate.status(" /pricing").await,
            Err(CounterError::InvalidInput(_))
        ));
    }
}
