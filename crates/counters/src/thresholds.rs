use crate::error::CounterError;
use crate::store::CounterStore;
use core_types::{validate_path, PathCounter};
use std::sync::Arc;

/// Administers per-path display thresholds.
///
/// Thresholds are per path rather than global: a busy landing page and a rarely
/// visited guide warrant different social-proof cutoffs.
#[derive(Clone)]
pub struct ThresholdManager {
    store: Arc<dyn CounterStore>,
}

impl ThresholdManager {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Sets the display threshold of `path`, creating the path if needed.
    ///
    /// Negative thresholds are rejected before anything is touched. Setting the
    /// value already stored is a no-op and performs no write.
    pub async fn set_threshold(
        &self,
        path: &str,
        threshold: i64,
    ) -> Result<PathCounter, CounterError> {
        let threshold =
            u64::try_from(threshold).map_err(|_| CounterError::InvalidThreshold(threshold))?;
        let path = validate_path(path)?;

        if let Some(current) = self.store.get(path).await? {
            if current.display_threshold == threshold {
                tracing::debug!(path = %path, threshold, "Threshold unchanged.");
                return Ok(current);
            }
        }

        let updated = self.store.set_threshold(path, threshold).await?;
        tracing::info!(path = %path, threshold, "Display threshold updated.");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryCounterStore, UnavailableStore};

    #[tokio::test]
    async fn rejects_negative_thresholds_without_mutation() {
        let store = Arc::new(MemoryCounterStore::new(50));
        let manager = ThresholdManager::new(store.clone());
        let err = manager.set_threshold("/pricing", -1).await.unwrap_err();
        assert!(matches!(err, CounterError::InvalidThreshold(-1)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn repeated_identical_updates_converge() {
        let store = Arc::new(MemoryCounterStore::new(50));
        store.upsert_increment("/pricing").await.unwrap();
        let manager = ThresholdManager::new(store.clone());

        let first = manager.set_threshold("/pricing", 10).await.unwrap();
        let second = manager.set_threshold("/pricing", 10).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.count, 1);
        assert_eq!(second.display_threshold, 10);
    }

    #[tokio::test]
    async fn creates_unseen_paths_with_zero_count() {
        let store = Arc::new(MemoryCounterStore::new(50));
        let manager = ThresholdManager::new(store);
        let counter = manager.set_threshold("/guide", 0).await.unwrap();
        assert_eq!(counter.count, 0);
        assert!(counter.should_display());
    }

    #[tokio::test]
    async fn surfaces_storage_errors() {
        let manager = ThresholdManager::new(Arc::new(UnavailableStore));
        let err = manager.set_threshold("/pricing", 5).await.unwrap_err();
        assert!(matches!(err, CounterError::StorageUnavailable(_)));
    }
}
