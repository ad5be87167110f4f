use crate::error::CounterError;
use async_trait::async_trait;
use core_types::PathCounter;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// The single source of truth for per-path visit counts and display thresholds.
///
/// Every operation must be linearizable per path: two concurrent increments of
/// the same path are both reflected, and a `get` that starts after an increment
/// completed observes it. Different paths must never contend on one lock.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// The threshold a path receives when it is first created.
    fn default_threshold(&self) -> u64;

    async fn get(&self, path: &str) -> Result<Option<PathCounter>, CounterError>;

    /// Creates the path with `count = 0` if absent, then adds one, as one step.
    async fn upsert_increment(&self, path: &str) -> Result<PathCounter, CounterError>;

    /// Creates the path with `count = 0` if absent, then sets its threshold.
    async fn set_threshold(&self, path: &str, threshold: u64) -> Result<PathCounter, CounterError>;
}

/// The mutable state of one path. Count and threshold are independent atomics,
/// so an administrative threshold change never waits on the increment stream.
#[derive(Debug)]
struct PathCell {
    count: AtomicU64,
    display_threshold: AtomicU64,
}

impl PathCell {
    fn new(display_threshold: u64) -> Self {
        Self {
            count: AtomicU64::new(0),
            display_threshold: AtomicU64::new(display_threshold),
        }
    }

    fn snapshot(&self, path: &str) -> PathCounter {
        PathCounter {
            path: path.to_string(),
            count: self.count.load(Ordering::Acquire),
            display_threshold: self.display_threshold.load(Ordering::Acquire),
        }
    }
}

/// A process-local `CounterStore`.
///
/// Paths live in a sharded `DashMap`; the shard lock is only taken to look up
/// or insert a cell; the read-modify-write itself is a single atomic op.
#[derive(Debug)]
pub struct MemoryCounterStore {
    cells: DashMap<String, Arc<PathCell>>,
    default_threshold: u64,
}

impl MemoryCounterStore {
    pub fn new(default_threshold: u64) -> Self {
        Self {
            cells: DashMap::new(),
            default_threshold,
        }
    }

    /// Number of distinct paths seen so far.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn cell(&self, path: &str) -> Arc<PathCell> {
        if let Some(existing) = self.cells.get(path) {
            return Arc::clone(existing.value());
        }
        let entry = self
            .cells
            .entry(path.to_string())
            .or_insert_with(|| Arc::new(PathCell::new(self.default_threshold)));
        Arc::clone(entry.value())
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    fn default_threshold(&self) -> u64 {
        self.default_threshold
    }

    async fn get(&self, path: &str) -> Result<Option<PathCounter>, CounterError> {
        Ok(self.cells.get(path).map(|cell| cell.snapshot(path)))
    }

    async fn upsert_increment(&self, path: &str) -> Result<PathCounter, CounterError> {
        let cell = self.cell(path);
        let count = cell.count.fetch_add(1, Ordering::AcqRel) + 1;
        Ok(PathCounter {
            path: path.to_string(),
            count,
            display_threshold: cell.display_threshold.load(Ordering::Acquire),
        })
    }

    async fn set_threshold(&self, path: &str, threshold: u64) -> Result<PathCounter, CounterError> {
        let cell = self.cell(path);
        cell.display_threshold.store(threshold, Ordering::Release);
        Ok(PathCounter {
            path: path.to_string(),
            count: cell.count.load(Ordering::Acquire),
            display_threshold: threshold,
        })
    }
}

/// A store whose backend is always down. Used to exercise error propagation.
#[cfg(test)]
pub(crate) struct UnavailableStore;

#[cfg(test)]
#[async_trait]
impl CounterStore for UnavailableStore {
    fn default_threshold(&self) -> u64 {
        50
    }

    async fn get(&self, _path: &str) -> Result<Option<PathCounter>, CounterError> {
        Err(CounterError::StorageUnavailable("connection refused".to_string()))
    }

    async fn upsert_increment(&self, _path: &str) -> Result<PathCounter, CounterError> {
        Err(CounterError::StorageUnavailable("connection refused".to_string()))
    }

    async fn set_threshold(
        &self,
        _path: &str,
        _threshold: u64,
    ) -> Result<PathCounter, CounterError> {
        Err(CounterError::StorageUnavailable("connection refused".to_string()))
    }
}
