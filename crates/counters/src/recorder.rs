use crate::store::CounterStore;
use chrono::Utc;
use core_types::{validate_path, VisitEvent};
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::{JoinHandle, JoinSet};

/// Records visits into a `CounterStore`.
///
/// Recording is best-effort: a visit that cannot be stored is logged and
/// dropped. Nothing here ever returns an error to the caller, and the new count
/// is deliberately not returned; callers who need it ask the `DisplayGate`.
#[derive(Clone)]
pub struct VisitRecorder {
    store: Arc<dyn CounterStore>,
}

impl VisitRecorder {
    pub fn new(store: Arc<dyn CounterStore>) -> Self {
        Self { store }
    }

    /// Increments the counter for `path` by exactly one, or logs why it could not.
    pub async fn record_visit(&self, path: &str) {
        let path = match validate_path(path) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring visit with an invalid path.");
                return;
            }
        };

        match self.store.upsert_increment(path).await {
            Ok(counter) => {
                tracing::debug!(path = %path, count = counter.count, "Visit recorded.");
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to record visit; dropping it.");
            }
        }
    }

    async fn record_event(&self, event: VisitEvent) {
        let queued_ms = (Utc::now() - event.received_at).num_milliseconds();
        tracing::trace!(path = %event.path, queued_ms, "Applying queued visit.");
        self.record_visit(&event.path).await;
    }
}

/// The non-blocking front of a `VisitRecorder`.
///
/// `dispatch` hands the visit to a bounded queue and returns immediately. A
/// background worker applies queued visits, each in its own task, with at most
/// `max_in_flight` running at once. When the store falls behind, the worker
/// stops draining, the queue fills up and further visits are dropped.
/// Cloning shares the same queue.
#[derive(Clone)]
pub struct VisitDispatcher {
    tx: mpsc::Sender<VisitEvent>,
}

/// Owns the background worker of a `VisitDispatcher`.
pub struct RecorderWorker {
    handle: JoinHandle<()>,
}

impl VisitDispatcher {
    /// Starts the recorder worker. Must be called from within a Tokio runtime.
    pub fn spawn(
        recorder: VisitRecorder,
        queue_capacity: usize,
        max_in_flight: usize,
    ) -> (Self, RecorderWorker) {
        let (tx, rx) = mpsc::channel(queue_capacity.max(1));
        let handle = tokio::spawn(run_recorder_worker(recorder, rx, max_in_flight.max(1)));
        (Self { tx }, RecorderWorker { handle })
    }

    /// Queues a visit for `path`. Returns whether the visit was accepted.
    ///
    /// A full or closed queue drops the visit with a warning; visit loss is
    /// preferable to back-pressure on the caller.
    pub fn dispatch(&self, path: &str) -> bool {
        let path = match validate_path(path) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring visit with an invalid path.");
                return false;
            }
        };

        match self.tx.try_send(VisitEvent::new(path)) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                tracing::warn!(path = %event.path, "Visit queue is full; dropping visit.");
                false
            }
            Err(TrySendError::Closed(event)) => {
                tracing::warn!(path = %event.path, "Visit recorder has shut down; dropping visit.");
                false
            }
        }
    }
}

impl RecorderWorker {
    /// Waits until every accepted visit has been applied.
    ///
    /// The worker only finishes once all `VisitDispatcher` clones are dropped.
    pub async fn join(self) {
        if let Err(e) = self.handle.await {
            tracing::error!(error = %e, "Visit recorder worker panicked.");
        }
    }
}

async fn run_recorder_worker(
    recorder: VisitRecorder,
    mut rx: mpsc::Receiver<VisitEvent>,
    max_in_flight: usize,
) {
    tracing::info!(max_in_flight, "Visit recorder started.");
    let permits = Arc::new(Semaphore::new(max_in_flight));
    let mut in_flight = JoinSet::new();

    loop {
        // Wait for a free slot before taking the next visit, so a slow store
        // leaves the backlog in the bounded queue.
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let Some(event) = rx.recv().await else {
            break;
        };
        let recorder = recorder.clone();
        in_flight.spawn(async move {
            recorder.record_event(event).await;
            drop(permit);
        });
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}
    tracing::info!("Visit recorder drained and stopped.");
}
