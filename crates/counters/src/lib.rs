//! # Footfall Counters
//!
//! Per-path visit counting and display gating.
//!
//! - `CounterStore`: the storage seam. `MemoryCounterStore` is the sharded
//!   in-process implementation; the `database` crate provides a PostgreSQL one.
//! - `VisitRecorder` / `VisitDispatcher`: best-effort, fire-and-forget increments.
//! - `ThresholdManager`: idempotent per-path threshold updates.
//! - `DisplayGate`: `count >= threshold` evaluation.
//!
//! Recording and querying are separate operations on purpose. A caller that
//! records a visit and immediately asks for the status only sees its own visit
//! if it awaited the recording first.

pub mod error;
pub mod gate;
pub mod recorder;
pub mod store;
pub mod thresholds;

pub use error::CounterError;
pub use gate::DisplayGate;
pub use recorder::{RecorderWorker, VisitDispatcher, VisitRecorder};
pub use store::{CounterStore, MemoryCounterStore};
pub use thresholds::ThresholdManager;
