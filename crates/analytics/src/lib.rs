//! # Footfall Analytics Engine
//!
//! This crate turns settled trade outcomes into the summary metrics the strategy
//! selector displays.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Depends only on `core-types`. Storage is reached through
//!   the `OutcomeLog` trait; the PostgreSQL implementation lives in `database`.
//! - **Stateless Calculation:** The `AnalyticsEngine` is a pure function of an
//!   outcome slice. Nothing caches a win rate, so it always matches the log.
//!
//! ## Public API
//!
//! - `StrategyMetricsAggregator`: `search`, `select`, `metrics_for`, `summaries`, `record_outcome`.
//! - `StrategyCatalog`: the ordered, configured strategy list.
//! - `OutcomeLog` / `MemoryOutcomeLog`: the append-only outcome store.
//! - `AnalyticsEngine`, `StrategyMetrics`, `StrategySummary`, `AnalyticsError`.

// Declare the modules that constitute this crate.
pub mod aggregator;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod outcomes;
pub mod report;

// Re-export the key components to create a clean, public-facing API.
pub use aggregator::StrategyMetricsAggregator;
pub use catalog::StrategyCatalog;
pub use engine::AnalyticsEngine;
pub use error::AnalyticsError;
pub use outcomes::{MemoryOutcomeLog, OutcomeLog};
pub use report::{StrategyMetrics, StrategySummary};
