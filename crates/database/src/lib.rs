//! # Footfall Database Crate
//!
//! This crate acts as a high-level, application-specific interface to the
//! PostgreSQL database. It is the durable home of visit counters and the
//! append-only trade outcome log.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all database-specific logic and
//!   exposes it through the storage traits of `counters` and `analytics`.
//! - **Per-row atomicity:** Counter mutations are single `INSERT .. ON CONFLICT`
//!   statements, so concurrency is scoped to the row of one path.
//! - **Asynchronous & Pooled:** All operations are asynchronous over a shared `PgPool`.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: pool setup and schema migration.
//! - `DbRepository`: the SQL layer.
//! - `PgCounterStore`, `PgOutcomeLog`: the trait adapters used by the services.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;
pub mod stores;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::DbRepository;
pub use stores::{PgCounterStore, PgOutcomeLog};
