//! # Footfall Core Types
//!
//! The shared vocabulary of the workspace. Every other crate speaks in terms of
//! these structs, so this crate depends on nothing internal.
//!
//! - Visit tracking: `PathCounter`, `VisitEvent`, `VisitStatus`.
//! - Strategy analytics: `Strategy`, `StrategyId`, `TradeOutcome`.

pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{StorageBackend, TradeResult};
pub use error::CoreError;
pub use structs::{
    validate_path, PathCounter, Strategy, StrategyId, TradeOutcome, VisitEvent, VisitStatus,
};
