use crate::enums::TradeResult;
use crate::error::CoreError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Checks that `raw` can be used as a counter key.
///
/// Paths are opaque keys: no trimming, no case folding and no trailing-slash
/// rewriting, so `/Pricing` and `/pricing` are two distinct counters. Empty
/// paths and paths with leading or trailing whitespace are rejected, because
/// they would otherwise silently become counters of their own.
pub fn validate_path(raw: &str) -> Result<&str, CoreError> {
    if raw.is_empty() {
        return Err(CoreError::InvalidInput(
            "path".to_string(),
            "must not be empty".to_string(),
        ));
    }
    if raw.trim() != raw {
        return Err(CoreError::InvalidInput(
            "path".to_string(),
            format!("{raw:?} has leading or trailing whitespace"),
        ));
    }
    Ok(raw)
}

/// The visit counter and display threshold for one logical path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathCounter {
    pub path: String,
    pub count: u64,
    pub display_threshold: u64,
}

impl PathCounter {
    /// A counter that has not seen any visits yet.
    pub fn new(path: impl Into<String>, display_threshold: u64) -> Self {
        Self {
            path: path.into(),
            count: 0,
            display_threshold,
        }
    }

    pub fn should_display(&self) -> bool {
        self.count >= self.display_threshold
    }
}

/// A single visit, as handed from the HTTP layer to the recorder queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitEvent {
    pub path: String,
    pub received_at: DateTime<Utc>,
}

impl VisitEvent {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            received_at: Utc::now(),
        }
    }
}

/// The answer to "should the social-proof counter be shown for this path?".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitStatus {
    pub path: String,
    pub count: u64,
    pub display_threshold: u64,
    pub should_display: bool,
}

impl From<PathCounter> for VisitStatus {
    fn from(counter: PathCounter) -> Self {
        let should_display = counter.should_display();
        Self {
            path: counter.path,
            count: counter.count,
            display_threshold: counter.display_threshold,
            should_display,
        }
    }
}

/// The catalog identifier of a strategy (e.g. `"momentum-pro"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrategyId(String);

impl StrategyId {
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "strategy id".to_string(),
                "must not be empty".to_string(),
            ));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A catalog entry. Metrics are never stored here; they are derived from the
/// strategy's outcome log on read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub id: StrategyId,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// A settled trade attributed to a strategy. Outcomes are append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeOutcome {
    pub outcome_id: Uuid,
    pub strategy_id: StrategyId,
    pub result: TradeResult,
    pub symbol: Option<String>,
    /// Realized profit or loss, when the execution system reports it.
    pub pnl: Option<Decimal>,
    pub settled_at: DateTime<Utc>,
}

impl TradeOutcome {
    /// A bare win/loss outcome settled now.
    pub fn new(strategy_id: StrategyId, result: TradeResult) -> Self {
        Self {
            outcome_id: Uuid::new_v4(),
            strategy_id,
            result,
            symbol: None,
            pnl: None,
            settled_at: Utc::now(),
        }
    }

    pub fn with_pnl(mut self, pnl: Decimal) -> Self {
        self.pnl = Some(pnl);
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn settled_at(mut self, settled_at: DateTime<Utc>) -> Self {
        self.settled_at = settled_at;
        self
    }
}
