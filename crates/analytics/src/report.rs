use chrono::{DateTime, Utc};
use core_types::Strategy;
use core_types::StrategyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Summary statistics derived from a strategy's full outcome log.
///
/// This struct is the output of the `AnalyticsEngine` and is what the selector
/// UI renders for a single strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyMetrics {
    /// Fraction of outcomes that were wins, in `[0, 1]`. Zero when there are none.
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
    pub sample_size: usize,
    pub wins: usize,
    pub losses: usize,

    // Only outcomes that carry a pnl contribute below.
    pub net_pnl: Decimal,
    pub average_win: Decimal,
    pub average_loss: Decimal, // magnitude, always >= 0

    pub last_settled_at: Option<DateTime<Utc>>,
}

impl StrategyMetrics {
    /// Creates the zeroed-out metrics of a strategy with no outcomes.
    pub fn new() -> Self {
        Self {
            win_rate: Decimal::ZERO,
            sample_size: 0,
            wins: 0,
            losses: 0,
            net_pnl: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            last_settled_at: None,
        }
    }
}

impl Default for StrategyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A catalog entry joined with its current win rate, as listed by the selector UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategySummary {
    pub id: StrategyId,
    pub name: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub win_rate: Decimal,
    pub sample_size: usize,
}

impl StrategySummary {
    pub fn new(strategy: Strategy, metrics: &StrategyMetrics) -> Self {
        Self {
            id: strategy.id,
            name: strategy.name,
            description: strategy.description,
            win_rate: metrics.win_rate,
            sample_size: metrics.sample_size,
        }
    }
}
