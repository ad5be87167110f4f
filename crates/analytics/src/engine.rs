use crate::error::AnalyticsError;
use crate::report::StrategyMetrics;
use core_types::TradeOutcome;
use rust_decimal::Decimal;

/// A stateless calculator for deriving strategy metrics from settled outcomes.
///
/// Metrics are recomputed from the whole outcome set on every call instead of
/// being maintained as running totals, so they can never drift from the log.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates the metrics for one strategy's outcomes in a single pass.
    ///
    /// An empty slice yields zeroed metrics (`win_rate = 0`, `sample_size = 0`).
    /// P&L sums that leave the `Decimal` range fail with `PnlOverflow`.
    pub fn calculate(
        &self,
        outcomes: &[TradeOutcome],
    ) -> Result<StrategyMetrics, AnalyticsError> {
        let mut metrics = StrategyMetrics::new();
        if outcomes.is_empty() {
            return Ok(metrics);
        }

        let mut gross_profit = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;
        let mut priced_wins = 0usize;
        let mut priced_losses = 0usize;

        for outcome in outcomes {
            let won = outcome.result.is_win();
            if won {
                metrics.wins += 1;
            } else {
                metrics.losses += 1;
            }

            if let Some(pnl) = outcome.pnl {
                let overflow = || AnalyticsError::PnlOverflow(outcome.strategy_id.to_string());
                metrics.net_pnl = metrics.net_pnl.checked_add(pnl).ok_or_else(overflow)?;
                if won {
                    gross_profit = gross_profit.checked_add(pnl).ok_or_else(overflow)?;
                    priced_wins += 1;
                } else {
                    gross_loss = gross_loss.checked_add(pnl.abs()).ok_or_else(overflow)?;
                    priced_losses += 1;
                }
            }

            if metrics.last_settled_at.is_none_or(|last| outcome.settled_at > last) {
                metrics.last_settled_at = Some(outcome.settled_at);
            }
        }

        metrics.sample_size = outcomes.len();
        metrics.win_rate = Decimal::from(metrics.wins) / Decimal::from(metrics.sample_size);

        if priced_wins > 0 {
            metrics.average_win = gross_profit / Decimal::from(priced_wins);
        }
        if priced_losses > 0 {
            metrics.average_loss = gross_loss / Decimal::from(priced_losses);
        }

        Ok(metrics)
    }
}
