use crate::catalog::StrategyCatalog;
use crate::engine::AnalyticsEngine;
use crate::error::AnalyticsError;
use crate::outcomes::OutcomeLog;
use crate::report::{StrategyMetrics, StrategySummary};
use core_types::{Strategy, StrategyId, TradeOutcome};
use rust_decimal::Decimal;
use std::sync::Arc;

/// Largest accepted |pnl| for a single outcome. Keeps strategy totals far
/// inside the `Decimal` range.
const MAX_ABS_PNL: i64 = 1_000_000_000_000_000;

/// Serves the strategy selector: catalog lookups plus metrics derived on read.
///
/// The read path never writes. Metrics are recomputed from the full outcome
/// log on every call, which costs O(outcomes) but keeps them exact.
#[derive(Clone)]
pub struct StrategyMetricsAggregator {
    catalog: Arc<StrategyCatalog>,
    outcomes: Arc<dyn OutcomeLog>,
    engine: Arc<AnalyticsEngine>,
}

impl StrategyMetricsAggregator {
    pub fn new(catalog: StrategyCatalog, outcomes: Arc<dyn OutcomeLog>) -> Self {
        Self {
            catalog: Arc::new(catalog),
            outcomes,
            engine: Arc::new(AnalyticsEngine::new()),
        }
    }

    /// Case-insensitive name search in catalog order; an empty query lists everything.
    pub fn search(&self, query: &str) -> Vec<Strategy> {
        self.catalog.search(query)
    }

    pub fn select(&self, strategy_id: &StrategyId) -> Result<Strategy, AnalyticsError> {
        self.catalog
            .get(strategy_id)
            .cloned()
            .ok_or_else(|| AnalyticsError::NotFound(strategy_id.to_string()))
    }

    pub async fn metrics_for(
        &self,
        strategy_id: &StrategyId,
    ) -> Result<StrategyMetrics, AnalyticsError> {
        self.select(strategy_id)?;
        let outcomes = self.outcomes.outcomes_for(strategy_id).await?;
        self.engine.calculate(&outcomes)
    }

    /// `search` joined with each match's current win rate.
    pub async fn summaries(&self, query: &str) -> Result<Vec<StrategySummary>, AnalyticsError> {
        let mut summaries = Vec::new();
        for strategy in self.search(query) {
            let outcomes = self.outcomes.outcomes_for(&strategy.id).await?;
            let metrics = self.engine.calculate(&outcomes)?;
            summaries.push(StrategySummary::new(strategy, &metrics));
        }
        Ok(summaries)
    }

    /// Appends a settled outcome to its strategy's log.
    ///
    /// The log is append-only, so an outcome whose pnl could later break the
    /// strategy's totals is refused here rather than stored.
    pub async fn record_outcome(
        &self,
        outcome: TradeOutcome,
    ) -> Result<TradeOutcome, AnalyticsError> {
        self.select(&outcome.strategy_id)?;
        if let Some(pnl) = outcome.pnl.filter(|pnl| pnl.abs() > Decimal::from(MAX_ABS_PNL)) {
            return Err(AnalyticsError::InvalidOutcome(format!(
                "pnl {pnl} is outside ±{MAX_ABS_PNL}"
            )));
        }
        self.outcomes.append(&outcome).await?;
        tracing::debug!(
            strategy_id = %outcome.strategy_id,
            outcome_id = %outcome.outcome_id,
            result = ?outcome.result,
            "Trade outcome recorded."
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outcomes::MemoryOutcomeLog;
    use core_types::TradeResult;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn id(raw: &str) -> StrategyId {
        StrategyId::new(raw).unwrap()
    }

    fn aggregator() -> StrategyMetricsAggregator {
        let catalog = StrategyCatalog::new([
            Strategy {
                id: id("momentum-pro"),
                name: "Momentum Pro".into(),
                description: "4h trend".into(),
            },
            Strategy {
                id: id("mean-revert"),
                name: "Mean Reversion".into(),
                description: String::new(),
            },
        ]);
        StrategyMetricsAggregator::new(catalog, Arc::new(MemoryOutcomeLog::new()))
    }

    #[tokio::test]
    async fn metrics_for_strategy_without_outcomes_are_zero() {
        let metrics = aggregator().metrics_for(&id("mean-revert")).await.unwrap();
        assert_eq!(metrics.win_rate, Decimal::ZERO);
        assert_eq!(metrics.sample_size, 0);
    }

    #[tokio::test]
    async fn metrics_follow_recorded_outcomes() {
        let aggregator = aggregator();
        for result in [TradeResult::Win, TradeResult::Win, TradeResult::Loss, TradeResult::Win] {
            aggregator
                .record_outcome(TradeOutcome::new(id("momentum-pro"), result))
                .await
                .unwrap();
        }
        let metrics = aggregator.metrics_for(&id("momentum-pro")).await.unwrap();
        assert_eq!(metrics.win_rate, dec!(0.75));
        assert_eq!(metrics.sample_size, 4);

        let summaries = aggregator.summaries("").await.unwrap();
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[0].win_rate, dec!(0.75));
        assert_eq!(summaries[1].sample_size, 0);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let aggregator = aggregator();
        assert!(matches!(aggregator.select(&id("ghost")), Err(AnalyticsError::NotFound(_))));
        assert!(matches!(
            aggregator.metrics_for(&id("ghost")).await,
            Err(AnalyticsError::NotFound(_))
        ));
        assert!(matches!(
            aggregator.record_outcome(TradeOutcome::new(id("ghost"), TradeResult::Win)).await,
            Err(AnalyticsError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn select_returns_catalog_entry() {
        let strategy = aggregator().select(&id("momentum-pro")).unwrap();
        assert_eq!(strategy.name, "Momentum Pro");
        assert_eq!(strategy.description, "4h trend");
    }

    #[tokio::test]
    async fn out_of_range_pnl_is_refused_and_metrics_stay_readable() {
        let aggregator = aggregator();
        let huge = TradeOutcome::new(id("momentum-pro"), TradeResult::Win).with_pnl(Decimal::MAX);
        for _ in 0..2 {
            assert!(matches!(
                aggregator.record_outcome(huge.clone()).await,
                Err(AnalyticsError::InvalidOutcome(_))
            ));
        }
        aggregator
            .record_outcome(
                TradeOutcome::new(id("momentum-pro"), TradeResult::Loss).with_pnl(dec!(-25)),
            )
            .await
            .unwrap();

        let metrics = aggregator.metrics_for(&id("momentum-pro")).await.unwrap();
        assert_eq!(metrics.sample_size, 1);
        assert_eq!(metrics.net_pnl, dec!(-25));
        assert_eq!(aggregator.summaries("").await.unwrap().len(), 2);
    }
}
