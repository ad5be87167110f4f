use crate::error::AnalyticsError;
use async_trait::async_trait;
use core_types::{StrategyId, TradeOutcome};
use dashmap::DashMap;

/// The append-only record of settled trades, keyed by strategy.
///
/// Outcomes are never edited or removed. Appends for one strategy must be
/// atomic; reads return outcomes in append order.
#[async_trait]
pub trait OutcomeLog: Send + Sync {
    async fn append(&self, outcome: &TradeOutcome) -> Result<(), AnalyticsError>;

    async fn outcomes_for(
        &self,
        strategy_id: &StrategyId,
    ) -> Result<Vec<TradeOutcome>, AnalyticsError>;
}

/// A process-local `OutcomeLog`. Each strategy's log sits behind its own shard
/// entry, so ingestion for one strategy never blocks reads of another.
#[derive(Debug, Default)]
pub struct MemoryOutcomeLog {
    logs: DashMap<StrategyId, Vec<TradeOutcome>>,
}

impl MemoryOutcomeLog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OutcomeLog for MemoryOutcomeLog {
    async fn append(&self, outcome: &TradeOutcome) -> Result<(), AnalyticsError> {
        self.logs
            .entry(outcome.strategy_id.clone())
            .or_default()
            .push(outcome.clone());
        Ok(())
    }

    async fn outcomes_for(
        &self,
        strategy_id: &StrategyId,
    ) -> Result<Vec<TradeOutcome>, AnalyticsError> {
        Ok(self
            .logs
            .get(strategy_id)
            .map(|log| log.value().clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::TradeResult;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_are_all_kept() {
        let log = Arc::new(MemoryOutcomeLog::new());
        let id = StrategyId::new("momentum-pro").unwrap();
        let mut handles = Vec::new();
        for i in 0..100 {
            let log = Arc::clone(&log);
            let id = id.clone();
            handles.push(tokio::spawn(async move {
                log.append(&TradeOutcome::new(id, TradeResult::from(i % 2 == 0)))
                    .await
                    .unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(log.outcomes_for(&id).await.unwrap().len(), 100);
    }

    #[tokio::test]
    async fn unknown_strategy_has_empty_log() {
        let log = MemoryOutcomeLog::new();
        let id = StrategyId::new("nobody").unwrap();
        assert!(log.outcomes_for(&id).await.unwrap().is_empty());
    }
}
