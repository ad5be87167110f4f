use crate::repository::DbRepository;
use analytics::{AnalyticsError, OutcomeLog};
use async_trait::async_trait;
use core_types::{PathCounter, StrategyId, TradeOutcome};
use counters::{CounterError, CounterStore};

/// A `CounterStore` backed by the `path_counters` table.
#[derive(Debug, Clone)]
pub struct PgCounterStore {
    repo: DbRepository,
    default_threshold: u64,
}

impl PgCounterStore {
    pub fn new(repo: DbRepository, default_threshold: u64) -> Self {
        Self { repo, default_threshold }
    }
}

#[async_trait]
impl CounterStore for PgCounterStore {
    fn default_threshold(&self) -> u64 {
        self.default_threshold
    }

    async fn get(&self, path: &str) -> Result<Option<PathCounter>, CounterError> {
        Ok(self.repo.get_path_counter(path).await?)
    }

    async fn upsert_increment(&self, path: &str) -> Result<PathCounter, CounterError> {
        Ok(self.repo.increment_path_counter(path, self.default_threshold).await?)
    }

    async fn set_threshold(&self, path: &str, threshold: u64) -> Result<PathCounter, CounterError> {
        Ok(self.repo.set_path_threshold(path, threshold).await?)
    }
}

/// An `OutcomeLog` backed by the `trade_outcomes` table.
#[derive(Debug, Clone)]
pub struct PgOutcomeLog {
    repo: DbRepository,
}

impl PgOutcomeLog {
    pub fn new(repo: DbRepository) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl OutcomeLog for PgOutcomeLog {
    async fn append(&self, outcome: &TradeOutcome) -> Result<(), AnalyticsError> {
        Ok(self.repo.save_trade_outcome(outcome).await?)
    }

    async fn outcomes_for(
        &self,
        strategy_id: &StrategyId,
    ) -> Result<Vec<TradeOutcome>, AnalyticsError> {
        Ok(self.repo.get_trade_outcomes(strategy_id).await?)
    }
}
