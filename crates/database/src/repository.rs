use crate::DbError;
use chrono::{DateTime, Utc};
use core_types::{PathCounter, StrategyId, TradeOutcome, TradeResult};
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;
use sqlx::FromRow;
use uuid::Uuid;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

/// Represents a row from the `path_counters` table.
#[derive(Debug, Clone, FromRow)]
pub struct DbPathCounter {
    pub path: String,
    pub visit_count: i64,
    pub display_threshold: i64,
}

impl TryFrom<DbPathCounter> for PathCounter {
    type Error = DbError;

    fn try_from(row: DbPathCounter) -> Result<Self, Self::Error> {
        let count = u64::try_from(row.visit_count)
            .map_err(|_| DbError::InvalidRow(format!("negative visit_count for '{}'", row.path)))?;
        let display_threshold = u64::try_from(row.display_threshold).map_err(|_| {
            DbError::InvalidRow(format!("negative display_threshold for '{}'", row.path))
        })?;
        Ok(PathCounter {
            path: row.path,
            count,
            display_threshold,
        })
    }
}

/// Represents a row from the `trade_outcomes` table.
#[derive(Debug, Clone, FromRow)]
pub struct DbTradeOutcome {
    pub outcome_id: Uuid,
    pub strategy_id: String,
    pub won: bool,
    pub symbol: Option<String>,
    pub pnl: Option<Decimal>,
    pub settled_at: DateTime<Utc>,
}

impl TryFrom<DbTradeOutcome> for TradeOutcome {
    type Error = DbError;

    fn try_from(row: DbTradeOutcome) -> Result<Self, Self::Error> {
        let strategy_id = StrategyId::new(row.strategy_id)
            .map_err(|e| DbError::InvalidRow(e.to_string()))?;
        Ok(TradeOutcome {
            outcome_id: row.outcome_id,
            strategy_id,
            result: TradeResult::from(row.won),
            symbol: row.symbol,
            pnl: row.pnl,
            settled_at: row.settled_at,
        })
    }
}

/// Thresholds are `u64` in the domain and `BIGINT` in the table.
fn to_db_threshold(threshold: u64) -> Result<i64, DbError> {
    i64::try_from(threshold)
        .map_err(|_| DbError::InvalidRow(format!("threshold {threshold} exceeds BIGINT range")))
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_path_counter(&self, path: &str) -> Result<Option<PathCounter>, DbError> {
        let row = sqlx::query_as::<_, DbPathCounter>(
            "SELECT path, visit_count, display_threshold FROM path_counters WHERE path = $1",
        )
        .bind(path)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PathCounter::try_from).transpose()
    }

    /// Adds one visit to `path`, creating it with `default_threshold` if needed.
    ///
    /// The upsert is a single statement, so PostgreSQL's row lock serializes
    /// concurrent increments of one path while other paths proceed in parallel.
    pub async fn increment_path_counter(
        &self,
        path: &str,
        default_threshold: u64,
    ) -> Result<PathCounter, DbError> {
        let row = sqlx::query_as::<_, DbPathCounter>(
            r#"
            INSERT INTO path_counters (path, visit_count, display_threshold)
            VALUES ($1, 1, $2)
            ON CONFLICT (path) DO UPDATE
                SET visit_count = path_counters.visit_count + 1,
                    updated_at = NOW()
            RETURNING path, visit_count, display_threshold
            "#,
        )
        .bind(path)
        .bind(to_db_threshold(default_threshold)?)
        .fetch_one(&self.pool)
        .await?;

        PathCounter::try_from(row)
    }

    /// Sets the display threshold of `path`, creating it with zero visits if needed.
    /// Only the threshold column is written; the visit count is left alone.
    pub async fn set_path_threshold(
        &self,
        path: &str,
        threshold: u64,
    ) -> Result<PathCounter, DbError> {
        let row = sqlx::query_as::<_, DbPathCounter>(
            r#"
            INSERT INTO path_counters (path, visit_count, display_threshold)
            VALUES ($1, 0, $2)
            ON CONFLICT (path) DO UPDATE
                SET display_threshold = EXCLUDED.display_threshold,
                    updated_at = NOW()
            RETURNING path, visit_count, display_threshold
            "#,
        )
        .bind(path)
        .bind(to_db_threshold(threshold)?)
        .fetch_one(&self.pool)
        .await?;

        PathCounter::try_from(row)
    }

    /// Appends a settled trade outcome.
    /// Re-delivery of an outcome id that is already stored is ignored.
    pub async fn save_trade_outcome(&self, outcome: &TradeOutcome) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO trade_outcomes (outcome_id, strategy_id, won, symbol, pnl, settled_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (outcome_id) DO NOTHING
            "#,
        )
        .bind(outcome.outcome_id)
        .bind(outcome.strategy_id.as_str())
        .bind(outcome.result.is_win())
        .bind(outcome.symbol.as_deref())
        .bind(outcome.pnl)
        .bind(outcome.settled_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Fetches every outcome of a strategy, in the order they were appended.
    pub async fn get_trade_outcomes(
        &self,
        strategy_id: &StrategyId,
    ) -> Result<Vec<TradeOutcome>, DbError> {
        let rows = sqlx::query_as::<_, DbTradeOutcome>(
            r#"
            SELECT outcome_id, strategy_id, won, symbol, pnl, settled_at
            FROM trade_outcomes
            WHERE strategy_id = $1
            ORDER BY seq ASC
            "#,
        )
        .bind(strategy_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TradeOutcome::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn path_counter_rows_convert() {
        let counter = PathCounter::try_from(DbPathCounter {
            path: "/pricing".to_string(),
            visit_count: 50,
            display_threshold: 50,
        })
        .unwrap();
        assert_eq!(counter.count, 50);
        assert!(counter.should_display());
    }

    #[test]
    fn negative_columns_are_rejected() {
        let err = PathCounter::try_from(DbPathCounter {
            path: "/pricing".to_string(),
            visit_count: -1,
            display_threshold: 0,
        })
        .unwrap_err();
        assert!(matches!(err, DbError::InvalidRow(_)));
    }

    #[test]
    fn outcome_rows_convert() {
        let outcome = TradeOutcome::try_from(DbTradeOutcome {
            outcome_id: Uuid::new_v4(),
            strategy_id: "momentum-pro".to_string(),
            won: false,
            symbol: Some("BTCUSDT".to_string()),
            pnl: Some(dec!(-12.5)),
            settled_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(outcome.result, TradeResult::Loss);
        assert_eq!(outcome.pnl, Some(dec!(-12.5)));
    }

    #[test]
    fn thresholds_beyond_bigint_are_rejected() {
        assert_eq!(to_db_threshold(50).unwrap(), 50);
        assert!(to_db_threshold(u64::MAX).is_err());
    }
}
