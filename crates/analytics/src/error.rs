use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Strategy not found: {0}")]
    NotFound(String),

    #[error("Invalid trade outcome: {0}")]
    InvalidOutcome(String),

    #[error("P&L totals for strategy {0} exceed the decimal range")]
    PnlOverflow(String),

    #[error("Outcome storage is unavailable: {0}")]
    StorageUnavailable(String),
}
