use analytics::AnalyticsError;
use counters::CounterError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to load environment variables for database connection: {0}")]
    ConnectionConfigError(String),

    #[error("Failed to connect to the database: {0}")]
    ConnectionError(#[from] sqlx::Error),

    #[error("Database migration failed: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("A row held a value the domain cannot represent: {0}")]
    InvalidRow(String),
}

// Every database failure looks the same to the services above: storage is unavailable.

impl From<DbError> for CounterError {
    fn from(e: DbError) -> Self {
        CounterError::StorageUnavailable(e.to_string())
    }
}

impl From<DbError> for AnalyticsError {
    fn from(e: DbError) -> Self {
        AnalyticsError::StorageUnavailable(e.to_string())
    }
}
