use core_types::StorageBackend;
use std::collections::HashSet;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use settings::{
    Config, CounterSettings, LoggingSettings, RecorderSettings, ServerSettings, StorageSettings,
};

/// The prefix for environment overrides, e.g. `FOOTFALL__SERVER__PORT=8080`.
pub const ENV_PREFIX: &str = "FOOTFALL";

/// Loads the application configuration from a TOML file plus environment overrides.
///
/// A missing file is not an error: every section has defaults, so a bare
/// environment is enough to boot an in-memory instance.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    finalize(config)
}

/// Parses configuration from an in-memory TOML document, without environment overrides.
pub fn load_config_from_str(toml: &str) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?;

    let config = builder.try_deserialize::<Config>()?;
    finalize(config)
}

fn finalize(mut config: Config) -> Result<Config, ConfigError> {
    if config.storage.backend == StorageBackend::Postgres && config.storage.database_url.is_none() {
        dotenvy::dotenv().ok();
        config.storage.database_url = std::env::var("DATABASE_URL").ok();
    }
    validate(&config)?;
    tracing::debug!(
        strategies = config.strategies.len(),
        backend = ?config.storage.backend,
        "Configuration loaded."
    );
    Ok(config)
}

/// Rejects configurations the services cannot run with.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.recorder.queue_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "recorder.queue_capacity must be greater than zero".to_string(),
        ));
    }

    if config.recorder.max_in_flight == 0 {
        return Err(ConfigError::ValidationError(
            "recorder.max_in_flight must be greater than zero".to_string(),
        ));
    }

    if config.storage.backend == StorageBackend::Postgres && config.storage.database_url.is_none() {
        return Err(ConfigError::ValidationError(
            "storage.database_url (or DATABASE_URL) must be set for the postgres backend"
                .to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for strategy in &config.strategies {
        if strategy.id.as_str().trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "strategy ids must not be empty".to_string(),
            ));
        }
        if strategy.name.trim().is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "strategy '{}' has an empty name",
                strategy.id
            )));
        }
        if !seen.insert(strategy.id.clone()) {
            return Err(ConfigError::ValidationError(format!(
                "duplicate strategy id '{}'",
                strategy.id
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
        [server]
        port = 8080

        [counters]
        default_display_threshold = 25

        [[strategies]]
        id = "momentum-pro"
        name = "Momentum Pro"
        description = "Trend following on 4h bars"

        [[strategies]]
        id = "mean-revert"
        name = "Mean Reversion"
    "#;

    #[test]
    fn parses_sections_and_keeps_catalog_order() {
        let config = load_config_from_str(SAMPLE).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.counters.default_display_threshold, 25);
        assert_eq!(config.recorder.queue_capacity, 1024);
        assert_eq!(config.recorder.max_in_flight, 16);
        let ids: Vec<_> = config.strategies.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, vec!["momentum-pro", "mean-revert"]);
        assert_eq!(config.strategies[1].description, "");
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.counters.default_display_threshold, 50);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.server.socket_addr().port(), 3000);
    }

    #[test]
    fn rejects_duplicate_strategy_ids() {
        let toml = r#"
            [[strategies]]
            id = "a"
            name = "A"
            [[strategies]]
            id = "a"
            name = "Again"
        "#;
        let err = load_config_from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("duplicate")));
    }

    #[test]
    fn rejects_zero_queue_capacity() {
        let err = load_config_from_str("[recorder]\nqueue_capacity = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = load_config_from_str("[recorder]\nmax_in_flight = 0").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(msg) if msg.contains("max_in_flight")));
    }

    #[test]
    fn loads_from_file_on_disk() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.strategies.len(), 2);
    }
}
