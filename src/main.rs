use analytics::StrategySummary;
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Table};
use configuration::{Config, LoggingSettings};
use core_types::StorageBackend;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// The main entry point for the Footfall analytics service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; only the postgres backend needs one.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = configuration::load_config(&cli.config)?;
    // Held until exit so buffered file logs are flushed.
    let _guard = init_tracing(&config.logging);
    tracing::debug!(config = %cli.config.display(), "Configuration loaded.");

    match cli.command {
        Commands::Serve => web_server::run_server(config).await?,
        Commands::Strategies { query } => {
            handle_strategies(&config, query.as_deref().unwrap_or("")).await?
        }
        Commands::Status { path } => handle_status(&config, &path).await?,
        Commands::Threshold { path, value } => handle_threshold(&config, &path, value).await?,
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Visit counting, display gating and strategy metrics.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, global = true, default_value = "footfall.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service until Ctrl-C.
    Serve,
    /// List strategies matching a name query, with their win rates.
    Strategies {
        /// Case-insensitive substring of the strategy name. Lists all when omitted.
        #[arg(long)]
        query: Option<String>,
    },
    /// Show the visit count and display decision for a path (postgres backend).
    Status {
        #[arg(long)]
        path: String,
    },
    /// Set the display threshold of a path (postgres backend).
    Threshold {
        #[arg(long)]
        path: String,
        #[arg(long, allow_negative_numbers = true)]
        value: i64,
    },
}

// ==============================================================================
// Logging
// ==============================================================================

/// Installs the global subscriber: stdout always, plus a daily rolling file
/// when `logging.directory` is configured.
fn init_tracing(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false);

    match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(stdout_layer)
                .with(fmt::layer().with_ansi(false).with_writer(writer))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry().with(filter).with(stdout_layer).init();
            None
        }
    }
}

// ==============================================================================
// Command Handlers
// ==============================================================================

async fn handle_strategies(config: &Config, query: &str) -> anyhow::Result<()> {
    let (state, worker) = web_server::build_state(config).await?;
    let summaries = state.strategies.summaries(query).await?;
    drop(state);
    worker.join().await;

    if summaries.is_empty() {
        println!("No strategies match '{}'.", query);
        return Ok(());
    }
    println!("{}", render_strategy_table(&summaries));
    Ok(())
}

/// One-shot commands that read or write counters need a store that outlives
/// the process; the in-memory one starts empty and is gone on exit.
fn require_persistent_storage(config: &Config, command: &str) -> anyhow::Result<()> {
    if config.storage.backend == StorageBackend::Memory {
        anyhow::bail!(
            "`{command}` needs storage.backend = \"postgres\"; \
             the in-memory store only lives inside `serve`"
        );
    }
    Ok(())
}

async fn handle_status(config: &Config, path: &str) -> anyhow::Result<()> {
    require_persistent_storage(config, "status")?;
    let (state, worker) = web_server::build_state(config).await?;
    let status = state.gate.status(path).await;
    drop(state);
    worker.join().await;

    println!("{}", serde_json::to_string_pretty(&status?)?);
    Ok(())
}

async fn handle_threshold(config: &Config, path: &str, value: i64) -> anyhow::Result<()> {
    require_persistent_storage(config, "threshold")?;
    let (state, worker) = web_server::build_state(config).await?;
    let counter = state.thresholds.set_threshold(path, value).await;
    drop(state);
    worker.join().await;

    let counter = counter?;
    println!(
        "Display threshold for {} is now {} (count {}).",
        counter.path, counter.display_threshold, counter.count
    );
    Ok(())
}

fn render_strategy_table(summaries: &[StrategySummary]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["ID", "Name", "Win Rate", "Trades", "Description"]);

    for summary in summaries {
        let win_rate_pct = summary.win_rate * Decimal::ONE_HUNDRED;
        table.add_row(vec![
            summary.id.to_string(),
            summary.name.clone(),
            format!("{:.1}%", win_rate_pct),
            summary.sample_size.to_string(),
            summary.description.clone(),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::StrategyId;

    #[test]
    fn cli_parses_threshold_with_negative_value() {
        let cli = Cli::try_parse_from(["footfall", "threshold", "--path", "/p", "--value", "-3"])
            .unwrap();
        match cli.command {
            Commands::Threshold { path, value } => {
                assert_eq!(path, "/p");
                assert_eq!(value, -3);
            }
            _ => panic!("expected threshold command"),
        }
        assert_eq!(cli.config, PathBuf::from("footfall.toml"));
    }

    #[test]
    fn strategy_table_shows_percentages() {
        let summaries = vec![StrategySummary {
            id: StrategyId::new("momentum-pro").unwrap(),
            name: "Momentum Pro".to_string(),
            description: String::new(),
            win_rate: Decimal::new(75, 2),
            sample_size: 4,
        }];
        let rendered = render_strategy_table(&summaries).to_string();
        assert!(rendered.contains("75.0%"));
        assert!(rendered.contains("momentum-pro"));
    }

    #[tokio::test]
    async fn counter_commands_refuse_the_memory_backend() {
        let config = Config::default();
        assert_eq!(config.storage.backend, StorageBackend::Memory);

        let err = handle_status(&config, "/pricing").await.unwrap_err();
        assert!(err.to_string().contains("postgres"));
        let err = handle_threshold(&config, "/pricing", 10).await.unwrap_err();
        assert!(err.to_string().contains("`threshold`"));
    }
}
