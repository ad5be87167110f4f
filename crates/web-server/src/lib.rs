use analytics::{MemoryOutcomeLog, OutcomeLog, StrategyCatalog, StrategyMetricsAggregator};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use configuration::{Config, RecorderSettings};
use core_types::StorageBackend;
use counters::{
    CounterStore, DisplayGate, MemoryCounterStore, RecorderWorker, ThresholdManager,
    VisitDispatcher, VisitRecorder,
};
use database::{DbRepository, PgCounterStore, PgOutcomeLog};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

/// The shared application state that all handlers can access.
#[derive(Clone)]
pub struct AppState {
    pub visits: VisitDispatcher,
    pub gate: DisplayGate,
    pub thresholds: ThresholdManager,
    pub strategies: StrategyMetricsAggregator,
}

impl AppState {
    /// Wires the services over the given stores and starts the visit recorder.
    ///
    /// The returned worker finishes once every clone of the state is dropped;
    /// join it to make sure queued visits are applied before exit.
    pub fn new(
        counter_store: Arc<dyn CounterStore>,
        outcomes: Arc<dyn OutcomeLog>,
        catalog: StrategyCatalog,
        recorder_settings: &RecorderSettings,
    ) -> (Self, RecorderWorker) {
        let recorder = VisitRecorder::new(Arc::clone(&counter_store));
        let (visits, worker) = VisitDispatcher::spawn(
            recorder,
            recorder_settings.queue_capacity,
            recorder_settings.max_in_flight,
        );
        let state = Self {
            visits,
            gate: DisplayGate::new(Arc::clone(&counter_store)),
            thresholds: ThresholdManager::new(counter_store),
            strategies: StrategyMetricsAggregator::new(catalog, outcomes),
        };
        (state, worker)
    }
}

/// Builds the stores selected by `config.storage` and the state over them.
pub async fn build_state(config: &Config) -> anyhow::Result<(AppState, RecorderWorker)> {
    let default_threshold = config.counters.default_display_threshold;
    let catalog = StrategyCatalog::new(config.strategies.clone());

    let (counter_store, outcomes): (Arc<dyn CounterStore>, Arc<dyn OutcomeLog>) =
        match config.storage.backend {
            StorageBackend::Memory => {
                tracing::warn!(
                    "Using in-memory storage; counters and outcomes are lost on restart."
                );
                (
                    Arc::new(MemoryCounterStore::new(default_threshold)),
                    Arc::new(MemoryOutcomeLog::new()),
                )
            }
            StorageBackend::Postgres => {
                let database_url = config.storage.database_url.as_deref().unwrap_or_default();
                let pool = database::connect(
                    database_url,
                    config.storage.max_connections,
                    Duration::from_secs(config.storage.acquire_timeout_secs),
                )
                .await?;
                database::run_migrations(&pool).await?;
                let repo = DbRepository::new(pool);
                (
                    Arc::new(PgCounterStore::new(repo.clone(), default_threshold)),
                    Arc::new(PgOutcomeLog::new(repo)),
                )
            }
        };

    tracing::info!(
        strategies = catalog.len(),
        default_threshold,
        "Analytics services initialized."
    );
    Ok(AppState::new(
        counter_store,
        outcomes,
        catalog,
        &config.recorder,
    ))
}

/// Defines the application routes over a prepared state.
pub fn build_router(state: AppState, body_limit_bytes: usize) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/visits",
            get(handlers::get_visit_status).post(handlers::record_visit),
        )
        .route("/visits/threshold", post(handlers::set_threshold))
        .route("/strategies", get(handlers::search_strategies))
        .route("/strategies/:strategy_id", get(handlers::get_strategy))
        .route("/strategies/:strategy_id/metrics", get(handlers::get_strategy_metrics))
        .route("/strategies/:strategy_id/outcomes", post(handlers::record_outcome))
        .with_state(Arc::new(state))
        .layer(cors)
        // This middleware will automatically log information about every incoming request.
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(body_limit_bytes))
}

/// The main function to configure and run the web server.
///
/// Runs until Ctrl-C, then drains the visit queue before returning.
pub async fn run_server(config: Config) -> anyhow::Result<()> {
    // Tracing is initialized by the binary; installing a second subscriber here would conflict.
    let addr = config.server.socket_addr();
    let (state, worker) = build_state(&config).await?;
    let app = build_router(state, config.server.body_limit_bytes);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Web server stopped; flushing queued visits.");
    worker.join().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
        std::future::pending::<()>().await;
    }
}
