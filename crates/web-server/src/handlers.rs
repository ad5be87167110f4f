use crate::{error::AppError, AppState};
use analytics::{StrategyMetrics, StrategySummary};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use core_types::{Strategy, StrategyId, TradeOutcome, TradeResult, VisitStatus};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct RecordVisitRequest {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct RecordVisitResponse {
    pub accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct VisitQuery {
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct SetThresholdRequest {
    pub path: String,
    pub threshold: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdResponse {
    pub path: String,
    pub display_threshold: u64,
}

#[derive(Debug, Deserialize)]
pub struct StrategyQuery {
    #[serde(default)]
    pub query: String,
}

/// A settled trade as delivered by the execution system.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOutcomeRequest {
    pub result: TradeResult,
    #[serde(default)]
    pub outcome_id: Option<Uuid>,
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub pnl: Option<Decimal>,
    #[serde(default)]
    pub settled_at: Option<DateTime<Utc>>,
}

fn parse_strategy_id(raw: String) -> Result<StrategyId, AppError> {
    StrategyId::new(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// # POST /visits
/// Queues the visit and acknowledges immediately. Recording problems are never
/// reported back; analytics must not break the page that fired the beacon.
pub async fn record_visit(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RecordVisitRequest>,
) -> (StatusCode, Json<RecordVisitResponse>) {
    let accepted = state.visits.dispatch(&request.path);
    (StatusCode::ACCEPTED, Json(RecordVisitResponse { accepted }))
}

/// # GET /visits?path=<path>
pub async fn get_visit_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VisitQuery>,
) -> Result<Json<VisitStatus>, AppError> {
    let status = state.gate.status(&query.path).await?;
    Ok(Json(status))
}

/// # POST /visits/threshold
pub async fn set_threshold(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetThresholdRequest>,
) -> Result<Json<ThresholdResponse>, AppError> {
    let counter = state
        .thresholds
        .set_threshold(&request.path, request.threshold)
        .await?;
    Ok(Json(ThresholdResponse {
        path: counter.path,
        display_threshold: counter.display_threshold,
    }))
}

/// # GET /strategies?query=<q>
/// Lists matching strategies with their current win rate, in catalog order.
pub async fn search_strategies(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StrategyQuery>,
) -> Result<Json<Vec<StrategySummary>>, AppError> {
    let summaries = state.strategies.summaries(&query.query).await?;
    Ok(Json(summaries))
}

/// # GET /strategies/:strategy_id
pub async fn get_strategy(
    Path(strategy_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Strategy>, AppError> {
    let strategy = state.strategies.select(&parse_strategy_id(strategy_id)?)?;
    Ok(Json(strategy))
}

/// # GET /strategies/:strategy_id/metrics
pub async fn get_strategy_metrics(
    Path(strategy_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<StrategyMetrics>, AppError> {
    let metrics = state
        .strategies
        .metrics_for(&parse_strategy_id(strategy_id)?)
        .await?;
    Ok(Json(metrics))
}

/// # POST /strategies/:strategy_id/outcomes
/// Appends one settled outcome to the strategy's log.
pub async fn record_outcome(
    Path(strategy_id): Path<String>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<NewOutcomeRequest>,
) -> Result<(StatusCode, Json<TradeOutcome>), AppError> {
    let mut outcome = TradeOutcome::new(parse_strategy_id(strategy_id)?, request.result);
    if let Some(outcome_id) = request.outcome_id {
        outcome.outcome_id = outcome_id;
    }
    if let Some(settled_at) = request.settled_at {
        outcome = outcome.settled_at(settled_at);
    }
    if let Some(symbol) = request.symbol {
        outcome = outcome.with_symbol(symbol);
    }
    if let Some(pnl) = request.pnl {
        outcome = outcome.with_pnl(pnl);
    }

    let stored = state.strategies.record_outcome(outcome).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}
