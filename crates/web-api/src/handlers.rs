use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use kelly_journal_backtest::{Dashboard, DashboardBuilder};
use kelly_journal_core::{NewTrade, TradeHistoryProvider, TradeOwner, TradeSink};
use kelly_journal_data::{import_csv, ImportFailure, ImportFormat, RowError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

/// Shared handles every handler reads from.
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<dyn TradeHistoryProvider>,
    pub sink: Arc<dyn TradeSink>,
    pub builder: DashboardBuilder,
}

impl AppState {
    #[must_use]
    pub fn new(
        history: Arc<dyn TradeHistoryProvider>,
        sink: Arc<dyn TradeSink>,
        starting_capital: Decimal,
    ) -> Self {
        Self {
            history,
            sink,
            builder: DashboardBuilder::new(starting_capital),
        }
    }
}

/// Body of every non-dashboard response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RowError>,
}

impl ApiMessage {
    fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            count: None,
            errors: Vec::new(),
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::ok(message)
        }
    }
}

type ApiError = (StatusCode, Json<ApiMessage>);

fn reject(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ApiMessage::failed(message)))
}

#[derive(Debug, Deserialize)]
pub struct ImportParams {
    #[serde(default)]
    pub format: Option<ImportFormat>,
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Computes the dashboard for one journal.
///
/// # Errors
/// Returns `StatusCode::INTERNAL_SERVER_ERROR` if the trade history cannot be loaded.
pub async fn get_dashboard(
    State(state): State<AppState>,
    Path((user_id, strategy_id)): Path<(i32, i32)>,
) -> Result<Json<Dashboard>, ApiError> {
    let owner = TradeOwner::new(user_id, strategy_id);
    let trades = state.history.trades_for(owner).await.map_err(|e| {
        tracing::error!(user_id, strategy_id, "Failed to load trades: {:#}", e);
        reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "A database error occurred. Could not load trades.",
        )
    })?;

    Ok(Json(state.builder.build(&trades)))
}

/// Imports a CSV body. `?format=` selects the layout and defaults to generic.
///
/// # Errors
/// Returns `StatusCode::BAD_REQUEST` with row errors when the file is rejected,
/// or `StatusCode::INTERNAL_SERVER_ERROR` if storing the trades fails.
pub async fn import_trades(
    State(state): State<AppState>,
    Path((user_id, strategy_id)): Path<(i32, i32)>,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<Json<ApiMessage>, ApiError> {
    let owner = TradeOwner::new(user_id, strategy_id);
    let format = params.format.unwrap_or(ImportFormat::Generic);

    match import_csv(state.sink.as_ref(), owner, format, &body).await {
        Ok(summary) => Ok(Json(ApiMessage {
            count: Some(summary.count),
            ..ApiMessage::ok(summary.message())
        })),
        Err(ImportFailure::Rejected(e)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiMessage {
                errors: e.row_errors().to_vec(),
                ..ApiMessage::failed(e.to_string())
            }),
        )),
        Err(e @ ImportFailure::Storage(_)) => {
            Err(reject(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

fn check_new_trade(trade: &NewTrade) -> Vec<String> {
    let mut problems = Vec::new();
    if trade.asset.trim().is_empty() {
        problems.push("asset: Required".to_string());
    }
    if trade.position_size < Decimal::ZERO {
        problems.push("position_size: Must not be negative".to_string());
    }
    if matches!(trade.exit_timestamp, Some(exit) if exit < trade.entry_timestamp) {
        problems.push("exit_timestamp: Must not be before entry_timestamp".to_string());
    }
    problems
}

/// Records a single manually entered trade.
///
/// # Errors
/// Returns `StatusCode::BAD_REQUEST` for an invalid trade, or
/// `StatusCode::INTERNAL_SERVER_ERROR` if the insert fails.
pub async fn log_trade(
    State(state): State<AppState>,
    Path((user_id, strategy_id)): Path<(i32, i32)>,
    Json(trade): Json<NewTrade>,
) -> Result<(StatusCode, Json<ApiMessage>), ApiError> {
    let problems = check_new_trade(&trade);
    if !problems.is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, problems.join("; ")));
    }

    let owner = TradeOwner::new(user_id, strategy_id);
    state.sink.insert_one(owner, &trade).await.map_err(|e| {
        tracing::error!(user_id, strategy_id, "Failed to log trade: {:#}", e);
        reject(
            StatusCode::INTERNAL_SERVER_ERROR,
            "A database error occurred. Could not log trade.",
        )
    })?;

    tracing::info!(user_id, strategy_id, asset = %trade.asset, "Logged trade");
    Ok((StatusCode::CREATED, Json(ApiMessage::ok("Trade logged."))))
}
