use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{FinanceQuote, PaginationParams, QuoteInput};
use crate::services::finance_quote_service::{self, CreateOptions};
use crate::state::AppState;

pub const IDEMPOTENCY_KEY_HEADER: &str = "idempotency-key";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_quote).get(fetch_quotes))
        .route("/:id", get(get_quote))
}

fn idempotency_key(headers: &HeaderMap) -> Result<Option<Uuid>, AppError> {
    let Some(value) = headers.get(IDEMPOTENCY_KEY_HEADER) else {
        return Ok(None);
    };
    value
        .to_str()
        .ok()
        .and_then(|v| Uuid::parse_str(v.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::Validation("Idempotency-Key must be a UUID".into()))
}

pub async fn create_quote(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<QuoteInput>, JsonRejection>,
) -> Result<Json<FinanceQuote>, AppError> {
    info!("POST /api/finance-quotes - Saving finance quote");
    let Json(input) = payload.map_err(|rejection| {
        warn!("Rejected finance quote body: {}", rejection);
        AppError::Validation("Invalid finance quote data".into())
    })?;

    let options = CreateOptions {
        verify_derived_fields: state.verify_derived_fields,
        idempotency_key: idempotency_key(&headers)?,
    };
    let quote = finance_quote_service::create(state.store.as_ref(), input, options)
        .await
        .map_err(|e| {
            error!("Failed to save finance quote: {}", e);
            e
        })?;
    Ok(Json(quote))
}

pub async fn fetch_quotes(
    State(state): State<AppState>,
    params: Result<Query<PaginationParams>, QueryRejection>,
) -> Result<Json<Vec<FinanceQuote>>, AppError> {
    info!("GET /api/finance-quotes - Fetching finance quotes");
    let Query(params) = params.map_err(|_| AppError::Validation("Invalid pagination parameters".into()))?;
    let quotes = finance_quote_service::fetch_all(state.store.as_ref(), params)
        .await
        .map_err(|e| {
            error!("Failed to fetch finance quotes: {}", e);
            e
        })?;
    Ok(Json(quotes))
}

pub async fn get_quote(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<FinanceQuote>, AppError> {
    let Path(id) = id.map_err(|_| AppError::Validation("Invalid finance quote id".into()))?;
    info!("GET /api/finance-quotes/{} - Fetching finance quote", id);
    // ids are SERIAL, so nothing outside the i32 range can exist
    let id = i32::try_from(id).map_err(|_| AppError::NotFound("Finance quote not found".to_string()))?;
    let quote = finance_quote_service::fetch_one(state.store.as_ref(), id)
        .await
        .map_err(|e| {
            if !matches!(e, AppError::NotFound(_)) {
                error!("Failed to fetch finance quote {}: {}", id, e);
            }
            e
        })?;
    Ok(Json(quote))
}
