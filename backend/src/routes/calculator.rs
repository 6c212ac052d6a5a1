use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use tracing::info;

use crate::errors::AppError;
use crate::models::{CalculatorRequest, CalculatorResponse, RateTableEntry};
use crate::services::quote_calculator;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(calculate))
        .route("/rates", get(rates))
}

pub async fn calculate(
    payload: Result<Json<CalculatorRequest>, JsonRejection>,
) -> Result<Json<CalculatorResponse>, AppError> {
    let Json(request) = payload.map_err(|_| AppError::Validation("Invalid calculator request".into()))?;
    info!("POST /api/calculator - {} tier", request.credit_score);

    let tier = quote_calculator::resolve_tier(&request.credit_score);
    let down_payment = if request.clamp_down_payment {
        quote_calculator::clamp_down_payment(request.purchase_price, request.down_payment)
    } else {
        request.down_payment
    };
    let calculation = quote_calculator::calculate(request.purchase_price, down_payment, tier)?;

    Ok(Json(CalculatorResponse {
        credit_score: tier,
        purchase_price: request.purchase_price,
        down_payment,
        term_months: quote_calculator::TERM_MONTHS,
        calculation,
    }))
}

pub async fn rates() -> Json<Vec<RateTableEntry>> {
    Json(quote_calculator::rate_table())
}
