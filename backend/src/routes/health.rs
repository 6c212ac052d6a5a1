use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tracing::{debug, error};

use crate::state::AppState;
use crate::store::Page;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(live))
        .route("/ready", get(ready))
}

async fn live() -> &'static str {
    debug!("GET /health");
    "OK"
}

/// Ready once the quote store answers a one-row read.
async fn ready(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.store.list_all(Page { limit: Some(1), offset: 0 }).await {
        Ok(_) => (StatusCode::OK, "READY"),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "UNAVAILABLE")
        }
    }
}
