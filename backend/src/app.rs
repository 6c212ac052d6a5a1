use axum::Router;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::routes::{calculator, finance_quotes, health};
use crate::state::AppState;

pub fn create_app(state: AppState) -> Router {
    Router::<AppState>::new()
        .nest("/health", health::router())
        .nest("/api/finance-quotes", finance_quotes::router())
        .nest("/api/calculator", calculator::router())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}
