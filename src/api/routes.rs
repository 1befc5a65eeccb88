use crate::AppState;
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(crate::api::handlers::health::root))
        .route("/health", get(crate::api::handlers::health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
