use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/api/sections", get(handlers::list_sections))
        .route("/api/sections/:section", get(handlers::get_section))
        .with_state(state)
}
