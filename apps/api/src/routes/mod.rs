pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::extraction::config::MIB;
use crate::extraction::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // Room for the multipart envelope around a maximum-size file.
    let body_limit = state.config.max_upload_bytes() + MIB;

    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/cv/parse",
            post(handlers::handle_parse).layer(DefaultBodyLimit::max(body_limit)),
        )
        .with_state(state)
}
