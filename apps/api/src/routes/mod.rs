pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers::handle_generate;
use crate::payments::handlers::{handle_create_order, handle_verify};
use crate::render::handlers::handle_preview;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Checkout
        .route("/api/create-order", post(handle_create_order))
        .route("/api/verify", post(handle_verify))
        // Quota-gated generation
        .route("/api/generate", post(handle_generate))
        // Print preview
        .route("/api/preview", post(handle_preview))
        .with_state(state)
}
