use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service version and which integrations are wired up.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "jobready-api",
        "integrations": {
            "store": state.store.is_some(),
            "llm": state.llm.is_some(),
            "gateway": state.gateway.is_some(),
        }
    }))
}
