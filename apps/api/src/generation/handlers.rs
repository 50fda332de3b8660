//! Axum route handler for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};

use crate::errors::AppError;
use crate::generation::generator::{generate_documents, GenerateRequest};
use crate::identity::client_ip;
use crate::models::document::DocumentResult;
use crate::rate_limit::{self, GENERATE_LIMIT};
use crate::state::AppState;

/// POST /api/generate
///
/// Gates, in order: store configured → per-IP rate limit → input shape →
/// paid credits → model configured. Only then is the model called.
pub async fn handle_generate(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<DocumentResult>, AppError> {
    let store = state.require_store()?;

    let ip = client_ip(&headers, state.config.trusted_proxy_hops);
    rate_limit::enforce(store.as_ref(), &GENERATE_LIMIT, &ip).await?;

    let Json(request) = payload?;
    let request = request.validate()?;

    let result = generate_documents(
        store.as_ref(),
        state.llm.as_deref(),
        &state.config.identifier_salt,
        request,
    )
    .await?;

    Ok(Json(result))
}
