use axum::{
    extract::{rejection::JsonRejection, Query},
    response::Html,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::document::DocumentResult;
use crate::models::user_data::UserData;
use crate::render::html::render_document;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub user_data: UserData,
    pub result: DocumentResult,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub print: bool,
}

/// POST /api/preview
///
/// Renders a generated result as an A4 print layout. `?print=true` opens the
/// browser print dialog on load so the user can save as PDF.
pub async fn handle_preview(
    Query(query): Query<PreviewQuery>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Html<String>, AppError> {
    let Json(request) = payload?;
    Ok(Html(render_document(
        &request.user_data,
        &request.result,
        query.print,
    )))
}
