use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

/// Message shown when the model reply cannot be parsed. The user can re-submit.
pub const INVALID_AI_FORMAT_MESSAGE: &str =
    "The AI provided an invalid format. Please try clicking 'Update' again.";

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// The status codes are part of the client contract: 402 sends the user to
/// checkout, 429 asks them to wait, everything else is a manual retry.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Payment required: {0}")]
    PaymentRequired(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid AI response: {0}")]
    InvalidAiResponse(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Payment gateway error: {0}")]
    Gateway(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Config(_)
            | AppError::InvalidAiResponse(_)
            | AppError::Llm(_)
            | AppError::Gateway(_)
            | AppError::Store(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match &self {
            AppError::Validation(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::Forbidden(msg) => ("FORBIDDEN", msg.clone()),
            AppError::PaymentRequired(msg) => ("PAYMENT_REQUIRED", msg.clone()),
            AppError::RateLimited(msg) => ("RATE_LIMITED", msg.clone()),
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                ("CONFIG_ERROR", format!("System error: {msg}"))
            }
            AppError::InvalidAiResponse(detail) => {
                tracing::warn!("Unparseable AI response: {detail}");
                ("INVALID_AI_RESPONSE", INVALID_AI_FORMAT_MESSAGE.to_string())
            }
            AppError::Llm(msg) => {
                tracing::error!("LLM error: {msg}");
                (
                    "LLM_ERROR",
                    "An AI processing error occurred. Please try again.".to_string(),
                )
            }
            AppError::Gateway(msg) => {
                tracing::error!("Payment gateway error: {msg}");
                ("GATEWAY_ERROR", "Order creation failed".to_string())
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                ("STORE_ERROR", "A storage error occurred".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
