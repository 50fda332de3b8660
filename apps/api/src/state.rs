use std::sync::Arc;

use crate::config::Config;
use crate::errors::AppError;
use crate::llm_client::LlmBackend;
use crate::payments::razorpay::PaymentGateway;
use crate::store::KvStore;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Each integration is optional; a handler that needs a missing one fails
/// closed with a configuration error.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Paid-access records and rate-limit counters. Redis in production.
    pub store: Option<Arc<dyn KvStore>>,
    /// Document generation model.
    pub llm: Option<Arc<dyn LlmBackend>>,
    /// Server-side order creation.
    pub gateway: Option<Arc<dyn PaymentGateway>>,
}

impl AppState {
    pub fn require_store(&self) -> Result<Arc<dyn KvStore>, AppError> {
        self.store
            .clone()
            .ok_or_else(|| AppError::Config("KV store not configured".to_string()))
    }
}
