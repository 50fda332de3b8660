//! Axum route handlers for order creation and payment verification.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::identity::{client_ip, hash_identifier, log_tag};
use crate::models::access::PaidAccess;
use crate::models::package::PackageType;
use crate::payments::razorpay::{GatewayOrder, OrderRequest};
use crate::payments::verify_payment_signature;
use crate::rate_limit::{self, VERIFY_LIMIT};
use crate::state::AppState;
use crate::store::save_access;

const GATEWAY_NOT_CONFIGURED: &str = "Razorpay not configured on server";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub package_type: String,
}

/// The gateway's order plus the public key id the checkout widget needs.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderResponse {
    #[serde(flatten)]
    pub order: GatewayOrder,
    pub key_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentRequest {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub payment_id: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub signature: String,
    #[serde(default)]
    pub package_type: String,
}

impl VerifyPaymentRequest {
    fn validate(&self) -> Result<PackageType, AppError> {
        let required = [
            ("identifier", &self.identifier),
            ("paymentId", &self.payment_id),
            ("orderId", &self.order_id),
            ("signature", &self.signature),
        ];
        if let Some((name, _)) = required.iter().find(|(_, v)| v.trim().is_empty()) {
            return Err(AppError::Validation(format!("{name} is required")));
        }
        parse_package(&self.package_type)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
}

fn parse_package(raw: &str) -> Result<PackageType, AppError> {
    raw.parse::<PackageType>()
        .map_err(|e| AppError::Validation(e.to_string()))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/create-order
///
/// Creates a gateway order for a package from the server price table. The
/// client only names the package; it never supplies an amount.
pub async fn handle_create_order(
    State(state): State<AppState>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let gateway = state
        .gateway
        .clone()
        .ok_or_else(|| AppError::Config(GATEWAY_NOT_CONFIGURED.to_string()))?;

    let Json(request) = payload?;
    let package = parse_package(&request.package_type)?;

    let order_request = OrderRequest::for_package(package);
    let order = gateway
        .create_order(&order_request)
        .await
        .map_err(|e| AppError::Gateway(e.to_string()))?;

    info!(
        "Created order {} for {} ({} paise)",
        order.id, package, order_request.amount
    );

    Ok(Json(CreateOrderResponse {
        order,
        key_id: gateway.key_id().to_string(),
    }))
}

/// POST /api/verify
///
/// Checks the gateway signature and grants a fresh set of credits to the
/// identifier. Any earlier record is replaced, unused credits included.
pub async fn handle_verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<VerifyPaymentRequest>, JsonRejection>,
) -> Result<Json<VerifyPaymentResponse>, AppError> {
    let store = state.require_store()?;

    let ip = client_ip(&headers, state.config.trusted_proxy_hops);
    rate_limit::enforce(store.as_ref(), &VERIFY_LIMIT, &ip).await?;

    let secret = state
        .config
        .razorpay_key_secret
        .as_deref()
        .ok_or_else(|| AppError::Config(GATEWAY_NOT_CONFIGURED.to_string()))?;

    let Json(request) = payload?;
    let package = request.validate()?;

    if !verify_payment_signature(
        secret,
        &request.order_id,
        &request.payment_id,
        &request.signature,
    ) {
        warn!(
            "Rejected payment signature for order {}",
            request.order_id
        );
        return Err(AppError::Forbidden("Invalid signature".to_string()));
    }

    let hashed = hash_identifier(&state.config.identifier_salt, &request.identifier);
    let record = PaidAccess::fresh(request.payment_id, package);
    save_access(store.as_ref(), &hashed, &record).await?;

    info!(
        "Verified payment for {} ({package}); {} credits granted",
        log_tag(&hashed),
        record.credits
    );

    Ok(Json(VerifyPaymentResponse { success: true }))
}
