use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::models::package::PackageType;

const RAZORPAY_ORDERS_URL: &str = "https://api.razorpay.com/v1/orders";
const CURRENCY: &str = "INR";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Gateway rejected request (status {status}): {message}")]
    Api { status: u16, message: String },
}

/// Order body sent to the gateway. Built only from the server price table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRequest {
    /// Paise.
    pub amount: u64,
    pub currency: String,
    pub receipt: String,
}

impl OrderRequest {
    pub fn for_package(package: PackageType) -> Self {
        Self {
            amount: package.amount_paise(),
            currency: CURRENCY.to_string(),
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    pub amount: u64,
    pub currency: String,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Server-side half of a payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Public key id the checkout widget is opened with.
    fn key_id(&self) -> &str;

    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError>;
}

#[derive(Clone)]
pub struct RazorpayClient {
    client: Client,
    key_id: String,
    key_secret: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Result<Self, GatewayError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(30)).build()?,
            key_id,
            key_secret,
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    fn key_id(&self) -> &str {
        &self.key_id
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let response = self
            .client
            .post(RAZORPAY_ORDERS_URL)
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let order: GatewayOrder = response.json().await?;
        debug!("Razorpay order {} created for {} paise", order.id, order.amount);
        Ok(order)
    }
}
