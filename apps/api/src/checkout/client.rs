//! HTTP driver for the funnel: generate, pay on 402, verify, retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::checkout::flow::{CheckoutEvent, CheckoutFlow, FlowError, PaymentApproval};
use crate::checkout::hints::{LocalStore, LocalStoreError};
use crate::identity::derive_identifier;
use crate::models::document::DocumentResult;
use crate::models::package::PackageType;
use crate::models::user_data::UserData;
use crate::payments::handlers::{CreateOrderResponse, VerifyPaymentResponse};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server returned {status} ({code}): {message}")]
    Server {
        status: u16,
        code: String,
        message: String,
    },

    #[error("payment was verified but the server still requires payment")]
    AccessNotGranted,

    #[error(transparent)]
    Flow(#[from] FlowError),

    #[error("local storage error: {0}")]
    Local(#[from] LocalStoreError),
}

impl ClientError {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ClientError::Server { status: 429, .. })
    }
}

/// The hosted checkout widget.
#[async_trait]
pub trait CheckoutUi: Send + Sync {
    /// Opens checkout for `order`. `None` means the user closed it.
    async fn collect_payment(&self, order: &CreateOrderResponse) -> Option<PaymentApproval>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FunnelOutcome {
    Generated(DocumentResult),
    Cancelled,
}

enum Attempt {
    Generated(DocumentResult),
    PaymentRequired,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

pub struct FunnelClient {
    http: Client,
    base_url: String,
    local: Option<LocalStore>,
}

impl FunnelClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::builder().timeout(Duration::from_secs(150)).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            local: None,
        })
    }

    pub fn with_local_store(mut self, local: LocalStore) -> Self {
        self.local = Some(local);
        self
    }

    /// Optimistic, client-only guess that this user has paid. Never sent to
    /// the server.
    pub fn hinted_access(&self, user: &UserData) -> bool {
        let identifier = derive_identifier(&user.email, &user.phone);
        self.local
            .as_ref()
            .is_some_and(|l| l.load_hints().looks_paid(&identifier))
    }

    pub async fn create_order(
        &self,
        package: PackageType,
    ) -> Result<CreateOrderResponse, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/create-order", self.base_url))
            .json(&json!({ "packageType": package }))
            .send()
            .await?;
        Ok(expect_success(response).await?.json().await?)
    }

    pub async fn verify_payment(
        &self,
        identifier: &str,
        package: PackageType,
        approval: &PaymentApproval,
    ) -> Result<(), ClientError> {
        let response = self
            .http
            .post(format!("{}/api/verify", self.base_url))
            .json(&json!({
                "identifier": identifier,
                "paymentId": approval.payment_id,
                "orderId": approval.order_id,
                "signature": approval.signature,
                "packageType": package,
            }))
            .send()
            .await?;
        let body: VerifyPaymentResponse = expect_success(response).await?.json().await?;
        debug!("Verification response: success={}", body.success);
        Ok(())
    }

    async fn try_generate(
        &self,
        identifier: &str,
        user: &UserData,
        feedback: Option<&str>,
    ) -> Result<Attempt, ClientError> {
        let response = self
            .http
            .post(format!("{}/api/generate", self.base_url))
            .json(&json!({
                "userData": user,
                "feedback": feedback,
                "identifier": identifier,
            }))
            .send()
            .await?;

        if response.status() == StatusCode::PAYMENT_REQUIRED {
            return Ok(Attempt::PaymentRequired);
        }
        let result: DocumentResult = expect_success(response).await?.json().await?;
        Ok(Attempt::Generated(result))
    }

    /// Runs one generation through the funnel, opening checkout if the server
    /// asks for payment. The flow must already hold a package for checkout to
    /// open.
    pub async fn generate(
        &self,
        flow: &mut CheckoutFlow,
        user: &UserData,
        feedback: Option<&str>,
        ui: &dyn CheckoutUi,
    ) -> Result<FunnelOutcome, ClientError> {
        let identifier = derive_identifier(&user.email, &user.phone);
        if let Some(local) = &self.local {
            local.save_draft(user)?;
        }

        if let Attempt::Generated(result) = self.try_generate(&identifier, user, feedback).await? {
            return self.finish(flow, &identifier, result);
        }

        self.forget_hint(&identifier)?;
        flow.apply(CheckoutEvent::PaymentRequired)?;
        let package = flow.state().package().ok_or(FlowError::NoPackage)?;

        let order = self.create_order(package).await?;
        flow.apply(CheckoutEvent::OrderCreated {
            order_id: order.order.id.clone(),
        })?;

        let Some(approval) = ui.collect_payment(&order).await else {
            info!("Checkout for order {} dismissed", order.order.id);
            flow.apply(CheckoutEvent::CheckoutDismissed)?;
            return Ok(FunnelOutcome::Cancelled);
        };
        flow.apply(CheckoutEvent::GatewayApproved(approval.clone()))?;

        if let Err(e) = self.verify_payment(&identifier, package, &approval).await {
            flow.apply(CheckoutEvent::VerificationFailed)?;
            return Err(e);
        }

        // Access counts only once the server lets a generation through.
        match self.try_generate(&identifier, user, feedback).await? {
            Attempt::Generated(result) => self.finish(flow, &identifier, result),
            Attempt::PaymentRequired => {
                flow.apply(CheckoutEvent::PaymentRequired)?;
                Err(ClientError::AccessNotGranted)
            }
        }
    }

    fn finish(
        &self,
        flow: &mut CheckoutFlow,
        identifier: &str,
        result: DocumentResult,
    ) -> Result<FunnelOutcome, ClientError> {
        let remaining_credits = result.remaining_credits.unwrap_or(0);
        flow.apply(CheckoutEvent::GenerationSucceeded { remaining_credits })?;
        if let Some(local) = &self.local {
            local.remember_credits(identifier, remaining_credits)?;
        }
        Ok(FunnelOutcome::Generated(result))
    }

    fn forget_hint(&self, identifier: &str) -> Result<(), ClientError> {
        if let Some(local) = &self.local {
            let mut hints = local.load_hints();
            hints.forget(identifier);
            local.save_hints(&hints)?;
        }
        Ok(())
    }
}

async fn expect_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let (code, message) = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| (e.error.code, e.error.message))
        .unwrap_or_else(|_| ("UNKNOWN".to_string(), body));
    Err(ClientError::Server {
        status: status.as_u16(),
        code,
        message,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::checkout::flow::CheckoutState;
    use crate::payments::payment_signature;
    use crate::routes::build_router;
    use crate::state::AppState;
    use crate::testing::{sample_user_data, TestHarness, TEST_KEY_SECRET};

    /// Pays every order with a correctly signed approval, as the gateway would.
    #[derive(Default)]
    struct PayingCheckout {
        opened: AtomicUsize,
    }

    #[async_trait]
    impl CheckoutUi for PayingCheckout {
        async fn collect_payment(&self, order: &CreateOrderResponse) -> Option<PaymentApproval> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            let payment_id = "pay_e2e".to_string();
            Some(PaymentApproval {
                signature: payment_signature(TEST_KEY_SECRET, &order.order.id, &payment_id)?,
                order_id: order.order.id.clone(),
                payment_id,
            })
        }
    }

    struct DismissingCheckout;

    #[async_trait]
    impl CheckoutUi for DismissingCheckout {
        async fn collect_payment(&self, _order: &CreateOrderResponse) -> Option<PaymentApproval> {
            None
        }
    }

    /// Claims success with a signature the gateway never issued.
    struct ForgingCheckout;

    #[async_trait]
    impl CheckoutUi for ForgingCheckout {
        async fn collect_payment(&self, order: &CreateOrderResponse) -> Option<PaymentApproval> {
            Some(PaymentApproval {
                order_id: order.order.id.clone(),
                payment_id: "pay_forged".to_string(),
                signature: "00".repeat(32),
            })
        }
    }

    async fn spawn_server(state: AppState) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, build_router(state)).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn selected(package: PackageType) -> CheckoutFlow {
        let mut flow = CheckoutFlow::new();
        flow.apply(CheckoutEvent::SelectPackage(package)).unwrap();
        flow
    }

    #[tokio::test]
    async fn test_payment_required_opens_checkout_then_generates() {
        let harness = TestHarness::new();
        let base_url = spawn_server(harness.state.clone()).await;
        let dir = tempfile::tempdir().unwrap();
        let local = LocalStore::open(dir.path()).unwrap();
        let client = FunnelClient::new(base_url)
            .unwrap()
            .with_local_store(local.clone());
        let ui = PayingCheckout::default();
        let user = sample_user_data();
        assert!(!client.hinted_access(&user));

        let mut flow = selected(PackageType::ResumeCover);
        let outcome = client.generate(&mut flow, &user, None, &ui).await.unwrap();

        let FunnelOutcome::Generated(result) = outcome else {
            panic!("expected generated documents");
        };
        assert_eq!(result.remaining_credits, Some(2));
        assert_eq!(
            flow.state(),
            &CheckoutState::Verified {
                package: PackageType::ResumeCover,
                remaining_credits: 2
            }
        );
        assert_eq!(ui.opened.load(Ordering::SeqCst), 1);
        assert_eq!(harness.llm.calls(), 1);
        assert_eq!(harness.gateway.request_count(), 1);

        assert!(client.hinted_access(&user));
        assert_eq!(local.load_draft().unwrap(), Some(user));
    }

    #[tokio::test]
    async fn test_returning_user_restores_access_without_checkout() {
        let harness = TestHarness::new();
        let base_url = spawn_server(harness.state.clone()).await;
        let client = FunnelClient::new(base_url).unwrap();
        let ui = PayingCheckout::default();
        let user = sample_user_data();

        let mut first = selected(PackageType::ResumeOnly);
        client.generate(&mut first, &user, None, &ui).await.unwrap();

        // New session, nothing selected, nothing cached locally.
        let mut second = CheckoutFlow::new();
        let outcome = client
            .generate(&mut second, &user, Some("shorter summary"), &ui)
            .await
            .unwrap();

        assert!(matches!(outcome, FunnelOutcome::Generated(_)));
        assert_eq!(
            second.state(),
            &CheckoutState::RestoredAccess {
                remaining_credits: 1
            }
        );
        assert_eq!(ui.opened.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dismissed_checkout_cancels() {
        let harness = TestHarness::new();
        let base_url = spawn_server(harness.state.clone()).await;
        let client = FunnelClient::new(base_url).unwrap();

        let mut flow = selected(PackageType::JobReadyPack);
        let outcome = client
            .generate(&mut flow, &sample_user_data(), None, &DismissingCheckout)
            .await
            .unwrap();

        assert_eq!(outcome, FunnelOutcome::Cancelled);
        assert_eq!(
            flow.state(),
            &CheckoutState::PackageSelected {
                package: PackageType::JobReadyPack
            }
        );
        assert_eq!(harness.store.access_record_count(), 0);
        assert_eq!(harness.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_forged_approval_is_not_trusted() {
        let harness = TestHarness::new();
        let base_url = spawn_server(harness.state.clone()).await;
        let client = FunnelClient::new(base_url).unwrap();

        let mut flow = selected(PackageType::ResumeOnly);
        let err = client
            .generate(&mut flow, &sample_user_data(), None, &ForgingCheckout)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Server { status: 403, .. }));
        assert_eq!(
            flow.state(),
            &CheckoutState::PackageSelected {
                package: PackageType::ResumeOnly
            }
        );
        assert_eq!(harness.store.access_record_count(), 0);
        assert_eq!(harness.llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_payment_required_without_package_stops_before_order() {
        let harness = TestHarness::new();
        let base_url = spawn_server(harness.state.clone()).await;
        let client = FunnelClient::new(base_url).unwrap();

        let mut flow = CheckoutFlow::new();
        let err = client
            .generate(&mut flow, &sample_user_data(), None, &DismissingCheckout)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Flow(FlowError::NoPackage)));
        assert_eq!(harness.gateway.request_count(), 0);
    }
}
