//! Shared fixtures and in-process fakes for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::Config;
use crate::llm_client::{LlmBackend, LlmError};
use crate::models::document::DocumentResult;
use crate::models::user_data::{Education, Experience, JobRole, UserData};
use crate::payments::razorpay::{GatewayError, GatewayOrder, OrderRequest, PaymentGateway};
use crate::state::AppState;
use crate::store::memory::MemoryStore;
use crate::store::KvStore;

pub const TEST_KEY_ID: &str = "rzp_test_key";
pub const TEST_KEY_SECRET: &str = "rzp_test_secret";

pub const VALID_MODEL_REPLY: &str = r#"{
  "resumeSummary": "Customer-focused support associate with two years of BPO experience.",
  "experienceBullets": [
    ["Resolved 60+ customer calls per shift", "Maintained 95% CSAT across rotating shifts"]
  ],
  "coverLetter": "Dear Hiring Manager,\n\nI am writing to apply...",
  "linkedinHeadline": "Customer Support Associate | BPO | CSAT Champion",
  "linkedinSummary": "I help customers get answers fast.",
  "keywordMapping": ["customer support", "CSAT", "BPO"]
}"#;

pub fn sample_user_data() -> UserData {
    UserData {
        full_name: "Asha Rao".to_string(),
        email: "asha@example.com".to_string(),
        phone: "9876543210".to_string(),
        location: "Pune".to_string(),
        job_role: JobRole::Support,
        education: vec![Education {
            degree: "B.Com".to_string(),
            college: "Savitribai Phule Pune University".to_string(),
            year: "2022".to_string(),
            percentage: "72".to_string(),
        }],
        experience: vec![Experience {
            title: "Customer Support Associate".to_string(),
            company: "Acme BPO".to_string(),
            duration: "2022 - 2024".to_string(),
            description: "Handled inbound calls and email tickets".to_string(),
        }],
        skills: vec!["Communication".to_string(), "MS Office".to_string()],
        summary: None,
    }
}

pub fn sample_document() -> DocumentResult {
    serde_json::from_str(VALID_MODEL_REPLY).unwrap()
}

/// `LlmBackend` that returns a canned reply (or fails) and counts calls.
pub struct ScriptedLlm {
    reply: Option<String>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LlmBackend for ScriptedLlm {
    async fn complete(&self, _prompt: &str, _system: &str) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reply.clone().ok_or(LlmError::Api {
            status: 529,
            message: "overloaded".to_string(),
        })
    }
}

/// `PaymentGateway` that records every order request it receives.
#[derive(Default)]
pub struct RecordingGateway {
    pub requests: Mutex<Vec<OrderRequest>>,
    pub fail: bool,
}

impl RecordingGateway {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    fn key_id(&self) -> &str {
        TEST_KEY_ID
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<GatewayOrder, GatewayError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        if self.fail {
            return Err(GatewayError::Api {
                status: 401,
                message: "Authentication failed".to_string(),
            });
        }
        Ok(GatewayOrder {
            id: format!("order_test_{}", requests.len()),
            amount: request.amount,
            currency: request.currency.clone(),
            receipt: Some(request.receipt.clone()),
            status: Some("created".to_string()),
        })
    }
}

/// Fully wired state over in-process fakes.
pub struct TestHarness {
    pub store: Arc<MemoryStore>,
    pub llm: Arc<ScriptedLlm>,
    pub gateway: Arc<RecordingGateway>,
    pub state: AppState,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_llm(ScriptedLlm::replying(VALID_MODEL_REPLY))
    }

    pub fn with_llm(llm: ScriptedLlm) -> Self {
        Self::build(llm, RecordingGateway::default())
    }

    pub fn build(llm: ScriptedLlm, gateway: RecordingGateway) -> Self {
        let store = Arc::new(MemoryStore::default());
        let llm = Arc::new(llm);
        let gateway = Arc::new(gateway);
        let config = Config {
            razorpay_key_id: Some(TEST_KEY_ID.to_string()),
            razorpay_key_secret: Some(TEST_KEY_SECRET.to_string()),
            ..Config::default()
        };
        let state = AppState {
            config,
            store: Some(store.clone() as Arc<dyn KvStore>),
            llm: Some(llm.clone() as Arc<dyn LlmBackend>),
            gateway: Some(gateway.clone() as Arc<dyn PaymentGateway>),
        };
        Self {
            store,
            llm,
            gateway,
            state,
        }
    }
}
