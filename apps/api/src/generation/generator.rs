//! Document generation: the quota gate and the model call behind it.
//!
//! Flow: hash identifier → load paid-access record → build fenced prompt →
//!       LLM generate → parse → decrement credits → return.
//!
//! Credits are only touched after a fully parsed result. Any earlier failure
//! leaves the balance as it was.

use serde::Deserialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{GENERATION_PERSONA, GENERATION_PROMPT_TEMPLATE};
use crate::identity::{hash_identifier, log_tag};
use crate::llm_client::prompts::{
    fence_user_text, DATA_FENCE_INSTRUCTION, JSON_ONLY_SYSTEM, USER_CONTENT_CLOSE,
    USER_CONTENT_OPEN,
};
use crate::llm_client::{call_json, LlmBackend, LlmError};
use crate::models::document::DocumentResult;
use crate::models::user_data::UserData;
use crate::store::{load_access, save_access, KvStore};

// ────────────────────────────────────────────────────────────────────────────
// Request model
// ────────────────────────────────────────────────────────────────────────────

/// Request body for `POST /api/generate`.
///
/// Fields are optional at the serde level so that a missing identifier or
/// form reports a validation error rather than a body rejection.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub user_data: Option<UserData>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub identifier: Option<String>,
}

/// A request that passed input validation.
#[derive(Debug, Clone)]
pub struct ValidGenerateRequest {
    pub user_data: UserData,
    pub feedback: Option<String>,
    pub identifier: String,
}

impl GenerateRequest {
    pub fn validate(self) -> Result<ValidGenerateRequest, AppError> {
        let identifier = self
            .identifier
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::Validation("Bad Request: identifier is required".into()))?;
        let user_data = self
            .user_data
            .ok_or_else(|| AppError::Validation("Bad Request: userData is required".into()))?;
        let feedback = self
            .feedback
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        Ok(ValidGenerateRequest {
            user_data,
            feedback,
            identifier,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Runs the quota gate and, if it passes, one model generation.
///
/// Steps:
/// 1. hash identifier → `paid_v2_<hash>` lookup
/// 2. no record or no credits → `PaymentRequired` (model is not called)
/// 3. no model backend configured → `Config`
/// 4. fenced prompt → model → first JSON object → `DocumentResult`
/// 5. credits - 1, persisted; the new balance is returned in the result
///
/// Step 5 is a read-modify-write without a guard; concurrent requests for one
/// identifier can over-spend.
pub async fn generate_documents(
    store: &dyn KvStore,
    llm: Option<&dyn LlmBackend>,
    identifier_salt: &str,
    request: ValidGenerateRequest,
) -> Result<DocumentResult, AppError> {
    let hashed = hash_identifier(identifier_salt, &request.identifier);
    let tag = log_tag(&hashed);

    let mut access = load_access(store, &hashed).await?.ok_or_else(|| {
        info!("No paid access for {tag}");
        AppError::PaymentRequired("Payment Required".to_string())
    })?;

    if !access.has_credits() {
        info!("Paid access for {tag} has no credits left");
        return Err(AppError::PaymentRequired(
            "No credits remaining".to_string(),
        ));
    }

    let llm = llm.ok_or_else(|| AppError::Config("AI provider not configured".to_string()))?;

    let prompt = build_generation_prompt(&request.user_data, request.feedback.as_deref())?;
    let system = generation_system_prompt();

    let mut result: DocumentResult = call_json(llm, &prompt, &system)
        .await
        .map_err(map_generation_error)?;
    result.align_bullets(request.user_data.experience.len());

    access.credits -= 1;
    save_access(store, &hashed, &access).await?;
    result.remaining_credits = Some(access.credits);

    info!(
        "Generated documents for {tag}; {} credits remaining",
        access.credits
    );

    Ok(result)
}

fn map_generation_error(error: LlmError) -> AppError {
    if error.is_format_error() {
        warn!("Model reply was not usable JSON: {error}");
        AppError::InvalidAiResponse(error.to_string())
    } else {
        AppError::Llm(format!("Generation LLM call failed: {error}"))
    }
}

pub fn generation_system_prompt() -> String {
    format!("{GENERATION_PERSONA}\n\n{DATA_FENCE_INSTRUCTION}\n\n{JSON_ONLY_SYSTEM}")
}

/// Builds the generation prompt. Every user-supplied value sits inside the
/// `<USER_CONTENT>` fence with angle brackets neutralised.
pub fn build_generation_prompt(
    user: &UserData,
    feedback: Option<&str>,
) -> Result<String, AppError> {
    let education_json = serde_json::to_string(&user.education)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize education: {e}")))?;
    let experience_json = serde_json::to_string(&user.experience)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to serialize experience: {e}")))?;

    let mut lines = vec![
        format!("JOB ROLE: {}", user.job_role.display_name()),
        format!("FULL NAME: {}", fence_user_text(&user.full_name)),
        format!("LOCATION: {}", fence_user_text(&user.location)),
        format!("EDUCATION: {}", fence_user_text(&education_json)),
        format!("EXPERIENCE: {}", fence_user_text(&experience_json)),
        format!("SKILLS: {}", fence_user_text(&user.skills.join(", "))),
    ];
    if let Some(summary) = user.summary.as_deref().filter(|s| !s.trim().is_empty()) {
        lines.push(format!("CURRENT SUMMARY: {}", fence_user_text(summary)));
    }
    if let Some(feedback) = feedback {
        lines.push(format!("REFINEMENT: {}", fence_user_text(feedback)));
    }

    let user_content = format!(
        "{USER_CONTENT_OPEN}\n{}\n{USER_CONTENT_CLOSE}",
        lines.join("\n")
    );

    // {user_content} goes in last so placeholders typed by the user are never expanded.
    Ok(GENERATION_PROMPT_TEMPLATE
        .replace("{role_focus}", user.job_role.focus_hint())
        .replace("{experience_count}", &user.experience.len().to_string())
        .replace("{user_content}", &user_content))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
