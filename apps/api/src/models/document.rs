use serde::{Deserialize, Serialize};

/// Generated document text. `experience_bullets[i]` belongs to
/// `UserData::experience[i]`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub resume_summary: String,
    pub experience_bullets: Vec<Vec<String>>,
    pub cover_letter: String,
    pub linkedin_headline: String,
    pub linkedin_summary: String,
    #[serde(default)]
    pub keyword_mapping: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remaining_credits: Option<i64>,
}

impl DocumentResult {
    /// Pads or truncates the bullet lists so there is exactly one per
    /// experience entry.
    pub fn align_bullets(&mut self, experience_count: usize) {
        self.experience_bullets.resize_with(experience_count, Vec::new);
    }
}
