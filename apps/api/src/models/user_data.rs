use serde::{Deserialize, Serialize};

/// Target role picked in the form. Each role steers what the model emphasises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobRole {
    #[serde(rename = "IT / Software")]
    It,
    #[serde(rename = "Sales & Marketing")]
    Sales,
    #[serde(rename = "Customer Support / BPO")]
    Support,
    #[serde(rename = "Fresher (Any Graduate)")]
    Fresher,
    #[serde(rename = "Finance & Accounting")]
    Finance,
}

impl JobRole {
    pub fn display_name(self) -> &'static str {
        match self {
            JobRole::It => "IT / Software",
            JobRole::Sales => "Sales & Marketing",
            JobRole::Support => "Customer Support / BPO",
            JobRole::Fresher => "Fresher (Any Graduate)",
            JobRole::Finance => "Finance & Accounting",
        }
    }

    pub fn focus_hint(self) -> &'static str {
        match self {
            JobRole::It => "Focus on technical stack, projects, and certifications.",
            JobRole::Sales => "Focus on targets achieved, communication, and networking.",
            JobRole::Support => "Focus on problem solving, empathy, and shift flexibility.",
            JobRole::Fresher => {
                "Focus on internships, academic projects, and extracurriculars."
            }
            JobRole::Finance => {
                "Focus on accuracy, accounting standards, and tools like Tally."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub degree: String,
    pub college: String,
    pub year: String,
    pub percentage: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub title: String,
    pub company: String,
    pub duration: String,
    pub description: String,
}

/// Everything the user typed into the builder form. Lives for one request on
/// the server; the client keeps a draft copy locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub location: String,
    pub job_role: JobRole,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}
