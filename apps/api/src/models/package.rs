use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Purchasable packages. The price table below is the only source of truth for
/// what is charged; clients never send an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PackageType {
    ResumeOnly,
    ResumeCover,
    JobReadyPack,
}

impl PackageType {
    pub const ALL: [PackageType; 3] = [
        PackageType::ResumeOnly,
        PackageType::ResumeCover,
        PackageType::JobReadyPack,
    ];

    /// Price in whole rupees.
    pub fn price_inr(self) -> u32 {
        match self {
            PackageType::ResumeOnly => 199,
            PackageType::ResumeCover => 299,
            PackageType::JobReadyPack => 499,
        }
    }

    /// Price in paise, the unit the gateway expects.
    pub fn amount_paise(self) -> u64 {
        u64::from(self.price_inr()) * 100
    }

    pub fn label(self) -> &'static str {
        match self {
            PackageType::ResumeOnly => "Resume Only",
            PackageType::ResumeCover => "Resume + Cover Letter",
            PackageType::JobReadyPack => "Job Ready Pack (All-in-One)",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PackageType::ResumeOnly => "RESUME_ONLY",
            PackageType::ResumeCover => "RESUME_COVER",
            PackageType::JobReadyPack => "JOB_READY_PACK",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPackage(pub String);

impl fmt::Display for UnknownPackage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid package: {}", self.0)
    }
}

impl FromStr for PackageType {
    type Err = UnknownPackage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PackageType::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPackage(s.to_string()))
    }
}
