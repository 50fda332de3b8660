use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::package::PackageType;

/// Credits granted by every successful payment verification.
pub const STARTING_CREDITS: i64 = 3;

/// Server-side entitlement for one hashed identifier. This record, not any
/// client-held state, decides whether a generation may run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaidAccess {
    pub payment_id: String,
    pub package_type: PackageType,
    pub verified_at: DateTime<Utc>,
    pub credits: i64,
}

impl PaidAccess {
    pub fn fresh(payment_id: String, package_type: PackageType) -> Self {
        Self {
            payment_id,
            package_type,
            verified_at: Utc::now(),
            credits: STARTING_CREDITS,
        }
    }

    pub fn has_credits(&self) -> bool {
        self.credits > 0
    }
}
