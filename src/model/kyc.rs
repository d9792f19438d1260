use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A patient's document-verification request waiting for staff assistance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycAssistanceRequest {
    pub id: u64,
    pub patient: String,
    pub patient_id: u64,
    #[serde(default)]
    pub documents: Vec<String>,
    pub submitted_date: DateTime<Utc>,
    pub status: KycStatus,
}

/// Single-step lifecycle: the Assist action jumps straight to `assisted`,
/// there is no partial or resumable state.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum KycStatus {
    Pending,
    InProgress,
    Assisted,
}
