//! Data models for the claims console.
//!
//! Shapes mirror the adjudication API's JSON payloads. Deserialization is
//! deliberately tolerant: unknown fields are ignored and optional fields
//! default, so the client keeps rendering when the backend grows its schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A named collection of claims produced by one upload or pipeline run.
/// Immutable from the client's perspective once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub filename: String,
    #[serde(default = "unknown_source")]
    pub source_system: String,
    #[serde(default)]
    pub record_count: u64,
}

fn unknown_source() -> String {
    "unknown".to_string()
}

/// Adjudication status of a single claim.
///
/// Servers may emit statuses beyond the two the UI styles specially; anything
/// unrecognized lands in `Other` rather than failing deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimStatus {
    Approved,
    Denied,
    #[serde(other)]
    Other,
}

impl std::fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClaimStatus::Approved => write!(f, "approved"),
            ClaimStatus::Denied => write!(f, "denied"),
            ClaimStatus::Other => write!(f, "other"),
        }
    }
}

/// A single billing record with its adjudication outcome. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    pub claim_id: String,
    pub status: ClaimStatus,
    #[serde(default)]
    pub denial_reason: Option<String>,
    #[serde(default)]
    pub eligibility: bool,
}

impl Claim {
    /// Denial reason for display; approved claims carry none.
    pub fn denial_reason_display(&self) -> &str {
        self.denial_reason.as_deref().unwrap_or("-")
    }
}

/// A claim the pipeline flagged as correctable and eligible for resubmission.
///
/// The referenced `claim_id` is expected to exist within the same dataset, but
/// that is enforced server-side; the client renders whatever it is given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResubmissionCandidate {
    pub claim_id: String,
    pub resubmission_reason: String,
    pub recommended_changes: String,
    #[serde(default)]
    pub source_system: Option<String>,
}

/// Result of one end-to-end pipeline invocation. Superseded by the next run;
/// the most recent one is retrievable via `/api/pipeline/last` regardless of
/// which session produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PipelineRunResult {
    #[serde(default)]
    pub candidates: Vec<ResubmissionCandidate>,
    /// Opaque key/value metrics object; rendered as-is.
    #[serde(default)]
    pub metrics: Value,
    #[serde(default)]
    pub rejections_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
