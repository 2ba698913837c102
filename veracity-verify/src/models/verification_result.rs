//! Final verification record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GenerationSource, MetadataFields, MetadataStatus};

/// Authenticity verdict derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VerificationStatus {
    /// Score above 80
    Authentic,
    /// Score from 50 to 80 inclusive
    Suspicious,
    /// Score below 50
    LikelyFake,
}

impl VerificationStatus {
    /// Map a 0-100 score onto a verdict
    pub fn from_score(score: u8) -> Self {
        match score {
            81.. => VerificationStatus::Authentic,
            50..=80 => VerificationStatus::Suspicious,
            _ => VerificationStatus::LikelyFake,
        }
    }
}

impl std::fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationStatus::Authentic => write!(f, "authentic"),
            VerificationStatus::Suspicious => write!(f, "suspicious"),
            VerificationStatus::LikelyFake => write!(f, "likelyFake"),
        }
    }
}

/// Outcome of one verification request
///
/// Built once by the orchestrator and never mutated afterwards. This is both
/// the HTTP response body and the unit written to the result store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    /// Store key
    pub id: Uuid,
    /// Placeholder location of the uploaded image
    pub image_url: String,
    /// Hex SHA-256 of the submitted bytes
    pub image_sha256: String,
    pub user_id: String,
    /// Trust score (0-100)
    #[serde(rename = "verificationScore")]
    pub score: u8,
    pub status: VerificationStatus,
    pub ai_generated_probability: f64,
    pub ai_detection_source: GenerationSource,
    pub reverse_image_match_confidence: f64,
    pub reverse_image_match_count: usize,
    pub metadata_status: MetadataStatus,
    pub metadata: MetadataFields,
    pub timestamp: DateTime<Utc>,
    /// Summary of partial-subsystem failures, if any
    pub error_message: Option<String>,
}
