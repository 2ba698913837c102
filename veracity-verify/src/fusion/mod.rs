// Fusion - folds the three leaf outcomes into one score and verdict
//
// Pure functions only: the same three outcomes always produce the same score,
// status and error summary.

use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::models::{
    GenerationOutcome, MetadataOutcome, MetadataStatus, SimilarityOutcome, VerificationRequest,
    VerificationResult, VerificationStatus,
};

/// Starting point before any signal is applied
pub const BASE_SCORE: f64 = 50.0;

/// Weight applied to `confidence - 0.5` (±15 points)
pub const SIMILARITY_WEIGHT: f64 = 30.0;

/// Weight applied to `0.5 - probability` (±20 points)
pub const GENERATION_WEIGHT: f64 = 40.0;

/// Metadata contribution: +30 complete, +15 partial, -10 missing
pub fn metadata_term(status: MetadataStatus) -> f64 {
    match status {
        MetadataStatus::Complete => 30.0,
        MetadataStatus::Partial => 15.0,
        MetadataStatus::Missing => -10.0,
    }
}

/// Reverse-search contribution; fewer matches raise the score
pub fn similarity_term(confidence: f64) -> f64 {
    (confidence - 0.5) * SIMILARITY_WEIGHT
}

/// AI-detection contribution; lower generation probability raises the score
pub fn generation_term(probability: f64) -> f64 {
    (1.0 - probability - 0.5) * GENERATION_WEIGHT
}

/// Compute the 0-100 trust score
///
/// Rounds to the nearest integer, then clamps. Out-of-range inputs still land
/// inside [0, 100].
pub fn compute_score(metadata: MetadataStatus, confidence: f64, probability: f64) -> u8 {
    let raw = BASE_SCORE
        + metadata_term(metadata)
        + similarity_term(confidence)
        + generation_term(probability);

    if raw.is_nan() {
        return 0;
    }

    raw.round().clamp(0.0, 100.0) as u8
}

/// Join leaf errors into one summary, prefixed by leaf name
///
/// Returns `None` when no leaf reported an error.
pub fn combine_errors(
    metadata: &MetadataOutcome,
    similarity: &SimilarityOutcome,
    generation: &GenerationOutcome,
) -> Option<String> {
    let errors: Vec<String> = [
        ("EXIF", metadata.error.as_deref()),
        ("Reverse search", similarity.error.as_deref()),
        ("AI detection", generation.error.as_deref()),
    ]
    .into_iter()
    .filter_map(|(leaf, error)| error.map(|e| format!("{}: {}", leaf, e)))
    .collect();

    if errors.is_empty() {
        None
    } else {
        Some(errors.join("; "))
    }
}

/// Assemble the final record from the request and the three outcomes
pub fn build_result(
    request: &VerificationRequest,
    metadata: MetadataOutcome,
    similarity: SimilarityOutcome,
    generation: GenerationOutcome,
) -> VerificationResult {
    let score = compute_score(metadata.status, similarity.confidence, generation.probability);
    let status = VerificationStatus::from_score(score);
    let error_message = combine_errors(&metadata, &similarity, &generation);
    let timestamp = Utc::now();

    VerificationResult {
        id: Uuid::new_v4(),
        image_url: format!(
            "uploaded/{}/{}_{}",
            request.user_id(),
            timestamp.timestamp_millis(),
            request.image_name()
        ),
        image_sha256: sha256_hex(request.image()),
        user_id: request.user_id().to_string(),
        score,
        status,
        ai_generated_probability: generation.probability,
        ai_detection_source: generation.source,
        reverse_image_match_confidence: similarity.confidence,
        reverse_image_match_count: similarity.match_count,
        metadata_status: metadata.status,
        metadata: metadata.fields,
        timestamp,
        error_message,
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}
