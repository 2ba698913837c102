//! Verification orchestrator
//!
//! Runs the three leaf checks against one image and reduces their outcomes to
//! a single [`VerificationResult`].
//!
//! # Concurrency
//! The leaves share no data, so they fan out on separate tasks and the
//! reducer waits for all three. Each leaf enforces its own timeout. A leaf
//! task that panics is isolated by its `JoinHandle` and replaced with that
//! leaf's neutral default; it cannot delay or abort the other two.
//!
//! # Error Handling
//! Nothing here returns an error. Every leaf failure ends up as an annotated
//! neutral outcome and, through the reducer, in `error_message`.

use std::sync::Arc;
use tokio::task::JoinError;
use tracing::{error, info};

use crate::extractors::{GenerationDetector, MetadataExtractor, SimilarityProber};
use crate::fusion;
use crate::models::{
    GenerationOutcome, MetadataOutcome, SimilarityOutcome, VerificationRequest, VerificationResult,
};

/// Image verification pipeline
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct Verifier {
    metadata: MetadataExtractor,
    similarity: Arc<SimilarityProber>,
    generation: Arc<GenerationDetector>,
}

impl Verifier {
    pub fn new(
        metadata: MetadataExtractor,
        similarity: SimilarityProber,
        generation: GenerationDetector,
    ) -> Self {
        Self {
            metadata,
            similarity: Arc::new(similarity),
            generation: Arc::new(generation),
        }
    }

    pub fn similarity(&self) -> &SimilarityProber {
        &self.similarity
    }

    pub fn generation(&self) -> &GenerationDetector {
        &self.generation
    }

    /// Verify one image; always yields a complete result
    pub async fn verify(&self, request: &VerificationRequest) -> VerificationResult {
        info!(
            user_id = %request.user_id(),
            image_name = %request.image_name(),
            bytes = request.image().len(),
            "Starting image verification"
        );

        let metadata_task = {
            let extractor = self.metadata;
            let image = Arc::clone(request.image());
            tokio::task::spawn_blocking(move || extractor.extract(&image))
        };

        let similarity_task = {
            let prober = Arc::clone(&self.similarity);
            let image = Arc::clone(request.image());
            tokio::spawn(async move { prober.probe(&image).await })
        };

        let generation_task = {
            let detector = Arc::clone(&self.generation);
            let image = Arc::clone(request.image());
            tokio::spawn(async move { detector.detect(&image).await })
        };

        let (metadata, similarity, generation) =
            tokio::join!(metadata_task, similarity_task, generation_task);

        let metadata = metadata.unwrap_or_else(|e| {
            error!(error = %e, "Metadata extraction task failed");
            MetadataOutcome::missing(leaf_failure(&e))
        });
        let similarity = similarity.unwrap_or_else(|e| {
            error!(error = %e, "Reverse image search task failed");
            SimilarityOutcome::neutral(leaf_failure(&e))
        });
        let generation = generation.unwrap_or_else(|e| {
            error!(error = %e, "AI detection task failed");
            GenerationOutcome::errored(leaf_failure(&e))
        });

        let result = fusion::build_result(request, metadata, similarity, generation);

        info!(
            id = %result.id,
            score = result.score,
            status = %result.status,
            degraded = result.error_message.is_some(),
            "Verification complete"
        );

        result
    }
}

fn leaf_failure(err: &JoinError) -> String {
    if err.is_panic() {
        "check panicked".to_string()
    } else {
        format!("check did not finish: {}", err)
    }
}
