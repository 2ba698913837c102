//! Similarity prober
//!
//! Queries a reverse-image-search provider and converts the match count into
//! a confidence score: 0 matches = 1.0 (most likely original), 10 or more
//! matches = 0.0 (widely reused).

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::ReverseSearchProvider;
use crate::models::SimilarityOutcome;

/// Sample matches kept on an outcome
pub const MAX_SAMPLE_MATCHES: usize = 5;

/// Match count at which confidence reaches zero
const SATURATION_MATCHES: f64 = 10.0;

/// Default provider call budget
pub const DEFAULT_SIMILARITY_TIMEOUT: Duration = Duration::from_secs(10);

/// `max(0, 1 - matches / 10)`
pub fn similarity_confidence(match_count: usize) -> f64 {
    (1.0 - match_count as f64 / SATURATION_MATCHES).max(0.0)
}

/// Reverse-search leaf check
pub struct SimilarityProber {
    provider: Option<Arc<dyn ReverseSearchProvider>>,
    timeout: Duration,
}

impl SimilarityProber {
    /// `provider` is `None` when no credentials are configured
    pub fn new(provider: Option<Arc<dyn ReverseSearchProvider>>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Run the search; never fails and never waits longer than the timeout
    pub async fn probe(&self, image: &[u8]) -> SimilarityOutcome {
        let Some(provider) = &self.provider else {
            warn!("Reverse image search credentials not configured, skipping search");
            return SimilarityOutcome::neutral("API credentials not configured");
        };

        match tokio::time::timeout(self.timeout, provider.search(image)).await {
            Ok(Ok(mut matches)) => {
                let match_count = matches.len();
                matches.truncate(MAX_SAMPLE_MATCHES);
                let confidence = similarity_confidence(match_count);

                debug!(
                    provider = provider.provider_id(),
                    match_count, confidence, "Reverse image search complete"
                );

                SimilarityOutcome {
                    confidence,
                    match_count,
                    matches,
                    error: None,
                }
            }
            Ok(Err(e)) => {
                warn!(provider = provider.provider_id(), error = %e, "Reverse image search failed");
                SimilarityOutcome::neutral(e.to_string())
            }
            Err(_) => {
                warn!(
                    provider = provider.provider_id(),
                    timeout = ?self.timeout,
                    "Reverse image search timed out"
                );
                SimilarityOutcome::neutral(format!("Request timed out after {:?}", self.timeout))
            }
        }
    }
}
