//! AI-generation detector
//!
//! Asks the configured detection providers in order and takes the first
//! verdict. If none is configured, or every provider fails or times out, the
//! local [`HeuristicFallback`] answers instead.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

use super::DetectionProvider;
use crate::models::{GenerationOutcome, GenerationSource, NEUTRAL_PROBABILITY};

/// Default budget for the whole detection leaf
pub const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(15);

/// Local stand-in used when no provider verdict is available
///
/// This is a placeholder, not a detector: it always answers the neutral
/// probability so a fallback result reads as "unknown, review manually".
/// Keep the return value stable until real heuristics exist.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicFallback;

impl HeuristicFallback {
    pub const PROBABILITY: f64 = NEUTRAL_PROBABILITY;

    pub fn estimate(&self, _image: &[u8]) -> f64 {
        Self::PROBABILITY
    }

    fn outcome(&self, image: &[u8], reason: String) -> GenerationOutcome {
        GenerationOutcome {
            probability: self.estimate(image),
            source: GenerationSource::Fallback,
            error: Some(reason),
        }
    }
}

/// Generation-likelihood leaf check
pub struct GenerationDetector {
    providers: Vec<Arc<dyn DetectionProvider>>,
    timeout: Duration,
    fallback: HeuristicFallback,
}

impl GenerationDetector {
    /// Providers are consulted in the given order
    pub fn new(providers: Vec<Arc<dyn DetectionProvider>>, timeout: Duration) -> Self {
        Self {
            providers,
            timeout,
            fallback: HeuristicFallback,
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.providers.is_empty()
    }

    /// Produce a generation probability; never fails
    pub async fn detect(&self, image: &[u8]) -> GenerationOutcome {
        if self.providers.is_empty() {
            warn!("No AI detection provider configured, using fallback detection");
            let reason = "No detection provider configured, fallback used".to_string();
            return self.fallback.outcome(image, reason);
        }

        // One budget for the whole leaf; later providers get what is left
        let deadline = Instant::now() + self.timeout;
        let mut failures = Vec::new();

        for provider in &self.providers {
            let source = provider.source();
            match tokio::time::timeout_at(deadline, provider.detect(image)).await {
                Ok(Ok(verdict)) => {
                    let probability = verdict.probability();
                    debug!(%source, ?verdict, probability, "AI detection complete");
                    return GenerationOutcome {
                        probability,
                        source,
                        error: None,
                    };
                }
                Ok(Err(e)) => {
                    warn!(%source, error = %e, "AI detection provider failed");
                    failures.push(format!("{}: {}", source, e));
                }
                Err(_) => {
                    warn!(%source, timeout = ?self.timeout, "AI detection timed out");
                    failures.push(format!("{}: timed out after {:?}", source, self.timeout));
                    break;
                }
            }
        }

        self.fallback.outcome(image, format!("{}; fallback used", failures.join(", ")))
    }
}
