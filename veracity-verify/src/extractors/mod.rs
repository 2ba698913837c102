// Leaf checks - the three independent signal sources
//
// Metadata extractor (local EXIF parse), similarity prober (reverse image
// search), generation detector (AI-content detection with local fallback).
// Each leaf turns every failure into a neutral outcome plus an error note.

use async_trait::async_trait;

use crate::models::{GenerationSource, SimilarityMatch};
use crate::services::ProviderError;

pub mod generation_detector;
pub mod metadata_extractor;
pub mod similarity_prober;

pub use generation_detector::{GenerationDetector, HeuristicFallback};
pub use metadata_extractor::MetadataExtractor;
pub use similarity_prober::{similarity_confidence, SimilarityProber, MAX_SAMPLE_MATCHES};

/// Reverse-image-search backend
#[async_trait]
pub trait ReverseSearchProvider: Send + Sync {
    /// Provider identifier for logs (e.g., "TinEye")
    fn provider_id(&self) -> &'static str;

    /// Return every match the provider found for the image
    async fn search(&self, image: &[u8]) -> Result<Vec<SimilarityMatch>, ProviderError>;
}

/// AI-generation detection backend
#[async_trait]
pub trait DetectionProvider: Send + Sync {
    /// Source recorded on outcomes produced by this provider
    fn source(&self) -> GenerationSource;

    /// Classify the image
    async fn detect(&self, image: &[u8]) -> Result<DetectorVerdict, ProviderError>;
}

/// Probability reported for a "generated" verdict
pub const GENERATED_PROBABILITY: f64 = 0.8;

/// Probability reported for an "authentic" verdict
pub const AUTHENTIC_PROBABILITY: f64 = 0.2;

/// A detection provider's answer, normalized
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorVerdict {
    /// Provider flagged the image as synthetic
    Generated,
    /// Provider flagged the image as a real photograph
    Authentic,
    /// Provider returned a numeric likelihood
    Probability(f64),
    /// Response shape carried no usable verdict
    Unrecognized,
}

impl DetectorVerdict {
    /// Map the verdict onto a generation probability in [0, 1]
    pub fn probability(&self) -> f64 {
        match *self {
            DetectorVerdict::Generated => GENERATED_PROBABILITY,
            DetectorVerdict::Authentic => AUTHENTIC_PROBABILITY,
            DetectorVerdict::Probability(p) if p.is_finite() => p.clamp(0.0, 1.0),
            DetectorVerdict::Probability(_) | DetectorVerdict::Unrecognized => {
                crate::models::NEUTRAL_PROBABILITY
            }
        }
    }
}
