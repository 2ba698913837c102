//! Data models for veracity-verify
//!
//! - Request payload handed to the pipeline
//! - Per-signal outcomes produced by the three leaf checks
//! - The final verification record returned and persisted

pub mod outcomes;
pub mod request;
pub mod verification_result;

pub use outcomes::{
    GenerationOutcome, GenerationSource, GpsCoordinate, MetadataFields, MetadataOutcome,
    MetadataStatus, SimilarityMatch, SimilarityOutcome, NEUTRAL_CONFIDENCE,
    NEUTRAL_PROBABILITY,
};
pub use request::VerificationRequest;
pub use verification_result::{VerificationResult, VerificationStatus};
