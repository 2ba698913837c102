//! Verification workflow
//!
//! Request → leaf checks (concurrent) → fusion → result record.

pub mod orchestrator;

pub use orchestrator::Verifier;
