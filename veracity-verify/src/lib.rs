//! veracity-verify library interface
//!
//! Image authenticity verification: capture metadata, reverse image search
//! and AI-generation detection folded into one trust score.
//!
//! Exposes public APIs for integration testing.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod extractors;
pub mod fusion;
pub mod models;
pub mod services;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};
pub use crate::workflow::Verifier;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use veracity_common::config::LimitsConfig;

use crate::models::VerificationResult;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Result store
    pub db: SqlitePool,
    /// Verification pipeline
    pub verifier: Arc<Verifier>,
    /// Upload and history limits
    pub limits: LimitsConfig,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last error for diagnostic purposes
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(db: SqlitePool, verifier: Verifier, limits: LimitsConfig) -> Self {
        Self {
            db,
            verifier: Arc::new(verifier),
            limits,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Save a result without holding up the response
    ///
    /// A failed write is logged and kept as `last_error`; the caller never
    /// sees it.
    pub fn persist_in_background(&self, result: VerificationResult) -> tokio::task::JoinHandle<()> {
        let db = self.db.clone();
        let last_error = Arc::clone(&self.last_error);

        tokio::spawn(async move {
            match db::verifications::save_result(&db, &result).await {
                Ok(()) => {
                    tracing::info!(id = %result.id, "Verification result saved");
                }
                Err(e) => {
                    tracing::error!(
                        id = %result.id,
                        error = %e,
                        "Failed to save verification result (response unaffected)"
                    );
                    *last_error.write().await =
                        Some(format!("Failed to save verification result: {}", e));
                }
            }
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.limits.max_upload_bytes;

    Router::new()
        .merge(api::verify_routes(max_upload_bytes))
        .merge(api::history_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
