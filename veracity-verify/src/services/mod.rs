//! External provider clients
//!
//! Thin HTTP clients for the reverse-image-search and AI-detection providers.
//! All of them share one `reqwest::Client`, which is safe to reuse across
//! concurrent requests. Every call carries its own timeout.

pub mod hive_client;
pub mod isitai_client;
pub mod tineye_client;

pub use hive_client::HiveClient;
pub use isitai_client::IsItAiClient;
pub use tineye_client::{TinEyeClient, TinEyeCredentials};

use std::time::Duration;
use thiserror::Error;

const USER_AGENT: &str = concat!("veracity-verify/", env!("CARGO_PKG_VERSION"));

/// Provider call errors
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid API credentials")]
    InvalidCredentials,

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),
}

impl ProviderError {
    /// Classify a transport-level reqwest failure
    pub(crate) fn from_reqwest(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout)
        } else {
            ProviderError::Network(err.to_string())
        }
    }

    /// Turn a non-success response into an error, consuming its body
    pub(crate) async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return ProviderError::InvalidCredentials;
        }
        let body = response.text().await.unwrap_or_default();
        ProviderError::Api(status.as_u16(), truncate(&body, 200))
    }
}

/// Build the shared outbound HTTP client
///
/// No client-wide timeout is set; each provider applies its own per request.
pub fn build_http_client() -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Network(e.to_string()))
}

/// Best-effort content type and file name for an outbound image upload
pub(crate) fn upload_descriptor(image: &[u8]) -> (&'static str, String) {
    match infer::get(image) {
        Some(kind) if infer::is_image(image) => {
            (kind.mime_type(), format!("image.{}", kind.extension()))
        }
        _ => ("image/jpeg", "image.jpg".to_string()),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}
