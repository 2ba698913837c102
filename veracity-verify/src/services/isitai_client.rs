//! IsItAI detection client
//!
//! Secondary AI-detection provider: JSON body with the base64 image, bearer
//! auth, numeric `ai_probability` in the answer.

use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ProviderError;
use crate::extractors::{DetectionProvider, DetectorVerdict};
use crate::models::GenerationSource;

pub const ISITAI_DETECT_URL: &str = "https://api.isitai.com/v1/detect";

#[derive(Debug, Serialize)]
struct IsItAiRequest {
    image: String,
}

#[derive(Debug, Deserialize)]
struct IsItAiResponse {
    ai_probability: Option<f64>,
}

impl IsItAiResponse {
    fn verdict(&self) -> DetectorVerdict {
        match self.ai_probability {
            Some(p) if p.is_finite() => DetectorVerdict::Probability(p),
            _ => DetectorVerdict::Unrecognized,
        }
    }
}

/// IsItAI API client
pub struct IsItAiClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl IsItAiClient {
    pub fn new(http_client: reqwest::Client, api_key: String, timeout: Duration) -> Self {
        Self {
            http_client,
            api_key,
            base_url: ISITAI_DETECT_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at a different detect endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl DetectionProvider for IsItAiClient {
    fn source(&self) -> GenerationSource {
        GenerationSource::IsItAi
    }

    async fn detect(&self, image: &[u8]) -> Result<DetectorVerdict, ProviderError> {
        let request = IsItAiRequest {
            image: base64::engine::general_purpose::STANDARD.encode(image),
        };

        tracing::debug!(bytes = image.len(), "Querying IsItAI API");

        let response = self
            .http_client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: IsItAiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.verdict())
    }
}
