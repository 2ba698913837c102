//! Hive moderation API client (AI-generated content detection)
//!
//! The sync task endpoint answers with a loosely structured body. Only
//! `status.output` is read, and only four flags in it matter:
//!
//! | flag                        | verdict     |
//! |-----------------------------|-------------|
//! | `generated`, `ai_generated` | Generated   |
//! | `authentic`, `real`         | Authentic   |
//! | anything else               | Unrecognized|
//!
//! A body that is valid JSON but does not fit this shape is Unrecognized
//! rather than an error.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{upload_descriptor, ProviderError};
use crate::extractors::{DetectionProvider, DetectorVerdict};
use crate::models::GenerationSource;

pub const HIVE_TASK_URL: &str = "https://api.thehive.ai/api/v2/task/sync";

#[derive(Debug, Deserialize)]
struct HiveResponse {
    status: Option<HiveStatus>,
}

#[derive(Debug, Deserialize)]
struct HiveStatus {
    output: Option<HiveOutput>,
}

#[derive(Debug, Default, Deserialize)]
struct HiveOutput {
    generated: Option<Signal>,
    ai_generated: Option<Signal>,
    authentic: Option<Signal>,
    real: Option<Signal>,
}

/// A flag value as the provider may send it
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Signal {
    Flag(bool),
    Score(f64),
    Label(String),
    Other(serde_json::Value),
}

impl Signal {
    fn is_set(&self) -> bool {
        match self {
            Signal::Flag(b) => *b,
            Signal::Score(s) => *s != 0.0 && !s.is_nan(),
            Signal::Label(s) => !s.is_empty(),
            Signal::Other(v) => !v.is_null(),
        }
    }
}

fn is_set(signal: &Option<Signal>) -> bool {
    signal.as_ref().is_some_and(Signal::is_set)
}

impl HiveOutput {
    fn verdict(&self) -> DetectorVerdict {
        if is_set(&self.generated) || is_set(&self.ai_generated) {
            DetectorVerdict::Generated
        } else if is_set(&self.authentic) || is_set(&self.real) {
            DetectorVerdict::Authentic
        } else {
            DetectorVerdict::Unrecognized
        }
    }
}

/// Interpret a Hive response body
pub(crate) fn interpret(body: serde_json::Value) -> DetectorVerdict {
    match serde_json::from_value::<HiveResponse>(body) {
        Ok(HiveResponse {
            status: Some(HiveStatus {
                output: Some(output),
            }),
        }) => output.verdict(),
        _ => DetectorVerdict::Unrecognized,
    }
}

/// Hive API client
pub struct HiveClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl HiveClient {
    pub fn new(http_client: reqwest::Client, api_key: String, timeout: Duration) -> Self {
        Self {
            http_client,
            api_key,
            base_url: HIVE_TASK_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at a different task endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl DetectionProvider for HiveClient {
    fn source(&self) -> GenerationSource {
        GenerationSource::Hive
    }

    async fn detect(&self, image: &[u8]) -> Result<DetectorVerdict, ProviderError> {
        let (mime, file_name) = upload_descriptor(image);
        let part = Part::bytes(image.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let form = Form::new().part("image", part);

        tracing::debug!(bytes = image.len(), "Querying Hive API");

        let response = self
            .http_client
            .post(&self.base_url)
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.api_key))
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(interpret(body))
    }
}
