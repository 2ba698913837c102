//! TinEye reverse image search client
//!
//! Uploads the image as multipart `image` with HTTP basic auth (API key and
//! secret) and returns every match found.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::time::Duration;

use super::{upload_descriptor, ProviderError};
use crate::extractors::ReverseSearchProvider;
use crate::models::SimilarityMatch;

pub const TINEYE_SEARCH_URL: &str = "https://api.tineye.com/rest/search/";

/// TinEye API key pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TinEyeCredentials {
    pub api_key: String,
    pub api_secret: String,
}

#[derive(Debug, Deserialize)]
struct TinEyeResponse {
    #[serde(default)]
    results: Option<TinEyeResults>,
}

/// Older responses carry a bare list; current ones nest it under `matches`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TinEyeResults {
    List(Vec<TinEyeMatch>),
    Nested {
        #[serde(default)]
        matches: Vec<TinEyeMatch>,
    },
}

#[derive(Debug, Deserialize)]
struct TinEyeMatch {
    domain: Option<String>,
    image_url: Option<String>,
    score: Option<f64>,
    #[serde(default)]
    backlinks: Vec<TinEyeBacklink>,
}

#[derive(Debug, Deserialize)]
struct TinEyeBacklink {
    backlink: Option<String>,
}

impl TinEyeResponse {
    fn into_matches(self) -> Vec<SimilarityMatch> {
        let matches = match self.results {
            Some(TinEyeResults::List(list)) => list,
            Some(TinEyeResults::Nested { matches }) => matches,
            None => Vec::new(),
        };

        matches
            .into_iter()
            .map(|m| SimilarityMatch {
                domain: m.domain,
                image_url: m.image_url,
                backlink: m.backlinks.into_iter().find_map(|b| b.backlink),
                score: m.score,
            })
            .collect()
    }
}

/// TinEye API client
pub struct TinEyeClient {
    http_client: reqwest::Client,
    credentials: TinEyeCredentials,
    base_url: String,
    timeout: Duration,
}

impl TinEyeClient {
    pub fn new(
        http_client: reqwest::Client,
        credentials: TinEyeCredentials,
        timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            credentials,
            base_url: TINEYE_SEARCH_URL.to_string(),
            timeout,
        }
    }

    /// Point the client at a different search endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ReverseSearchProvider for TinEyeClient {
    fn provider_id(&self) -> &'static str {
        "TinEye"
    }

    async fn search(&self, image: &[u8]) -> Result<Vec<SimilarityMatch>, ProviderError> {
        let (mime, file_name) = upload_descriptor(image);
        let part = Part::bytes(image.to_vec())
            .file_name(file_name)
            .mime_str(mime)
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        let form = Form::new().part("image", part);

        tracing::debug!(bytes = image.len(), "Querying TinEye API");

        let response = self
            .http_client
            .post(&self.base_url)
            .basic_auth(&self.credentials.api_key, Some(&self.credentials.api_secret))
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| ProviderError::from_reqwest(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: TinEyeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(body.into_matches())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Vec<SimilarityMatch> {
        serde_json::from_str::<TinEyeResponse>(json)
            .unwrap()
            .into_matches()
    }

    #[test]
    fn test_flat_results_list() {
        let matches = parse(
            r#"{"results": [
                {"domain": "a.example", "image_url": "https://a.example/1.jpg", "score": 88.5},
                {"domain": "b.example"}
            ]}"#,
        );
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].domain.as_deref(), Some("a.example"));
        assert_eq!(matches[0].score, Some(88.5));
        assert!(matches[1].image_url.is_none());
    }

    #[test]
    fn test_nested_matches_with_backlinks() {
        let matches = parse(
            r#"{"code": 200, "results": {"total_results": 1, "matches": [
                {"domain": "c.example", "backlinks": [{"backlink": "https://c.example/post"}]}
            ]}}"#,
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].backlink.as_deref(), Some("https://c.example/post"));
    }

    #[test]
    fn test_missing_results_is_empty() {
        assert!(parse(r#"{"code": 200}"#).is_empty());
    }

    #[test]
    fn test_client_defaults_to_public_endpoint() {
        let client = TinEyeClient::new(
            reqwest::Client::new(),
            TinEyeCredentials {
                api_key: "k".to_string(),
                api_secret: "s".to_string(),
            },
            Duration::from_secs(10),
        );
        assert_eq!(client.base_url, TINEYE_SEARCH_URL);
        assert_eq!(client.provider_id(), "TinEye");
    }
}
