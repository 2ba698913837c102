//! Provider credential resolution and pipeline assembly
//!
//! Credentials resolve with ENV → TOML priority. Blank values count as unset.
//! A provider without credentials is simply left out; the pipeline then uses
//! that leaf's neutral default.

use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use veracity_common::config::TomlConfig;

use crate::extractors::{
    DetectionProvider, GenerationDetector, MetadataExtractor, ReverseSearchProvider,
    SimilarityProber,
};
use crate::services::{HiveClient, IsItAiClient, TinEyeClient, TinEyeCredentials};
use crate::workflow::Verifier;

pub const TINEYE_API_KEY_ENV: &str = "VERACITY_TINEYE_API_KEY";
pub const TINEYE_API_SECRET_ENV: &str = "VERACITY_TINEYE_API_SECRET";
pub const HIVE_API_KEY_ENV: &str = "VERACITY_HIVE_API_KEY";
pub const ISITAI_API_KEY_ENV: &str = "VERACITY_ISITAI_API_KEY";

/// Resolved provider credentials
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderCredentials {
    pub tineye: Option<TinEyeCredentials>,
    pub hive_api_key: Option<String>,
    pub isitai_api_key: Option<String>,
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// Resolve one credential from environment, then TOML
pub fn resolve_credential(name: &str, env_var: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_var).ok().filter(|k| is_valid_key(k));
    let toml_value = toml_value.filter(|k| is_valid_key(k));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "{} found in both environment and TOML. Using environment (highest priority).",
            name
        );
    }

    if let Some(key) = env_value {
        info!("{} loaded from environment variable", name);
        return Some(key.trim().to_string());
    }

    if let Some(key) = toml_value {
        info!("{} loaded from TOML config", name);
        return Some(key.trim().to_string());
    }

    None
}

/// Resolve all provider credentials
pub fn resolve_provider_credentials(toml_config: &TomlConfig) -> ProviderCredentials {
    let providers = &toml_config.providers;

    let tineye_key = resolve_credential(
        "TinEye API key",
        TINEYE_API_KEY_ENV,
        providers.tineye_api_key.as_deref(),
    );
    let tineye_secret = resolve_credential(
        "TinEye API secret",
        TINEYE_API_SECRET_ENV,
        providers.tineye_api_secret.as_deref(),
    );

    let tineye = match (tineye_key, tineye_secret) {
        (Some(api_key), Some(api_secret)) => Some(TinEyeCredentials { api_key, api_secret }),
        (None, None) => None,
        _ => {
            warn!("TinEye needs both API key and secret; reverse image search disabled");
            None
        }
    };

    ProviderCredentials {
        tineye,
        hive_api_key: resolve_credential(
            "Hive API key",
            HIVE_API_KEY_ENV,
            providers.hive_api_key.as_deref(),
        ),
        isitai_api_key: resolve_credential(
            "IsItAI API key",
            ISITAI_API_KEY_ENV,
            providers.isitai_api_key.as_deref(),
        ),
    }
}

/// Assemble the verification pipeline from configuration
///
/// All provider clients share `http_client`.
pub fn build_verifier(
    toml_config: &TomlConfig,
    credentials: &ProviderCredentials,
    http_client: reqwest::Client,
) -> Verifier {
    let providers = &toml_config.providers;
    let similarity_timeout = Duration::from_secs(providers.similarity_timeout_secs);
    let generation_timeout = Duration::from_secs(providers.generation_timeout_secs);

    let search_provider: Option<Arc<dyn ReverseSearchProvider>> =
        credentials.tineye.clone().map(|creds| {
            let mut client = TinEyeClient::new(http_client.clone(), creds, similarity_timeout);
            if let Some(url) = &providers.tineye_base_url {
                client = client.with_base_url(url.clone());
            }
            Arc::new(client) as Arc<dyn ReverseSearchProvider>
        });

    let mut detection_providers: Vec<Arc<dyn DetectionProvider>> = Vec::new();
    if let Some(key) = &credentials.hive_api_key {
        let mut client = HiveClient::new(http_client.clone(), key.clone(), generation_timeout);
        if let Some(url) = &providers.hive_base_url {
            client = client.with_base_url(url.clone());
        }
        detection_providers.push(Arc::new(client));
    }
    if let Some(key) = &credentials.isitai_api_key {
        let mut client = IsItAiClient::new(http_client.clone(), key.clone(), generation_timeout);
        if let Some(url) = &providers.isitai_base_url {
            client = client.with_base_url(url.clone());
        }
        detection_providers.push(Arc::new(client));
    }

    info!(
        reverse_search = search_provider.is_some(),
        detection_providers = detection_providers.len(),
        "Verification pipeline configured"
    );

    Verifier::new(
        MetadataExtractor::new(),
        SimilarityProber::new(search_provider, similarity_timeout),
        GenerationDetector::new(detection_providers, generation_timeout),
    )
}
