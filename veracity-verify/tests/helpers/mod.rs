//! Shared test utilities for veracity-verify integration tests
//!
//! Not every test binary uses every helper.
#![allow(dead_code)]

use async_trait::async_trait;
use exif::experimental::Writer;
use exif::{Field, In, Rational, Tag, Value};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;
use veracity_common::config::LimitsConfig;
use veracity_verify::extractors::{
    DetectionProvider, DetectorVerdict, GenerationDetector, MetadataExtractor,
    ReverseSearchProvider, SimilarityProber,
};
use veracity_verify::models::{GenerationSource, SimilarityMatch};
use veracity_verify::services::ProviderError;
use veracity_verify::{AppState, Verifier};

pub const TEST_TIMEOUT: Duration = Duration::from_millis(500);

/// Multipart boundary used by [`multipart_body`]
pub const BOUNDARY: &str = "veracity-test-boundary";

/// Reverse search stand-in returning `n` matches
pub struct FixedMatches(pub usize);

#[async_trait]
impl ReverseSearchProvider for FixedMatches {
    fn provider_id(&self) -> &'static str {
        "FixedMatches"
    }

    async fn search(&self, _image: &[u8]) -> Result<Vec<SimilarityMatch>, ProviderError> {
        Ok((0..self.0)
            .map(|i| SimilarityMatch {
                domain: Some(format!("site{}.example", i)),
                ..Default::default()
            })
            .collect())
    }
}

/// Reverse search stand-in that never answers
pub struct HangingSearch;

#[async_trait]
impl ReverseSearchProvider for HangingSearch {
    fn provider_id(&self) -> &'static str {
        "Hanging"
    }

    async fn search(&self, _image: &[u8]) -> Result<Vec<SimilarityMatch>, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(Vec::new())
    }
}

/// Reverse search stand-in that panics
pub struct PanickingSearch;

#[async_trait]
impl ReverseSearchProvider for PanickingSearch {
    fn provider_id(&self) -> &'static str {
        "Panicking"
    }

    async fn search(&self, _image: &[u8]) -> Result<Vec<SimilarityMatch>, ProviderError> {
        panic!("search backend exploded");
    }
}

/// Detection stand-in with a fixed verdict
pub struct FixedVerdict(pub DetectorVerdict);

#[async_trait]
impl DetectionProvider for FixedVerdict {
    fn source(&self) -> GenerationSource {
        GenerationSource::Hive
    }

    async fn detect(&self, _image: &[u8]) -> Result<DetectorVerdict, ProviderError> {
        Ok(self.0)
    }
}

/// Detection stand-in that never answers
pub struct HangingDetector;

#[async_trait]
impl DetectionProvider for HangingDetector {
    fn source(&self) -> GenerationSource {
        GenerationSource::Hive
    }

    async fn detect(&self, _image: &[u8]) -> Result<DetectorVerdict, ProviderError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(DetectorVerdict::Unrecognized)
    }
}

/// Detection stand-in that panics
pub struct PanickingDetector;

#[async_trait]
impl DetectionProvider for PanickingDetector {
    fn source(&self) -> GenerationSource {
        GenerationSource::Hive
    }

    async fn detect(&self, _image: &[u8]) -> Result<DetectorVerdict, ProviderError> {
        panic!("detection backend exploded");
    }
}

/// Verifier wired to the given stand-ins
pub fn verifier_with(
    search: Option<Arc<dyn ReverseSearchProvider>>,
    detectors: Vec<Arc<dyn DetectionProvider>>,
) -> Verifier {
    Verifier::new(
        MetadataExtractor::new(),
        SimilarityProber::new(search, TEST_TIMEOUT),
        GenerationDetector::new(detectors, TEST_TIMEOUT),
    )
}

/// Verifier with no providers configured
pub fn unconfigured_verifier() -> Verifier {
    verifier_with(None, Vec::new())
}

/// In-memory database; `with_tables` false leaves it without a schema
pub async fn test_pool(with_tables: bool) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    if with_tables {
        veracity_verify::db::init_tables(&pool).await.unwrap();
    }
    pool
}

/// App state over an in-memory database
pub async fn test_app_state(verifier: Verifier) -> AppState {
    AppState::new(test_pool(true).await, verifier, LimitsConfig::default())
}

fn ascii(tag: Tag, text: &str) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Ascii(vec![text.as_bytes().to_vec()]),
    }
}

fn rational(tag: Tag, values: &[(u32, u32)]) -> Field {
    Field {
        tag,
        ifd_num: In::PRIMARY,
        value: Value::Rational(
            values
                .iter()
                .map(|&(num, denom)| Rational { num, denom })
                .collect(),
        ),
    }
}

fn tiff_with(fields: &[Field]) -> Vec<u8> {
    let mut writer = Writer::new();
    for field in fields {
        writer.push_field(field);
    }
    let mut buf = Cursor::new(Vec::new());
    writer.write(&mut buf, false).unwrap();
    buf.into_inner()
}

/// TIFF image carrying camera, capture time and GPS tags
pub fn image_with_complete_metadata() -> Vec<u8> {
    tiff_with(&[
        ascii(Tag::Make, "Canon"),
        ascii(Tag::Model, "EOS R5"),
        ascii(Tag::DateTime, "2024:05:01 10:00:00"),
        rational(Tag::GPSLatitude, &[(48, 1), (51, 1), (0, 1)]),
        ascii(Tag::GPSLatitudeRef, "N"),
        rational(Tag::GPSLongitude, &[(2, 1), (21, 1), (0, 1)]),
        ascii(Tag::GPSLongitudeRef, "E"),
    ])
}

/// PNG signature with no metadata behind it
pub fn image_without_metadata() -> Vec<u8> {
    vec![
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, b'I', b'H', b'D', b'R',
    ]
}

/// One part of a multipart form
pub enum FormPart<'a> {
    Text {
        name: &'a str,
        value: &'a str,
    },
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: Option<&'a str>,
        data: &'a [u8],
    },
}

/// Encode parts as `multipart/form-data` with [`BOUNDARY`]
pub fn multipart_body(parts: &[FormPart<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            FormPart::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name)
                        .as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            FormPart::File {
                name,
                file_name,
                content_type,
                data,
            } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                if let Some(ct) = content_type {
                    body.extend_from_slice(format!("Content-Type: {}\r\n", ct).as_bytes());
                }
                body.extend_from_slice(b"\r\n");
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Content-Type header value matching [`multipart_body`]
pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={}", BOUNDARY)
}
