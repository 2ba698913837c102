//! Leaf check outcomes
//!
//! Each leaf check always produces one of these, even when its source failed.
//! A failed source yields the neutral default for that signal plus an error
//! annotation; it never aborts the pipeline.

use serde::{Deserialize, Serialize};

/// Similarity confidence used when the reverse search could not run
pub const NEUTRAL_CONFIDENCE: f64 = 0.5;

/// Generation probability used when no detector verdict is available
pub const NEUTRAL_PROBABILITY: f64 = 0.5;

/// Completeness of the capture metadata found in an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetadataStatus {
    /// Camera identity, capture time and GPS all present
    Complete,
    /// At least one of camera identity, capture time or GPS present
    Partial,
    /// None of them present, or no metadata block at all
    Missing,
}

impl MetadataStatus {
    /// Classify a set of extracted fields
    ///
    /// Camera identity requires both make and model.
    pub fn classify(fields: &MetadataFields) -> Self {
        let has_camera = fields.make.is_some() && fields.model.is_some();
        let has_capture_time = fields.capture_time.is_some();
        let has_gps = fields.gps.is_some();

        if has_camera && has_capture_time && has_gps {
            MetadataStatus::Complete
        } else if has_camera || has_capture_time || has_gps {
            MetadataStatus::Partial
        } else {
            MetadataStatus::Missing
        }
    }
}

impl std::fmt::Display for MetadataStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetadataStatus::Complete => write!(f, "complete"),
            MetadataStatus::Partial => write!(f, "partial"),
            MetadataStatus::Missing => write!(f, "missing"),
        }
    }
}

/// GPS position in signed decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    /// Metres above sea level (negative below)
    pub altitude: Option<f64>,
}

/// Capture metadata attributes, all optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataFields {
    pub make: Option<String>,
    pub model: Option<String>,
    pub software: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub orientation: Option<u32>,
    /// Raw EXIF date string (`YYYY:MM:DD HH:MM:SS`)
    pub capture_time: Option<String>,
    pub gps: Option<GpsCoordinate>,
}

/// Result of the metadata extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataOutcome {
    pub has_metadata: bool,
    pub status: MetadataStatus,
    pub fields: MetadataFields,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetadataOutcome {
    /// Outcome for a successfully parsed metadata block
    pub fn parsed(fields: MetadataFields) -> Self {
        Self {
            has_metadata: true,
            status: MetadataStatus::classify(&fields),
            fields,
            error: None,
        }
    }

    /// Outcome when no metadata could be read
    pub fn missing(error: impl Into<String>) -> Self {
        Self {
            has_metadata: false,
            status: MetadataStatus::Missing,
            fields: MetadataFields::default(),
            error: Some(error.into()),
        }
    }
}

/// One representative reverse-search hit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityMatch {
    pub domain: Option<String>,
    pub image_url: Option<String>,
    pub backlink: Option<String>,
    pub score: Option<f64>,
}

/// Result of the similarity prober
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityOutcome {
    /// 1.0 = no matches found, 0.0 = ten or more matches
    pub confidence: f64,
    pub match_count: usize,
    /// At most five sample matches
    pub matches: Vec<SimilarityMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SimilarityOutcome {
    /// Neutral default substituted when the provider could not answer
    pub fn neutral(error: impl Into<String>) -> Self {
        Self {
            confidence: NEUTRAL_CONFIDENCE,
            match_count: 0,
            matches: Vec::new(),
            error: Some(error.into()),
        }
    }
}

/// Where a generation probability came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationSource {
    /// Hive moderation API
    Hive,
    /// IsItAI detection API
    #[serde(rename = "isitai")]
    IsItAi,
    /// Local placeholder heuristic
    Fallback,
    /// The detector itself failed
    Error,
}

impl std::fmt::Display for GenerationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationSource::Hive => write!(f, "hive"),
            GenerationSource::IsItAi => write!(f, "isitai"),
            GenerationSource::Fallback => write!(f, "fallback"),
            GenerationSource::Error => write!(f, "error"),
        }
    }
}

/// Result of the generation detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOutcome {
    /// Likelihood the image is synthetic (0.0-1.0)
    pub probability: f64,
    pub source: GenerationSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerationOutcome {
    /// Neutral default when the detector could not run at all
    pub fn errored(error: impl Into<String>) -> Self {
        Self {
            probability: NEUTRAL_PROBABILITY,
            source: GenerationSource::Error,
            error: Some(error.into()),
        }
    }
}
