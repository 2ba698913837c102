//! Capture metadata extraction
//!
//! Parses embedded EXIF with `kamadak-exif` and classifies how complete the
//! capture metadata is. Container parsing itself is the library's job; this
//! module only picks out the attributes that matter for authenticity.
//!
//! A parse failure is never fatal: the outcome becomes `missing` with the
//! parser's message attached.

use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;
use thiserror::Error;
use tracing::debug;

use crate::models::{GpsCoordinate, MetadataFields, MetadataOutcome};

/// Metadata extraction errors
#[derive(Debug, Error)]
pub enum MetadataError {
    /// Container could not be parsed or carries no EXIF block
    #[error("{0}")]
    Parse(String),
}

/// EXIF metadata extractor
///
/// Stateless; a pure function of the input bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract and classify capture metadata
    pub fn extract(&self, image: &[u8]) -> MetadataOutcome {
        match read_fields(image) {
            Ok(fields) => {
                let outcome = MetadataOutcome::parsed(fields);
                debug!(status = %outcome.status, "EXIF metadata extracted");
                outcome
            }
            Err(e) => {
                debug!(error = %e, "EXIF extraction failed");
                MetadataOutcome::missing(e.to_string())
            }
        }
    }
}

/// Parse the EXIF block into the attributes we score on
pub fn read_fields(image: &[u8]) -> Result<MetadataFields, MetadataError> {
    let exif = Reader::new()
        .read_from_container(&mut Cursor::new(image))
        .map_err(|e| MetadataError::Parse(e.to_string()))?;

    Ok(MetadataFields {
        make: ascii(&exif, Tag::Make),
        model: ascii(&exif, Tag::Model),
        software: ascii(&exif, Tag::Software),
        width: uint(&exif, Tag::ImageWidth).or_else(|| uint(&exif, Tag::PixelXDimension)),
        height: uint(&exif, Tag::ImageLength).or_else(|| uint(&exif, Tag::PixelYDimension)),
        orientation: uint(&exif, Tag::Orientation),
        capture_time: ascii(&exif, Tag::DateTime)
            .or_else(|| ascii(&exif, Tag::DateTimeOriginal))
            .or_else(|| ascii(&exif, Tag::DateTimeDigitized)),
        gps: gps(&exif),
    })
}

/// First ASCII component of a tag, trimmed; empty strings count as absent
fn ascii(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    match field.value {
        Value::Ascii(ref parts) => parts
            .iter()
            .map(|part| {
                String::from_utf8_lossy(part)
                    .trim_end_matches('\0')
                    .trim()
                    .to_string()
            })
            .find(|s| !s.is_empty()),
        _ => None,
    }
}

fn uint(exif: &Exif, tag: Tag) -> Option<u32> {
    exif.get_field(tag, In::PRIMARY)?.value.get_uint(0)
}

fn rationals(exif: &Exif, tag: Tag) -> Option<Vec<f64>> {
    match exif.get_field(tag, In::PRIMARY)?.value {
        Value::Rational(ref values) if !values.is_empty() => {
            Some(values.iter().map(|r| r.to_f64()).collect())
        }
        _ => None,
    }
}

/// Degrees/minutes/seconds to decimal degrees
fn dms_to_degrees(parts: &[f64]) -> Option<f64> {
    let degrees = *parts.first()?;
    let minutes = parts.get(1).copied().unwrap_or(0.0);
    let seconds = parts.get(2).copied().unwrap_or(0.0);
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    value.is_finite().then_some(value)
}

/// Latitude and longitude are both required; altitude is optional
fn gps(exif: &Exif) -> Option<GpsCoordinate> {
    let mut latitude = dms_to_degrees(&rationals(exif, Tag::GPSLatitude)?)?;
    let mut longitude = dms_to_degrees(&rationals(exif, Tag::GPSLongitude)?)?;

    if ascii(exif, Tag::GPSLatitudeRef).is_some_and(|r| r.eq_ignore_ascii_case("S")) {
        latitude = -latitude;
    }
    if ascii(exif, Tag::GPSLongitudeRef).is_some_and(|r| r.eq_ignore_ascii_case("W")) {
        longitude = -longitude;
    }

    let altitude = rationals(exif, Tag::GPSAltitude)
        .and_then(|values| values.first().copied())
        .filter(|a| a.is_finite())
        .map(|a| {
            // GPSAltitudeRef 1 = below sea level
            if uint(exif, Tag::GPSAltitudeRef) == Some(1) {
                -a
            } else {
                a
            }
        });

    Some(GpsCoordinate {
        latitude,
        longitude,
        altitude,
    })
}
