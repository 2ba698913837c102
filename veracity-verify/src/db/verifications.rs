//! Verification result persistence
//!
//! Append-only: a result is written once and read back in history queries.
//! Enum columns hold their JSON encoding.

use chrono::SecondsFormat;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;
use veracity_common::{Error, Result};

use crate::models::VerificationResult;

/// Append one result to the store
pub async fn save_result(pool: &SqlitePool, result: &VerificationResult) -> Result<()> {
    // Prepare all column values before touching the database
    let id = result.id.to_string();
    let status = to_json(&result.status, "status")?;
    let source = to_json(&result.ai_detection_source, "ai_detection_source")?;
    let metadata_status = to_json(&result.metadata_status, "metadata_status")?;
    let metadata = to_json(&result.metadata, "metadata")?;
    // Fixed-width UTC timestamps keep lexical and chronological order equal
    let timestamp = result.timestamp.to_rfc3339_opts(SecondsFormat::Micros, true);

    sqlx::query(
        r#"
        INSERT INTO verifications (
            id, user_id, image_url, image_sha256, score, status,
            ai_generated_probability, ai_detection_source,
            reverse_image_match_confidence, reverse_image_match_count,
            metadata_status, metadata, error_message, timestamp
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&result.user_id)
    .bind(&result.image_url)
    .bind(&result.image_sha256)
    .bind(result.score as i64)
    .bind(&status)
    .bind(result.ai_generated_probability)
    .bind(&source)
    .bind(result.reverse_image_match_confidence)
    .bind(result.reverse_image_match_count as i64)
    .bind(&metadata_status)
    .bind(&metadata)
    .bind(&result.error_message)
    .bind(&timestamp)
    .execute(pool)
    .await?;

    tracing::debug!(id = %id, user_id = %result.user_id, "Verification result saved");

    Ok(())
}

/// Load a user's results, newest first
pub async fn load_history(
    pool: &SqlitePool,
    user_id: &str,
    limit: u32,
) -> Result<Vec<VerificationResult>> {
    let rows = sqlx::query(
        r#"
        SELECT id, user_id, image_url, image_sha256, score, status,
               ai_generated_probability, ai_detection_source,
               reverse_image_match_confidence, reverse_image_match_count,
               metadata_status, metadata, error_message, timestamp
        FROM verifications
        WHERE user_id = ?
        ORDER BY timestamp DESC, rowid DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit as i64)
    .fetch_all(pool)
    .await?;

    rows.iter().map(row_to_result).collect()
}

fn row_to_result(row: &sqlx::sqlite::SqliteRow) -> Result<VerificationResult> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id)
        .map_err(|e| Error::Internal(format!("Failed to parse id: {}", e)))?;

    let timestamp: String = row.get("timestamp");
    let timestamp = chrono::DateTime::parse_from_rfc3339(&timestamp)
        .map_err(|e| Error::Internal(format!("Failed to parse timestamp: {}", e)))?
        .with_timezone(&chrono::Utc);

    let score: i64 = row.get("score");
    let match_count: i64 = row.get("reverse_image_match_count");

    Ok(VerificationResult {
        id,
        image_url: row.get("image_url"),
        image_sha256: row.get("image_sha256"),
        user_id: row.get("user_id"),
        score: score.clamp(0, 100) as u8,
        status: from_json(row.get("status"), "status")?,
        ai_generated_probability: row.get("ai_generated_probability"),
        ai_detection_source: from_json(row.get("ai_detection_source"), "ai_detection_source")?,
        reverse_image_match_confidence: row.get("reverse_image_match_confidence"),
        reverse_image_match_count: match_count.max(0) as usize,
        metadata_status: from_json(row.get("metadata_status"), "metadata_status")?,
        metadata: from_json(row.get("metadata"), "metadata")?,
        timestamp,
        error_message: row.get("error_message"),
    })
}

fn to_json<T: serde::Serialize>(value: &T, column: &str) -> Result<String> {
    serde_json::to_string(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize {}: {}", column, e)))
}

fn from_json<T: serde::de::DeserializeOwned>(text: String, column: &str) -> Result<T> {
    serde_json::from_str(&text)
        .map_err(|e| Error::Internal(format!("Failed to deserialize {}: {}", column, e)))
}
