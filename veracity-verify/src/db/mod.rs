//! Result store for veracity-verify
//!
//! SQLite-backed. The pool is created once at startup and handed to the HTTP
//! layer through `AppState`.

pub mod verifications;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Creates the database file and its parent folder if missing.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the verification tables if they don't exist
pub async fn init_tables(pool: &SqlitePool) -> veracity_common::Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS verifications (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            image_url TEXT NOT NULL,
            image_sha256 TEXT NOT NULL,
            score INTEGER NOT NULL,
            status TEXT NOT NULL,
            ai_generated_probability REAL NOT NULL,
            ai_detection_source TEXT NOT NULL,
            reverse_image_match_confidence REAL NOT NULL,
            reverse_image_match_count INTEGER NOT NULL,
            metadata_status TEXT NOT NULL,
            metadata TEXT NOT NULL,
            error_message TEXT,
            timestamp TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_verifications_user_time
         ON verifications (user_id, timestamp DESC)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (verifications)");

    Ok(())
}
