//! Upload ingestion: extension validation, identifier assignment, persistence.
//!
//! The extension check runs before any bytes touch storage, so a rejected
//! upload leaves no file behind. There is no content sniffing and no
//! duplicate detection.

use std::path::Path;

use anyhow::Context;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::menu::{MenuRecord, PageOutcome};

/// File extensions accepted by `POST /menus/upload`, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "pdf"];

/// Validates the upload filename's extension against the allow-list.
/// Returns the lowercased extension on success.
pub fn validate_extension(filename: &str) -> Result<String, AppError> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| {
            AppError::Validation(format!("File '{filename}' has no extension"))
        })?;

    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(AppError::Validation(format!(
            "Unsupported file type '.{ext}' — expected one of: .jpg, .jpeg, .png, .pdf"
        )))
    }
}

/// Persists an upload and builds its menu record. The stored path is derived
/// from the fresh identifier and the (validated) extension.
pub async fn store_upload(
    upload_dir: &Path,
    filename: &str,
    bytes: &[u8],
) -> Result<MenuRecord, AppError> {
    let ext = validate_extension(filename)?;
    let menu_id = Uuid::new_v4();
    let stored_path = upload_dir.join(format!("{menu_id}.{ext}"));

    tokio::fs::write(&stored_path, bytes)
        .await
        .with_context(|| format!("Failed to write upload to {}", stored_path.display()))?;

    tracing::info!(
        "Stored upload '{}' as {} ({} bytes)",
        filename,
        stored_path.display(),
        bytes.len()
    );

    Ok(MenuRecord {
        menu_id,
        filename: filename.to_string(),
        stored_path,
        created_at: Utc::now(),
        pages: None,
    })
}

/// Writes the parsed-pages cache file next to the upload, keyed by id.
/// No cleanup or expiry policy applies to these files.
pub async fn write_pages_cache(
    upload_dir: &Path,
    menu_id: Uuid,
    pages: &[PageOutcome],
) -> Result<(), AppError> {
    let cache_path = upload_dir.join(format!("{menu_id}.pages.json"));
    let json = serde_json::to_vec_pretty(pages)
        .context("Failed to serialize parsed pages")?;
    tokio::fs::write(&cache_path, json)
        .await
        .with_context(|| format!("Failed to write page cache to {}", cache_path.display()))?;
    Ok(())
}
