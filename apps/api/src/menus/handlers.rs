use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::menus::ingest::{store_upload, write_pages_cache};
use crate::menus::parser::extract_page;
use crate::menus::rasterize::rasterize_pages;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub menu_id: Uuid,
    pub filename: String,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub menu_id: Uuid,
    pub pages: usize,
    pub status: &'static str,
    /// Page numbers that degraded to placeholders during extraction.
    pub degraded_pages: Vec<u32>,
}

/// POST /menus/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .ok_or_else(|| AppError::Validation("Upload is missing a filename".to_string()))?
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload body: {e}")))?;

        let record = store_upload(&state.config.upload_dir, &filename, &bytes).await?;
        let menu_id = record.menu_id;
        state.store.insert(record);

        return Ok(Json(UploadResponse { menu_id, filename }));
    }

    Err(AppError::Validation(
        "Multipart field 'file' is required".to_string(),
    ))
}

/// POST /menus/:menu_id/parse
///
/// Pages go to the vision model strictly in order, one round-trip each.
/// A degraded page never fails the request; its number is reported in
/// `degraded_pages` instead.
pub async fn handle_parse(
    State(state): State<AppState>,
    Path(menu_id): Path<Uuid>,
) -> Result<Json<ParseResponse>, AppError> {
    let record = state
        .store
        .get(&menu_id)
        .ok_or_else(|| AppError::NotFound(format!("Menu {menu_id} not found")))?;

    let images = rasterize_pages(&record.stored_path).await?;

    let mut outcomes = Vec::with_capacity(images.len());
    for image in &images {
        outcomes.push(extract_page(state.llm.as_ref(), image).await);
    }

    let degraded_pages: Vec<u32> = outcomes
        .iter()
        .filter(|o| o.is_degraded())
        .map(|o| o.page().page)
        .collect();

    write_pages_cache(&state.config.upload_dir, menu_id, &outcomes).await?;

    if !state.store.attach_pages(&menu_id, outcomes) {
        // Evicted between the lookup and the write-back.
        return Err(AppError::NotFound(format!("Menu {menu_id} not found")));
    }

    Ok(Json(ParseResponse {
        menu_id,
        pages: images.len(),
        status: "parsed",
        degraded_pages,
    }))
}
