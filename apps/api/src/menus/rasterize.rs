//! Page rasterisation: turn a stored upload into an ordered, 1-indexed
//! sequence of page images.
//!
//! PDFs are rendered through pdfium at 200 DPI and re-encoded as JPEG
//! (quality 92). pdfium wraps a C++ library with thread-local state, so
//! rendering runs on the blocking thread pool, never on async workers.
//! The library is bound at call time; a host without it surfaces a
//! capability-unavailable error instead of failing at startup.
//!
//! A plain image upload skips rendering entirely and becomes one page,
//! bytes verbatim.

use std::io::Cursor;
use std::path::Path;

use anyhow::{anyhow, Context};
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use pdfium_render::prelude::*;
use tracing::debug;

use crate::errors::AppError;

pub const RENDER_DPI: f32 = 200.0;
pub const JPEG_QUALITY: u8 = 92;

/// One page image ready for the vision model.
#[derive(Debug, Clone)]
pub struct PageImage {
    /// 1-indexed page number.
    pub page: u32,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Rasterises a stored upload into page images.
pub async fn rasterize_pages(path: &Path) -> Result<Vec<PageImage>, AppError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => {
            let path = path.to_path_buf();
            tokio::task::spawn_blocking(move || render_pdf_blocking(&path))
                .await
                .map_err(|e| anyhow!("Render task panicked: {e}"))?
        }
        "jpg" | "jpeg" => single_image_page(path, "image/jpeg").await,
        "png" => single_image_page(path, "image/png").await,
        other => Err(AppError::Validation(format!(
            "Stored file has unsupported extension '.{other}'"
        ))),
    }
}

/// A single image upload is one page, bytes verbatim.
async fn single_image_page(
    path: &Path,
    media_type: &'static str,
) -> Result<Vec<PageImage>, AppError> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read stored image {}", path.display()))?;
    Ok(vec![PageImage {
        page: 1,
        media_type,
        bytes,
    }])
}

/// Blocking implementation of PDF page rendering.
fn render_pdf_blocking(pdf_path: &Path) -> Result<Vec<PageImage>, AppError> {
    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        AppError::CapabilityUnavailable(format!(
            "PDF rendering is not available on this host (pdfium not found): {e:?}"
        ))
    })?;
    let pdfium = Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| AppError::Validation(format!("Could not open PDF: {e:?}")))?;

    let pages = document.pages();
    debug!("PDF loaded: {} pages", pages.len());

    let mut results = Vec::with_capacity(pages.len() as usize);

    for (index, page) in pages.iter().enumerate() {
        let page_number = (index + 1) as u32;

        // Points are 1/72", so pixel dimensions follow from the DPI target.
        let width_px = (page.width().value / 72.0 * RENDER_DPI).round() as i32;
        let height_px = (page.height().value / 72.0 * RENDER_DPI).round() as i32;
        let render_config = PdfRenderConfig::new()
            .set_target_width(width_px)
            .set_maximum_height(height_px);

        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| anyhow!("Rasterisation failed for page {page_number}: {e:?}"))?;

        let rgb = bitmap.as_image().to_rgb8();
        debug!(
            "Rendered page {} → {}x{} px",
            page_number,
            rgb.width(),
            rgb.height()
        );

        let bytes = encode_jpeg(&rgb)
            .with_context(|| format!("JPEG encoding failed for page {page_number}"))?;

        results.push(PageImage {
            page: page_number,
            media_type: "image/jpeg",
            bytes,
        });
    }

    Ok(results)
}

/// Re-encode an RGB raster as JPEG at the fixed quality setting.
fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Cursor::new(Vec::new());
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    encoder.encode_image(image)?;
    Ok(buf.into_inner())
}
