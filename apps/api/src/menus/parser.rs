//! Per-page vision extraction.
//!
//! One model call per page, strictly in order. A failed or non-conformant
//! call never propagates: the page degrades to a tagged placeholder and the
//! pipeline moves on.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

use crate::llm_client::{parse_json_response, LlmError, ModelProvider};
use crate::menus::prompts::{PAGE_EXTRACT_PROMPT, PAGE_EXTRACT_SYSTEM};
use crate::menus::rasterize::PageImage;
use crate::models::menu::{PageOutcome, ParsedPage};

/// Extracts one page. Never fails: any error degrades to a placeholder.
pub async fn extract_page(model: &dyn ModelProvider, image: &PageImage) -> PageOutcome {
    match try_extract(model, image).await {
        Ok(page) => PageOutcome::Extracted { page },
        Err(e) => {
            warn!("Page {} extraction degraded: {e}", image.page);
            PageOutcome::Degraded {
                page: ParsedPage::placeholder(image.page),
                reason: e.to_string(),
            }
        }
    }
}

async fn try_extract(
    model: &dyn ModelProvider,
    image: &PageImage,
) -> Result<ParsedPage, LlmError> {
    let image_b64 = STANDARD.encode(&image.bytes);
    let prompt = PAGE_EXTRACT_PROMPT.replace("{page}", &image.page.to_string());

    let text = model
        .vision_completion(&prompt, PAGE_EXTRACT_SYSTEM, image.media_type, &image_b64)
        .await?;

    let parsed: ParsedPage = parse_json_response(&text)?;
    parsed.validate(image.page).map_err(LlmError::Schema)?;
    Ok(parsed)
}
