//! Image-to-text extraction via the vision-capable chat call.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::ChatModel;

pub const NO_TEXT_EXTRACTED: &str = "No text could be extracted.";

/// Strips the markdown noise the extraction model tends to emit despite
/// being told not to.
pub fn sanitize_extracted(raw: &str) -> String {
    raw.replace(['#', '*'], "").trim().to_string()
}

/// Sends the uploaded image through the extraction call and returns the
/// cleaned transcription. An unreadable image is unprocessable, not fatal.
pub async fn image_to_text(
    llm: &dyn ChatModel,
    image: &[u8],
    filename: &str,
) -> Result<String, AppError> {
    info!(
        "Extracting text from uploaded image '{}' ({} bytes)",
        filename,
        image.len()
    );

    let raw = llm
        .extract_text_from_image(image, filename)
        .await
        .map_err(|e| AppError::Llm(format!("Image extraction failed: {e}")))?;

    let text = sanitize_extracted(&raw);
    if text.is_empty() {
        warn!("Image '{filename}' produced no readable text");
        return Err(AppError::UnprocessableEntity(NO_TEXT_EXTRACTED.to_string()));
    }

    Ok(text)
}
