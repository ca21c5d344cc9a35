//! Filipino summary generation. One LLM call, guarded by the word floor.

use tracing::warn;

use crate::errors::AppError;
use crate::grading::prompts::SUMMARY_PROMPT_TEMPLATE;
use crate::input::ensure_min_words;
use crate::llm_client::ChatModel;

pub const NO_SUMMARY: &str = "No summary could be generated.";

/// Summarizes the essay in Filipino.
///
/// Too-short input is a validation error raised before any call. A call
/// failure degrades to an error string in the summary slot so the grading
/// pass still completes; an empty reply degrades to the no-summary
/// sentinel.
pub async fn generate_summary(
    llm: &dyn ChatModel,
    text: &str,
    min_words: usize,
) -> Result<String, AppError> {
    ensure_min_words(text, min_words)?;

    let prompt = SUMMARY_PROMPT_TEMPLATE.replace("{essay}", text);

    match llm.complete(&prompt).await {
        Ok(content) => {
            let content = content.trim().to_string();
            if content.is_empty() {
                Ok(NO_SUMMARY.to_string())
            } else {
                Ok(content)
            }
        }
        Err(e) => {
            warn!("Summary call failed, degrading to error text: {e}");
            Ok(format!("An error occurred during summarization: {e}"))
        }
    }
}
