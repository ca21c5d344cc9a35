//! Essay intake — typed text or image upload, normalized and gated before
//! it enters the session.

pub mod handlers;
pub mod ocr;

use serde::{Deserialize, Serialize};

/// One student's essay for the current session. Overwritten on each new
/// scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssaySubmission {
    pub student_name: String,
    pub original_text: String,
    pub context_text: String,
}
