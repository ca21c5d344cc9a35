// Shared prompt fragments. Each feature module keeps its own prompts.rs
// alongside it; this file holds the cross-cutting pieces.

/// Assessment-language rule appended to every grading prompt.
pub const FILIPINO_ASSESSMENT_INSTRUCTION: &str = "\
    ALWAYS respond in Filipino with a fair assessment. \
    Only assign a failing grade if the student work shows no clear \
    connection to the required topic or criterion.";

/// Instruction for the image-to-text extraction call.
/// Crossed-out words are erasures and must be ignored.
pub const IMAGE_EXTRACTION_INSTRUCTION: &str = "\
    Extract only the plain text from this image. \
    Do not use any special symbols like # or *. \
    If there are crossed-out words, ignore them as they are erasures. \
    Only include the readable text without any formatting.";
