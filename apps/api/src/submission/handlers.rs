use axum::extract::{Multipart, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::input::{ensure_min_words, sanitize, sanitize_with_limit, word_count};
use crate::state::AppState;
use crate::submission::{ocr, EssaySubmission};

/// Bound on the free-text context field.
const MAX_CONTEXT_CHARS: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct SubmitEssayRequest {
    pub session_id: Uuid,
    pub student_name: String,
    pub essay: String,
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitEssayResponse {
    pub student_name: String,
    pub essay: String,
    pub word_count: usize,
}

/// Normalizes and gates one intake, whatever its source.
/// Essay floor and non-empty context are checked before anything is stored.
fn build_submission(
    student_name: &str,
    essay: &str,
    context: &str,
    min_words: usize,
) -> Result<EssaySubmission, AppError> {
    let student_name = sanitize(student_name);
    let student_name = if student_name.is_empty() {
        "Unnamed Student".to_string()
    } else {
        student_name
    };

    let essay = sanitize(essay);
    ensure_min_words(&essay, min_words)?;

    let context = sanitize_with_limit(context, MAX_CONTEXT_CHARS);
    if context.is_empty() {
        return Err(AppError::Validation(
            "Error: Please provide context for grading.".to_string(),
        ));
    }

    Ok(EssaySubmission {
        student_name,
        original_text: essay,
        context_text: context,
    })
}

async fn store_submission(
    state: &AppState,
    session_id: Uuid,
    submission: EssaySubmission,
) -> Result<Json<SubmitEssayResponse>, AppError> {
    let response = SubmitEssayResponse {
        student_name: submission.student_name.clone(),
        word_count: word_count(&submission.original_text),
        essay: submission.original_text.clone(),
    };

    state
        .sessions
        .with_session(session_id, |session| {
            session.submission = Some(submission);
        })
        .await?;

    info!(
        "Stored submission for session {session_id}: student '{}', {} words",
        response.student_name, response.word_count
    );

    Ok(Json(response))
}

/// POST /api/v1/submission
pub async fn handle_submit_essay(
    State(state): State<AppState>,
    Json(req): Json<SubmitEssayRequest>,
) -> Result<Json<SubmitEssayResponse>, AppError> {
    let submission = build_submission(
        &req.student_name,
        &req.essay,
        &req.context,
        state.config.min_word_count,
    )?;
    store_submission(&state, req.session_id, submission).await
}

/// POST /api/v1/submission/image
///
/// Multipart fields: `session_id`, `student_name`, `context`, `image`.
/// The image is transcribed by the vision call before the usual gates run.
pub async fn handle_submit_image(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitEssayResponse>, AppError> {
    let mut session_id: Option<Uuid> = None;
    let mut student_name = String::new();
    let mut context = String::new();
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart request: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "session_id" => {
                let raw = read_text_field(field).await?;
                session_id = Some(
                    Uuid::parse_str(raw.trim())
                        .map_err(|_| AppError::Validation("Invalid session_id".to_string()))?,
                );
            }
            "student_name" => student_name = read_text_field(field).await?,
            "context" => context = read_text_field(field).await?,
            "image" => {
                let filename = field.file_name().unwrap_or("upload").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read image: {e}")))?;
                image = Some((data.to_vec(), filename));
            }
            _ => {}
        }
    }

    let session_id =
        session_id.ok_or_else(|| AppError::Validation("Missing session_id field".to_string()))?;
    let (data, filename) =
        image.ok_or_else(|| AppError::Validation("Missing image field".to_string()))?;

    let essay = ocr::image_to_text(state.llm.as_ref(), &data, &filename).await?;

    let submission = build_submission(
        &student_name,
        &essay,
        &context,
        state.config.min_word_count,
    )?;
    store_submission(&state, session_id, submission).await
}

async fn read_text_field(field: axum::extract::multipart::Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart field: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn essay_of(words: usize) -> String {
        vec!["salita"; words].join(" ")
    }

    #[test]
    fn test_build_submission_sanitizes_fields() {
        let submission = build_submission(
            "  Juan   Dela Cruz ",
            &format!("<b>{}</b>", essay_of(25)),
            "Sanaysay tungkol sa pamilya",
            20,
        )
        .unwrap();

        assert_eq!(submission.student_name, "Juan Dela Cruz");
        assert!(!submission.original_text.contains('<'));
        assert!(!submission.original_text.contains('>'));
        assert_eq!(word_count(&submission.original_text), 25);
    }

    #[test]
    fn test_build_submission_defaults_blank_name() {
        let submission = build_submission("   ", &essay_of(25), "context", 20).unwrap();
        assert_eq!(submission.student_name, "Unnamed Student");
    }

    #[test]
    fn test_build_submission_rejects_short_essay() {
        let err = build_submission("Juan", &essay_of(5), "context", 20).unwrap_err();
        assert!(err.to_string().contains("salita"));
    }

    #[test]
    fn test_build_submission_bounds_context_length() {
        let long_context = "x".repeat(3000);
        let submission = build_submission("Juan", &essay_of(25), &long_context, 20).unwrap();
        assert_eq!(submission.context_text.chars().count(), MAX_CONTEXT_CHARS);
    }

    #[test]
    fn test_build_submission_rejects_missing_context() {
        let err = build_submission("Juan", &essay_of(25), "  ", 20).unwrap_err();
        assert!(err.to_string().contains("context"));
    }
}
