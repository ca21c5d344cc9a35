use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::grading::grader::{grade_essay, GradeReport};
use crate::grading::summary::generate_summary;
use crate::results;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GradeRequest {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct GradeResponse {
    pub student_name: String,
    pub summary: String,
    pub report: GradeReport,
}

/// POST /api/v1/grade
///
/// Runs the full pass for the session's stored submission: summary, then
/// per-criterion grading, then the best-effort result artifact.
pub async fn handle_grade(
    State(state): State<AppState>,
    Json(req): Json<GradeRequest>,
) -> Result<Json<GradeResponse>, AppError> {
    let (submission, rubric) = state
        .sessions
        .with_session(req.session_id, |session| {
            (session.submission.clone(), session.rubric.clone())
        })
        .await?;

    let submission = submission.ok_or_else(|| {
        AppError::Validation("No essay submitted for this session.".to_string())
    })?;

    info!("Processing essay for student '{}'", submission.student_name);

    let min_words = state.config.min_word_count;
    let summary = generate_summary(state.llm.as_ref(), &submission.original_text, min_words).await?;
    let report = grade_essay(
        state.llm.as_ref(),
        &submission.original_text,
        &submission.context_text,
        &rubric,
        min_words,
    )
    .await?;

    // Best-effort artifact: the grading response does not depend on it.
    if let Err(e) = results::write_result_artifact(
        &state.config.results_dir,
        &submission,
        &summary,
        &report.report_text,
    )
    .await
    {
        warn!("Failed to write result artifact: {e}");
    }

    Ok(Json(GradeResponse {
        student_name: submission.student_name,
        summary,
        report,
    }))
}
