//! Per-student result artifacts — plain-text files written after each
//! grading pass. Best-effort: callers log and continue on failure.

use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs;

use crate::errors::AppError;
use crate::submission::EssaySubmission;

/// Reduces a student name to a filesystem-safe file stem.
fn safe_file_stem(student_name: &str) -> String {
    let stem: String = student_name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();

    if stem.chars().all(|c| c == '_') {
        "unnamed_student".to_string()
    } else {
        stem
    }
}

/// Writes `{results_dir}/{student}_results.txt` containing the name,
/// original essay, summary, and grade report. Creates the directory on
/// demand and returns the path written.
pub async fn write_result_artifact(
    results_dir: &str,
    submission: &EssaySubmission,
    summary: &str,
    report_text: &str,
) -> Result<PathBuf, AppError> {
    fs::create_dir_all(results_dir).await?;

    let path = Path::new(results_dir).join(format!(
        "{}_results.txt",
        safe_file_stem(&submission.student_name)
    ));

    let body = format!(
        "Student Name: {}\nGraded At: {}\n\nOriginal Essay:\n{}\n\nSummary:\n{}\n\nGrade:\n{}\n",
        submission.student_name,
        Utc::now().to_rfc3339(),
        submission.original_text,
        summary,
        report_text
    );

    fs::write(&path, body).await?;
    Ok(path)
}
