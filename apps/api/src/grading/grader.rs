//! Grading orchestrator — one LLM call per rubric criterion, sequentially.
//!
//! Flow: length gate → rubric checks → per-criterion prompt/call/parse →
//! accumulate → percentage → letter grade → report.
//!
//! Failure policy, applied uniformly: a criterion whose call or parse fails
//! degrades to a zero score with a warning and the pass continues. A parsed
//! score above the criterion's cap is clamped, never fatal. The report is
//! always producible once the input gates pass.

use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::grading::parser::{parse_grade_reply, NO_JUSTIFICATION};
use crate::grading::prompts::GRADING_PROMPT_TEMPLATE;
use crate::input::{ensure_min_words, truncate_chars};
use crate::llm_client::prompts::FILIPINO_ASSESSMENT_INSTRUCTION;
use crate::llm_client::ChatModel;
use crate::rubric::{Criterion, Rubric};

/// Prompt-size bound on the essay body.
const ESSAY_PROMPT_CHARS: usize = 1000;

/// Outcome for a single criterion.
#[derive(Debug, Clone, Serialize)]
pub struct GradingResult {
    pub criterion_name: String,
    pub points_received: f64,
    pub points_possible: f64,
    pub justification: String,
}

/// Full outcome of a grading pass.
#[derive(Debug, Clone, Serialize)]
pub struct GradeReport {
    pub total_points_received: f64,
    pub total_points_possible: f64,
    pub percentage: f64,
    pub letter_grade: &'static str,
    pub criteria: Vec<GradingResult>,
    /// Human-readable rendition, also written to the result artifact.
    pub report_text: String,
}

pub async fn grade_essay(
    llm: &dyn ChatModel,
    essay: &str,
    context: &str,
    rubric: &Rubric,
    min_words: usize,
) -> Result<GradeReport, AppError> {
    ensure_min_words(essay, min_words)?;

    if rubric.is_empty() {
        return Err(AppError::Validation("No criteria set for grading.".to_string()));
    }
    let total_possible = rubric.total_points_possible();
    if total_possible <= 0.0 {
        return Err(AppError::Validation(
            "No valid criteria to grade the essay.".to_string(),
        ));
    }

    let truncated = truncate_chars(essay, ESSAY_PROMPT_CHARS);

    let mut total_received = 0.0;
    let mut results = Vec::with_capacity(rubric.criteria().len());

    for criterion in rubric.criteria() {
        let result = grade_one_criterion(llm, truncated, context, criterion).await;
        total_received += result.points_received;
        results.push(result);
    }

    let percentage = total_received / total_possible * 100.0;
    let letter = letter_grade(percentage);
    info!(
        "Grading pass complete: {}/{} ({:.1}%, {})",
        total_received, total_possible, percentage, letter
    );

    let report_text = format_report(total_received, total_possible, letter, &results);

    Ok(GradeReport {
        total_points_received: total_received,
        total_points_possible: total_possible,
        percentage,
        letter_grade: letter,
        criteria: results,
        report_text,
    })
}

/// Grades one criterion. Every failure path degrades to a zero score so
/// the pass always completes.
async fn grade_one_criterion(
    llm: &dyn ChatModel,
    essay: &str,
    context: &str,
    criterion: &Criterion,
) -> GradingResult {
    info!(
        "Grading criterion '{}' ({} points)",
        criterion.name, criterion.points_possible
    );

    let prompt = build_grading_prompt(essay, context, criterion);

    let reply = match llm.complete(&prompt).await {
        Ok(reply) => reply,
        Err(e) => {
            warn!(
                "LLM call failed for criterion '{}', scoring 0: {e}",
                criterion.name
            );
            return zero_result(criterion);
        }
    };

    let parsed = parse_grade_reply(&reply);
    if parsed.points_possible > 0.0 && parsed.points_possible != criterion.points_possible {
        warn!(
            "Reply denominator {} does not match the {}-point cap for criterion '{}'",
            parsed.points_possible, criterion.points_possible, criterion.name
        );
    }

    let mut points_received = parsed.points_received;
    if points_received > criterion.points_possible {
        warn!(
            "Parsed score {} exceeds cap {} for criterion '{}', clamping",
            points_received, criterion.points_possible, criterion.name
        );
        points_received = criterion.points_possible;
    }

    GradingResult {
        criterion_name: criterion.name.clone(),
        points_received,
        points_possible: criterion.points_possible,
        justification: parsed.justification,
    }
}

fn zero_result(criterion: &Criterion) -> GradingResult {
    GradingResult {
        criterion_name: criterion.name.clone(),
        points_received: 0.0,
        points_possible: criterion.points_possible,
        justification: NO_JUSTIFICATION.to_string(),
    }
}

fn build_grading_prompt(essay: &str, context: &str, criterion: &Criterion) -> String {
    let breakdown_section = if criterion.detailed_breakdown.is_empty() {
        String::new()
    } else {
        format!(
            "Detailed criterion breakdown: {}\n\n",
            criterion.detailed_breakdown
        )
    };

    GRADING_PROMPT_TEMPLATE
        .replace("{criterion_name}", &criterion.name)
        .replace("{points_possible}", &criterion.points_possible.to_string())
        .replace("{context}", context)
        .replace("{breakdown_section}", &breakdown_section)
        .replace("{filipino_instruction}", FILIPINO_ASSESSMENT_INSTRUCTION)
        .replace("{essay}", essay)
}

/// Fixed percentage-to-letter table. Monotonic by construction.
pub fn letter_grade(percentage: f64) -> &'static str {
    match percentage {
        p if p >= 98.0 => "A+",
        p if p >= 95.0 => "A",
        p if p >= 93.0 => "A-",
        p if p >= 90.0 => "B+",
        p if p >= 85.0 => "B",
        p if p >= 83.0 => "B-",
        p if p >= 80.0 => "C+",
        p if p >= 78.0 => "C",
        p if p >= 75.0 => "D",
        _ => "F",
    }
}

fn format_report(
    received: f64,
    possible: f64,
    letter: &str,
    results: &[GradingResult],
) -> String {
    let lines: Vec<String> = results
        .iter()
        .map(|r| {
            format!(
                "Criterion: {} - Grade: {}/{} - Justification: {}",
                r.criterion_name, r.points_received, r.points_possible, r.justification
            )
        })
        .collect();

    format!(
        "Final Grade: {received}/{possible} ({letter})\n\n{}",
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::LlmError;

    /// Scripted backend: pops canned replies in order and counts calls.
    /// A `None` reply simulates an LLM failure for that call.
    struct ScriptedModel {
        replies: Mutex<Vec<Option<String>>>,
        calls: AtomicUsize,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Option<&str>>) -> Self {
            Self {
                replies: Mutex::new(
                    replies
                        .into_iter()
                        .map(|r| r.map(str::to_string))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(LlmError::EmptyChoices);
            }
            replies.remove(0).ok_or(LlmError::EmptyChoices)
        }

        async fn extract_text_from_image(
            &self,
            _image: &[u8],
            _filename: &str,
        ) -> Result<String, LlmError> {
            Err(LlmError::EmptyChoices)
        }
    }

    fn criterion(name: &str, points: f64) -> Criterion {
        Criterion {
            name: name.to_string(),
            weight: 1.0,
            points_possible: points,
            detailed_breakdown: String::new(),
        }
    }

    fn rubric_with(criteria: Vec<Criterion>) -> Rubric {
        let mut rubric = Rubric::default();
        for c in criteria {
            rubric.add(c);
        }
        rubric
    }

    fn essay_of(words: usize) -> String {
        vec!["salita"; words].join(" ")
    }

    #[tokio::test]
    async fn test_short_essay_makes_no_llm_calls() {
        let llm = ScriptedModel::new(vec![Some("Grade: 10/10 Justification: n/a")]);
        let rubric = rubric_with(vec![criterion("Content", 10.0)]);

        let result = grade_essay(&llm, &essay_of(5), "context", &rubric, 20).await;

        let err = result.unwrap_err().to_string();
        assert!(err.contains("20 salita"), "got: {err}");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_rubric_is_rejected_without_calls() {
        let llm = ScriptedModel::new(vec![]);
        let rubric = Rubric::default();

        let result = grade_essay(&llm, &essay_of(25), "context", &rubric, 20).await;

        assert!(result.is_err());
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_single_criterion_end_to_end() {
        let llm = ScriptedModel::new(vec![Some("Grade: 7/10 Justification: Adequate.")]);
        let rubric = rubric_with(vec![criterion("Content", 10.0)]);

        let report = grade_essay(&llm, &essay_of(25), "Essay on rice farming", &rubric, 20)
            .await
            .unwrap();

        assert_eq!(report.total_points_received, 7.0);
        assert_eq!(report.total_points_possible, 10.0);
        assert_eq!(report.letter_grade, "F"); // 70%
        assert!(report.report_text.contains("Final Grade: 7/10"));
        assert!(report
            .report_text
            .contains("Criterion: Content - Grade: 7/10 - Justification: Adequate."));
        assert_eq!(report.criteria.len(), 1);
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reply_degrades_that_criterion_only() {
        let llm = ScriptedModel::new(vec![
            Some("I cannot grade this."),
            Some("Grade: 5/5 Justification: Mahusay."),
        ]);
        let rubric = rubric_with(vec![criterion("Content", 10.0), criterion("Grammar", 5.0)]);

        let report = grade_essay(&llm, &essay_of(25), "context", &rubric, 20)
            .await
            .unwrap();

        assert_eq!(report.total_points_received, 5.0);
        assert_eq!(report.total_points_possible, 15.0);
        assert_eq!(report.criteria[0].points_received, 0.0);
        assert_eq!(report.criteria[0].justification, NO_JUSTIFICATION);
        assert_eq!(report.criteria[1].points_received, 5.0);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_llm_failure_degrades_that_criterion_only() {
        let llm = ScriptedModel::new(vec![
            None,
            Some("Grade: 8/10 Justification: Maayos ang daloy."),
        ]);
        let rubric = rubric_with(vec![criterion("Ideas", 10.0), criterion("Flow", 10.0)]);

        let report = grade_essay(&llm, &essay_of(25), "context", &rubric, 20)
            .await
            .unwrap();

        assert_eq!(report.criteria[0].points_received, 0.0);
        assert_eq!(report.criteria[1].points_received, 8.0);
        assert_eq!(report.total_points_received, 8.0);
    }

    #[tokio::test]
    async fn test_over_cap_score_is_clamped() {
        let llm = ScriptedModel::new(vec![Some("Grade: 12/10 Justification: Generous.")]);
        let rubric = rubric_with(vec![criterion("Content", 10.0)]);

        let report = grade_essay(&llm, &essay_of(25), "context", &rubric, 20)
            .await
            .unwrap();

        assert_eq!(report.criteria[0].points_received, 10.0);
        assert_eq!(report.total_points_received, 10.0);
        assert_eq!(report.letter_grade, "A+");
    }

    #[tokio::test]
    async fn test_perfect_score_report() {
        let llm = ScriptedModel::new(vec![
            Some("Grade: 10/10 Justification: Kumpleto."),
            Some("Grade: 10/10 Justification: Malinis."),
        ]);
        let rubric = rubric_with(vec![criterion("Content", 10.0), criterion("Grammar", 10.0)]);

        let report = grade_essay(&llm, &essay_of(30), "context", &rubric, 20)
            .await
            .unwrap();

        assert_eq!(report.percentage, 100.0);
        assert_eq!(report.letter_grade, "A+");
        assert!(report.report_text.starts_with("Final Grade: 20/20 (A+)"));
    }

    #[test]
    fn test_letter_grade_thresholds() {
        assert_eq!(letter_grade(100.0), "A+");
        assert_eq!(letter_grade(98.0), "A+");
        assert_eq!(letter_grade(97.9), "A");
        assert_eq!(letter_grade(95.0), "A");
        assert_eq!(letter_grade(93.0), "A-");
        assert_eq!(letter_grade(90.0), "B+");
        assert_eq!(letter_grade(85.0), "B");
        assert_eq!(letter_grade(83.0), "B-");
        assert_eq!(letter_grade(80.0), "C+");
        assert_eq!(letter_grade(78.0), "C");
        assert_eq!(letter_grade(75.0), "D");
        assert_eq!(letter_grade(74.9), "F");
        assert_eq!(letter_grade(0.0), "F");
    }

    #[test]
    fn test_letter_grade_is_monotonic() {
        // Rank letters from worst to best; a higher percentage must never
        // map to a lower rank.
        fn rank(letter: &str) -> usize {
            ["F", "D", "C", "C+", "B-", "B", "B+", "A-", "A", "A+"]
                .iter()
                .position(|&l| l == letter)
                .unwrap()
        }

        let mut previous = rank(letter_grade(0.0));
        for tenths in 0..=1000 {
            let current = rank(letter_grade(tenths as f64 / 10.0));
            assert!(current >= previous, "non-monotonic at {}", tenths as f64 / 10.0);
            previous = current;
        }
    }

    #[test]
    fn test_prompt_contains_criterion_and_truncated_essay() {
        let c = Criterion {
            name: "Nilalaman".to_string(),
            weight: 0.5,
            points_possible: 10.0,
            detailed_breakdown: "Kaugnayan sa paksa".to_string(),
        };
        let prompt = build_grading_prompt("essay body", "teacher context", &c);
        assert!(prompt.contains("'Nilalaman'"));
        assert!(prompt.contains("out of 10 points"));
        assert!(prompt.contains("Context from teacher: teacher context"));
        assert!(prompt.contains("Detailed criterion breakdown: Kaugnayan sa paksa"));
        assert!(prompt.contains("Essay to grade: essay body"));
        assert!(prompt.contains("Grade: [numeric value]/10"));
    }

    #[test]
    fn test_prompt_omits_empty_breakdown() {
        let c = criterion("Content", 10.0);
        let prompt = build_grading_prompt("essay", "context", &c);
        assert!(!prompt.contains("Detailed criterion breakdown"));
    }
}
