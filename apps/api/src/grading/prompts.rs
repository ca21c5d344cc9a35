// All LLM prompt constants for the Grading module.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Per-criterion grading prompt. Replace `{criterion_name}`,
/// `{points_possible}`, `{context}`, `{breakdown_section}`,
/// `{filipino_instruction}`, and `{essay}` before sending.
pub const GRADING_PROMPT_TEMPLATE: &str = r#"Grade the following student work based on the criterion '{criterion_name}' out of {points_possible} points.

Context from teacher: {context}

{breakdown_section}When grading, consider:
1. How well the student addresses the specific requirements of '{criterion_name}'
2. Both the strengths and areas for improvement in the student's work
3. The depth of understanding demonstrated, not just surface-level content
4. The appropriate use of concepts and terminology related to the topic

{filipino_instruction}

Essay to grade: {essay}

Your response should follow this format:
Grade: [numeric value]/{points_possible}
Justification: [3-sentence detailed justification including examples]"#;

/// Summarization prompt. Replace `{essay}` before sending.
pub const SUMMARY_PROMPT_TEMPLATE: &str = "Summarize this text in Filipino:\n\n{essay}";
