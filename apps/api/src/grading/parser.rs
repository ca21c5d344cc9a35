//! Grade-reply parsing.
//!
//! The model is instructed to answer `Grade: X/Y` followed by
//! `Justification: ...`, but free-text replies drift. One strict anchored
//! grammar is tried first; a single fallback of independent searches
//! follows; if both miss, the parse degrades to sentinels. This function
//! never fails.

use std::sync::LazyLock;

use regex::Regex;

pub const NO_JUSTIFICATION: &str = "No justification provided.";

/// Numeric score and justification pulled out of one model reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedGrade {
    pub points_received: f64,
    /// The denominator the model echoed back. 0.0 when absent.
    pub points_possible: f64,
    pub justification: String,
}

// Strict grammar: the whole reply is "Grade: X/Y Justification: ..." with
// flexible spacing, justification running to end of text.
static STRICT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?s)^Grade:\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*([0-9]+(?:\.[0-9]+)?)\s*Justification:\s*(.*)$",
    )
    .expect("strict grade grammar")
});

// Fallback: locate the grade pair and the justification independently,
// anywhere in the reply.
static GRADE_FALLBACK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Grade:\s*([0-9]+(?:\.[0-9]+)?)\s*/\s*([0-9]+(?:\.[0-9]+)?)")
        .expect("grade fallback pattern")
});

static JUSTIFICATION_FALLBACK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Justification:\s*(.*)").expect("justification pattern"));

/// Models wrap the format line in emphasis markers; strip them before
/// matching.
fn strip_markdown(raw: &str) -> String {
    raw.replace(['*', '_'], "").trim().to_string()
}

fn normalize_justification(raw: &str) -> String {
    let justification = raw.trim();
    if justification.is_empty() {
        NO_JUSTIFICATION.to_string()
    } else {
        justification.to_string()
    }
}

pub fn parse_grade_reply(raw: &str) -> ParsedGrade {
    let cleaned = strip_markdown(raw);

    if let Some(caps) = STRICT.captures(&cleaned) {
        let received = caps[1].parse::<f64>();
        let possible = caps[2].parse::<f64>();
        if let (Ok(points_received), Ok(points_possible)) = (received, possible) {
            return ParsedGrade {
                points_received,
                points_possible,
                justification: normalize_justification(&caps[3]),
            };
        }
    }

    let (points_received, points_possible) = GRADE_FALLBACK
        .captures(&cleaned)
        .and_then(|caps| Some((caps[1].parse::<f64>().ok()?, caps[2].parse::<f64>().ok()?)))
        .unwrap_or((0.0, 0.0));

    let justification = JUSTIFICATION_FALLBACK
        .captures(&cleaned)
        .map(|caps| normalize_justification(&caps[1]))
        .unwrap_or_else(|| NO_JUSTIFICATION.to_string());

    ParsedGrade {
        points_received,
        points_possible,
        justification,
    }
}
