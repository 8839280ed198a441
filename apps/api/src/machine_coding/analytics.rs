//! Per-user machine-coding analytics, computed from stored submission
//! documents. Documents come back from Atlas untyped, so every field is read
//! leniently: a missing or non-numeric score counts as 0.

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

/// Submissions scoring at least this much count as solved.
pub const CORRECT_SCORE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionSummary {
    pub question_id: Value,
    pub question_title: Value,
    pub score: Value,
    pub language: Value,
    pub submitted_at: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAnalytics {
    pub total_submissions: usize,
    pub average_score: i64,
    pub questions_attempted: usize,
    pub questions_correct: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submissions: Option<Vec<SubmissionSummary>>,
}

fn score_of(doc: &Value) -> f64 {
    doc.get("score").and_then(Value::as_f64).unwrap_or(0.0)
}

fn field(doc: &Value, key: &str) -> Value {
    doc.get(key).cloned().unwrap_or(Value::Null)
}

pub fn compute_user_analytics(submissions: &[Value]) -> UserAnalytics {
    if submissions.is_empty() {
        return UserAnalytics {
            total_submissions: 0,
            average_score: 0,
            questions_attempted: 0,
            questions_correct: 0,
            submissions: None,
        };
    }

    let total_submissions = submissions.len();
    let score_sum: f64 = submissions.iter().map(score_of).sum();
    let average_score = (score_sum / total_submissions as f64).round() as i64;

    // Question ids may be strings or numbers; compare on their JSON text.
    let questions_attempted = submissions
        .iter()
        .map(|doc| field(doc, "questionId").to_string())
        .collect::<HashSet<_>>()
        .len();

    let questions_correct = submissions
        .iter()
        .filter(|doc| score_of(doc) >= CORRECT_SCORE_THRESHOLD)
        .count();

    let summaries = submissions
        .iter()
        .map(|doc| SubmissionSummary {
            question_id: field(doc, "questionId"),
            question_title: field(doc, "questionTitle"),
            score: field(doc, "score"),
            language: field(doc, "language"),
            submitted_at: field(doc, "submittedAt"),
        })
        .collect();

    UserAnalytics {
        total_submissions,
        average_score,
        questions_attempted,
        questions_correct,
        submissions: Some(summaries),
    }
}
