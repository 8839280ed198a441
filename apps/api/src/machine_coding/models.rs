use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A timestamp as sent by the browser: either an ISO-8601 string or
/// milliseconds since the Unix epoch.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ClientTimestamp {
    Iso(DateTime<Utc>),
    Millis(i64),
}

impl ClientTimestamp {
    /// Falls back to `now` for millisecond values chrono cannot represent.
    pub fn resolve(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            ClientTimestamp::Iso(ts) => *ts,
            ClientTimestamp::Millis(ms) => Utc.timestamp_millis_opt(*ms).single().unwrap_or(now),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitSessionRequest {
    pub session_id: String,
    pub user_id: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub level: Option<String>,
    pub total_questions: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedQuestion {
    pub id: Value,
    pub title: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub examples: Value,
    #[serde(default)]
    pub constraints: Value,
    #[serde(default)]
    pub test_cases: Value,
    #[serde(default)]
    pub hidden_test_cases: Value,
    #[serde(default)]
    pub templates: Value,
    #[serde(default)]
    pub time_complexity: Option<String>,
    #[serde(default)]
    pub space_complexity: Option<String>,
    #[serde(default)]
    pub hints: Value,
    #[serde(default)]
    pub approaches: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveQuestionsRequest {
    pub session_id: String,
    pub user_id: String,
    pub questions: Vec<GeneratedQuestion>,
    pub role: Option<String>,
    pub company: Option<String>,
    pub level: Option<String>,
    pub generated_at: ClientTimestamp,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub output: Value,
    #[serde(default)]
    pub error: Value,
    #[serde(default)]
    pub analysis: Value,
    #[serde(default)]
    pub test_case_results: Value,
}

impl AnalysisResult {
    /// `analysis.overallScore`, or 0 when the analyser did not report one.
    pub fn overall_score(&self) -> f64 {
        self.analysis
            .get("overallScore")
            .and_then(Value::as_f64)
            .unwrap_or(0.0)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSubmissionRequest {
    pub session_id: String,
    pub user_id: String,
    pub question_id: Value,
    pub question_title: Option<String>,
    pub language: String,
    pub code: String,
    #[serde(default)]
    pub analysis_result: AnalysisResult,
    pub submitted_at: ClientTimestamp,
    pub tests_passed: Option<u32>,
    pub tests_total: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSessionRequest {
    pub session_id: String,
    pub submission_count: Option<u32>,
    pub total_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndSessionRequest {
    pub session_id: String,
    pub total_score: Option<f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Stored documents
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    pub session_id: String,
    pub user_id: String,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_questions: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub questions_generated: u32,
    pub questions_attempted: u32,
    pub submission_count: u32,
    pub total_score: f64,
}

impl SessionDocument {
    pub fn new(req: InitSessionRequest, now: DateTime<Utc>) -> Self {
        Self {
            session_id: req.session_id,
            user_id: req.user_id,
            started_at: now,
            role: req.role,
            company: req.company,
            level: req.level,
            total_questions: req.total_questions,
            created_at: now,
            questions_generated: 0,
            questions_attempted: 0,
            submission_count: 0,
            total_score: 0.0,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDocument {
    pub question_id: Value,
    pub title: String,
    pub difficulty: Option<String>,
    pub tags: Vec<String>,
    pub description: Option<String>,
    pub examples: Value,
    pub constraints: Value,
    pub test_cases: Value,
    pub hidden_test_cases: Value,
    pub templates: Value,
    pub time_complexity: Option<String>,
    pub space_complexity: Option<String>,
    pub hints: Value,
    pub approaches: Value,
    pub session_id: String,
    pub user_id: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub level: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Expands a batch of generated questions into one document per question,
/// each stamped with the session metadata.
pub fn question_documents(req: SaveQuestionsRequest, now: DateTime<Utc>) -> Vec<QuestionDocument> {
    let generated_at = req.generated_at.resolve(now);
    req.questions
        .into_iter()
        .map(|q| QuestionDocument {
            question_id: q.id,
            title: q.title,
            difficulty: q.difficulty,
            tags: q.tags,
            description: q.description,
            examples: q.examples,
            constraints: q.constraints,
            test_cases: q.test_cases,
            hidden_test_cases: q.hidden_test_cases,
            templates: q.templates,
            time_complexity: q.time_complexity,
            space_complexity: q.space_complexity,
            hints: q.hints,
            approaches: q.approaches,
            session_id: req.session_id.clone(),
            user_id: req.user_id.clone(),
            role: req.role.clone(),
            company: req.company.clone(),
            level: req.level.clone(),
            generated_at,
            created_at: now,
        })
        .collect()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDocument {
    pub session_id: String,
    pub user_id: String,
    pub question_id: Value,
    pub question_title: Option<String>,
    pub language: String,
    pub code: String,
    pub analysis_result: AnalysisResult,
    pub tests_passed: u32,
    pub tests_total: u32,
    pub score: f64,
    pub submitted_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SubmissionDocument {
    pub fn new(req: SaveSubmissionRequest, now: DateTime<Utc>) -> Self {
        Self {
            score: req.analysis_result.overall_score(),
            submitted_at: req.submitted_at.resolve(now),
            session_id: req.session_id,
            user_id: req.user_id,
            question_id: req.question_id,
            question_title: req.question_title,
            language: req.language,
            code: req.code,
            analysis_result: req.analysis_result,
            tests_passed: req.tests_passed.unwrap_or(0),
            tests_total: req.tests_total.unwrap_or(0),
            created_at: now,
        }
    }
}
