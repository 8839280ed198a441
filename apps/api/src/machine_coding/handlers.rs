use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{error, info};

use crate::machine_coding::analytics::compute_user_analytics;
use crate::machine_coding::atlas::{AtlasError, QUESTIONS, SESSIONS, SUBMISSIONS};
use crate::machine_coding::models::{
    question_documents, EndSessionRequest, InitSessionRequest, SaveQuestionsRequest,
    SaveSubmissionRequest, SessionDocument, SubmissionDocument, UpdateSessionRequest,
};
use crate::state::AppState;

/// Failures on the machine-coding routes, all rendered as
/// `{success: false, error}`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error(transparent)]
    Atlas(#[from] AtlasError),

    #[error("Invalid request body: {0}")]
    Body(#[from] JsonRejection),

    #[error("Failed to encode document: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::Body(rejection) => rejection.status(),
            ProxyError::Atlas(_) | ProxyError::Encode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        error!("Machine-coding proxy error: {self}");
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}

/// Request body extractor whose rejections use the proxy's error envelope.
type JsonBody<T> = Result<Json<T>, JsonRejection>;

fn to_document<T: Serialize>(value: &T) -> Result<Value, ProxyError> {
    Ok(serde_json::to_value(value)?)
}

/// POST /api/machine-coding/init-session
pub async fn handle_init_session(
    State(state): State<AppState>,
    body: JsonBody<InitSessionRequest>,
) -> Result<Json<Value>, ProxyError> {
    let Json(req) = body?;
    let document = SessionDocument::new(req, Utc::now());
    let inserted_id = state
        .documents
        .insert_one(SESSIONS, to_document(&document)?)
        .await?;
    info!("Started machine-coding session {}", document.session_id);
    Ok(Json(json!({ "success": true, "insertedId": inserted_id })))
}

/// POST /api/machine-coding/save-questions
pub async fn handle_save_questions(
    State(state): State<AppState>,
    body: JsonBody<SaveQuestionsRequest>,
) -> Result<Json<Value>, ProxyError> {
    let Json(req) = body?;
    let documents = question_documents(req, Utc::now())
        .iter()
        .map(to_document)
        .collect::<Result<Vec<_>, _>>()?;
    let count = documents.len();
    state.documents.insert_many(QUESTIONS, documents).await?;
    Ok(Json(json!({ "success": true, "count": count })))
}

/// POST /api/machine-coding/save-submission
pub async fn handle_save_submission(
    State(state): State<AppState>,
    body: JsonBody<SaveSubmissionRequest>,
) -> Result<Json<Value>, ProxyError> {
    let Json(req) = body?;
    let document = SubmissionDocument::new(req, Utc::now());
    let inserted_id = state
        .documents
        .insert_one(SUBMISSIONS, to_document(&document)?)
        .await?;
    Ok(Json(json!({ "success": true, "insertedId": inserted_id })))
}

/// POST /api/machine-coding/update-session
pub async fn handle_update_session(
    State(state): State<AppState>,
    body: JsonBody<UpdateSessionRequest>,
) -> Result<Json<Value>, ProxyError> {
    let Json(req) = body?;
    let mut set = Map::new();
    if let Some(count) = req.submission_count {
        set.insert("submissionCount".to_string(), json!(count));
    }
    if let Some(score) = req.total_score {
        set.insert("totalScore".to_string(), json!(score));
    }
    set.insert("updatedAt".to_string(), json!(Utc::now()));

    state
        .documents
        .update_one(
            SESSIONS,
            json!({ "sessionId": req.session_id }),
            json!({ "$set": set }),
        )
        .await?;
    Ok(Json(json!({ "success": true })))
}

/// POST /api/machine-coding/end-session
pub async fn handle_end_session(
    State(state): State<AppState>,
    body: JsonBody<EndSessionRequest>,
) -> Result<Json<Value>, ProxyError> {
    let Json(req) = body?;
    let now = Utc::now();
    state
        .documents
        .update_one(
            SESSIONS,
            json!({ "sessionId": req.session_id }),
            json!({
                "$set": {
                    "endedAt": now,
                    "totalScore": req.total_score.unwrap_or(0.0),
                    "status": "completed",
                    "updatedAt": now,
                }
            }),
        )
        .await?;
    info!("Ended machine-coding session {}", req.session_id);
    Ok(Json(json!({ "success": true })))
}

/// GET /api/machine-coding/history/:user_id
pub async fn handle_history(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let sessions = state
        .documents
        .find(
            SESSIONS,
            json!({ "userId": user_id }),
            Some(json!({ "startedAt": -1 })),
        )
        .await?;
    Ok(Json(json!({ "success": true, "sessions": sessions })))
}

/// GET /api/machine-coding/submissions/:session_id
pub async fn handle_submissions(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let submissions = state
        .documents
        .find(
            SUBMISSIONS,
            json!({ "sessionId": session_id }),
            Some(json!({ "submittedAt": 1 })),
        )
        .await?;
    Ok(Json(json!({ "success": true, "submissions": submissions })))
}

/// GET /api/machine-coding/analytics/:user_id
pub async fn handle_analytics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ProxyError> {
    let submissions = state
        .documents
        .find(SUBMISSIONS, json!({ "userId": user_id }), None)
        .await?;
    let analytics = compute_user_analytics(&submissions);
    Ok(Json(json!({ "success": true, "analytics": analytics })))
}
