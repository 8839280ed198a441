use axum::{extract::Path, extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::errors::AppError;
use crate::interview::agents::{AgentConfig, AgentReadiness, AgentType};
use crate::interview::models::InterviewProgress;
use crate::interview::progress::MAX_ROUND;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentRoundResponse {
    pub current_round: u32,
}

#[derive(Debug, Serialize)]
pub struct RoundAccessResponse {
    pub round: u32,
    pub accessible: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatusResponse {
    pub agent_type: String,
    pub configured: bool,
    pub readiness: AgentReadiness,
}

#[derive(Debug, Serialize)]
pub struct AgentUrlResponse {
    pub url: String,
}

fn validate_round(round: u32) -> Result<u32, AppError> {
    if round == 0 {
        return Err(AppError::Validation(
            "Round numbers start at 1".to_string(),
        ));
    }
    if round > MAX_ROUND {
        return Err(AppError::Validation(format!(
            "Round numbers may not exceed {MAX_ROUND}"
        )));
    }
    Ok(round)
}

/// GET /api/v1/interview/progress
pub async fn handle_get_progress(State(state): State<AppState>) -> Json<InterviewProgress> {
    Json(state.tracker.get_progress())
}

/// PUT /api/v1/interview/progress
pub async fn handle_save_progress(
    State(state): State<AppState>,
    Json(progress): Json<InterviewProgress>,
) -> Result<StatusCode, AppError> {
    if progress.current_round == 0 {
        return Err(AppError::Validation(
            "currentRound must be at least 1".to_string(),
        ));
    }
    for &round in &progress.completed_rounds {
        validate_round(round)?;
    }
    state.tracker.save_progress(&progress);
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /api/v1/interview/progress
pub async fn handle_reset_progress(State(state): State<AppState>) -> StatusCode {
    state.tracker.reset_progress();
    StatusCode::NO_CONTENT
}

/// GET /api/v1/interview/current-round
pub async fn handle_current_round(State(state): State<AppState>) -> Json<CurrentRoundResponse> {
    Json(CurrentRoundResponse {
        current_round: state.tracker.current_round(),
    })
}

/// POST /api/v1/interview/rounds/:round/complete
pub async fn handle_complete_round(
    State(state): State<AppState>,
    Path(round): Path<u32>,
) -> Result<Json<InterviewProgress>, AppError> {
    let round = validate_round(round)?;
    Ok(Json(state.tracker.mark_round_complete(round)))
}

/// GET /api/v1/interview/rounds/:round/access
pub async fn handle_round_access(
    State(state): State<AppState>,
    Path(round): Path<u32>,
) -> Result<Json<RoundAccessResponse>, AppError> {
    let round = validate_round(round)?;
    Ok(Json(RoundAccessResponse {
        round,
        accessible: state.tracker.is_round_accessible(round),
    }))
}

/// GET /api/v1/agents/:agent_type
pub async fn handle_get_agent(
    State(state): State<AppState>,
    Path(agent_type): Path<String>,
) -> Result<Json<AgentConfig>, AppError> {
    Ok(Json(state.agents.agent_config_for(&agent_type)?))
}

/// GET /api/v1/agents/:agent_type/status
pub async fn handle_agent_status(
    State(state): State<AppState>,
    Path(agent_type): Path<String>,
) -> Json<AgentStatusResponse> {
    let readiness = state.agents.readiness(&agent_type);
    Json(AgentStatusResponse {
        configured: readiness.is_configured(),
        agent_type,
        readiness,
    })
}

/// GET /api/v1/agents/:agent_type/url
pub async fn handle_agent_url(
    State(state): State<AppState>,
    Path(agent_type): Path<String>,
) -> Result<Json<AgentUrlResponse>, AppError> {
    let agent_type: AgentType = agent_type.parse()?;
    Ok(Json(AgentUrlResponse {
        url: state.agents.livekit_url(agent_type),
    }))
}
