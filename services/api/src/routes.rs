//! Route handlers: a thin DTO-mapping shell over the session registry.
//! No domain logic lives here.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use uuid::Uuid;

use mockdrill_core::error::InterviewError;
use mockdrill_core::registry::SessionRegistry;

use crate::dto::{
    CheatingLogRequest, CheatingLogResponse, CheatingTimelineResponse, EndInterviewRequest,
    EndInterviewResponse, NextQuestionRequest, NextQuestionResponse, SessionsResponse,
    StartInterviewRequest, StartInterviewResponse,
};

pub type AppState = Arc<SessionRegistry>;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/interview/start", post(start_interview))
        .route("/interview/next", post(next_question))
        .route("/interview/end", post(end_interview))
        .route("/interview/sessions", get(list_sessions))
        .route("/cheating/log", post(log_cheating_event))
        .route("/cheating/timeline/{interview_id}", get(get_timeline))
        .with_state(state)
}

/// Error shape matching what the frontend expects from the API.
pub struct ApiError(InterviewError);

impl From<InterviewError> for ApiError {
    fn from(error: InterviewError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            InterviewError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            InterviewError::NotFound(_) => StatusCode::NOT_FOUND,
            InterviewError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            InterviewError::UpstreamMalformed(_) => StatusCode::BAD_GATEWAY,
        };
        let body = Json(serde_json::json!({ "detail": self.0.to_string() }));
        (status, body).into_response()
    }
}

async fn start_interview(
    State(registry): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<Json<StartInterviewResponse>, ApiError> {
    let started = registry
        .start(&request.role, &request.persona, &request.user_name)
        .await?;

    Ok(Json(StartInterviewResponse {
        interview_id: started.id,
        greeting_message: started.greeting,
        first_question: started.first_question,
        role: started.role,
        persona: started.persona,
    }))
}

async fn next_question(
    State(registry): State<AppState>,
    Json(request): Json<NextQuestionRequest>,
) -> Result<Json<NextQuestionResponse>, ApiError> {
    let advance = registry
        .submit_answer(request.interview_id, &request.user_answer)
        .await?;

    Ok(Json(NextQuestionResponse {
        interview_id: request.interview_id,
        agent_response: advance.acknowledgment,
        next_question: advance.next_question,
        is_followup: advance.is_followup,
        interview_ended: advance.ended,
    }))
}

async fn end_interview(
    State(registry): State<AppState>,
    Json(request): Json<EndInterviewRequest>,
) -> Result<Json<EndInterviewResponse>, ApiError> {
    let report = registry.end(request.interview_id).await?;
    let cheating_summary = report.feedback.cheating_summary.clone();

    Ok(Json(EndInterviewResponse {
        interview_id: report.id,
        feedback: report.feedback,
        cheating_summary,
    }))
}

async fn list_sessions(State(registry): State<AppState>) -> Json<SessionsResponse> {
    let sessions = registry.active_sessions().await;
    Json(SessionsResponse {
        active_sessions: sessions.len(),
        sessions,
    })
}

async fn log_cheating_event(
    State(registry): State<AppState>,
    Json(request): Json<CheatingLogRequest>,
) -> Result<Json<CheatingLogResponse>, ApiError> {
    let image = BASE64.decode(&request.frame_data).map_err(|_| {
        InterviewError::InvalidArgument("frame_data is not valid base64".to_string())
    })?;

    let log = registry
        .submit_frame(request.interview_id, &image, request.timestamp)
        .await?;

    Ok(Json(CheatingLogResponse {
        interview_id: request.interview_id,
        event_logged: log.alerted,
        severity: log.event.severity,
        detection_result: log.event,
    }))
}

async fn get_timeline(
    State(registry): State<AppState>,
    Path(interview_id): Path<Uuid>,
) -> Result<Json<CheatingTimelineResponse>, ApiError> {
    let id = interview_id.into();
    let summary = registry.timeline(id)?;

    Ok(Json(CheatingTimelineResponse {
        interview_id: id,
        total_events: summary.total_events,
        summary,
    }))
}
