//! Request/response models for the HTTP surface. Field names follow the
//! wire contract the frontend already speaks.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use mockdrill_core::error::SessionId;
use mockdrill_core::feedback::FeedbackReport;
use mockdrill_core::proctor::{CheatingEvent, DetailedCheatingSummary, Severity};
use mockdrill_core::roles::{Persona, Role};
use mockdrill_core::session::SessionSnapshot;

fn default_user_name() -> String {
    "Candidate".to_string()
}

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub role: String,
    pub persona: String,
    #[serde(default = "default_user_name")]
    pub user_name: String,
}

#[derive(Debug, Serialize)]
pub struct StartInterviewResponse {
    pub interview_id: SessionId,
    pub greeting_message: String,
    pub first_question: String,
    pub role: Role,
    pub persona: Persona,
}

#[derive(Debug, Deserialize)]
pub struct NextQuestionRequest {
    pub interview_id: SessionId,
    pub user_answer: String,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionResponse {
    pub interview_id: SessionId,
    pub agent_response: String,
    pub next_question: Option<String>,
    pub is_followup: bool,
    pub interview_ended: bool,
}

#[derive(Debug, Deserialize)]
pub struct EndInterviewRequest {
    pub interview_id: SessionId,
}

#[derive(Debug, Serialize)]
pub struct EndInterviewResponse {
    pub interview_id: SessionId,
    pub feedback: FeedbackReport,
    pub cheating_summary: DetailedCheatingSummary,
}

#[derive(Debug, Deserialize)]
pub struct CheatingLogRequest {
    pub interview_id: SessionId,
    /// Base64-encoded frame image.
    pub frame_data: String,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct CheatingLogResponse {
    pub interview_id: SessionId,
    pub event_logged: bool,
    pub detection_result: CheatingEvent,
    pub severity: Severity,
}

#[derive(Debug, Serialize)]
pub struct CheatingTimelineResponse {
    pub interview_id: SessionId,
    pub total_events: usize,
    pub summary: DetailedCheatingSummary,
}

#[derive(Debug, Serialize)]
pub struct SessionsResponse {
    pub active_sessions: usize,
    pub sessions: Vec<SessionSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_request_defaults_the_user_name() {
        let req: StartInterviewRequest =
            serde_json::from_str(r#"{"role": "SDE", "persona": "Efficient"}"#).unwrap();
        assert_eq!(req.user_name, "Candidate");
    }

    #[test]
    fn cheating_log_request_parses_an_rfc3339_timestamp() {
        let req: CheatingLogRequest = serde_json::from_str(
            r#"{
                "interview_id": "4b4a3a86-8a52-4e54-9a86-6e9a14b08c9e",
                "frame_data": "aGVsbG8=",
                "timestamp": "2026-02-01T08:00:00Z"
            }"#,
        )
        .unwrap();
        assert!(req.timestamp.is_some());
    }

    #[test]
    fn next_response_serializes_optional_question_as_null() {
        let resp = NextQuestionResponse {
            interview_id: SessionId::new(),
            agent_response: "Thanks.".to_string(),
            next_question: None,
            is_followup: false,
            interview_ended: true,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert!(json["next_question"].is_null());
        assert_eq!(json["interview_ended"], true);
    }
}
