//! The decision oracle seam: the external language model that produces
//! greetings, per-turn decisions, and the final feedback draft.
//!
//! The trait mirrors how the rest of the core wants to think about the
//! oracle: an opaque async function returning structured results. Every
//! result type here has a total fallback constructor, so the state machine
//! never sees a partially-formed decision no matter how the upstream call
//! fails.

use anyhow::Result;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::memory::ConversationTurn;
use crate::proctor::{CheatingSummary, DetailedCheatingSummary};
use crate::roles::{Persona, Role};

/// Everything the oracle needs to evaluate one answer.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationRequest {
    pub answer: String,
    pub current_prompt: String,
    pub history: Vec<ConversationTurn>,
    pub cheating: CheatingSummary,
    pub role: Role,
    pub persona: Persona,
}

/// The oracle's structured verdict on one answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub acknowledgment: String,
    pub wants_followup: bool,
    pub followup_question: Option<String>,
    pub complete: bool,
}

impl Decision {
    /// Safe default applied whenever the oracle fails, times out, or
    /// returns content that does not validate. Keeps the interview moving
    /// toward its next base question.
    pub fn fallback() -> Self {
        Self {
            acknowledgment: "Thank you for your answer.".to_string(),
            wants_followup: false,
            followup_question: None,
            complete: false,
        }
    }
}

/// Input for the closing report.
#[derive(Debug, Clone, Serialize)]
pub struct FeedbackRequest {
    pub history: Vec<ConversationTurn>,
    pub role: Role,
    pub persona: Persona,
    pub cheating: DetailedCheatingSummary,
}

/// The oracle's unclamped feedback draft. Scores are validated and
/// clamped by the feedback compiler before they reach a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackDraft {
    pub technical_score: i64,
    pub communication_score: i64,
    pub confidence_score: i64,
    pub overall_summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Generic greeting used when the oracle cannot produce one. The session
/// must open with a non-empty prompt regardless of upstream health.
pub fn fallback_greeting(role: Role, candidate_name: &str) -> String {
    format!(
        "Welcome, {candidate_name}! I'll be conducting your mock {role} interview today. \
         We'll go through a handful of questions; this session is monitored for interview \
         integrity, so please keep your camera on. Answer honestly and in as much detail \
         as you can."
    )
}

/// Contract for the external language-model collaborator.
///
/// All three calls may fail or return malformed content. Callers inside
/// the core recover locally (generic greeting, [`Decision::fallback`],
/// the deterministic feedback compiler) rather than propagating the
/// failure, so an upstream outage can degrade a session but never stall
/// or kill it.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait DecisionOracle: Send + Sync {
    async fn greet(&self, role: Role, persona: Persona, candidate_name: &str) -> Result<String>;

    async fn evaluate(&self, request: EvaluationRequest) -> Result<Decision>;

    async fn final_feedback(&self, request: FeedbackRequest) -> Result<FeedbackDraft>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_decision_moves_the_interview_forward() {
        let decision = Decision::fallback();
        assert!(!decision.wants_followup);
        assert!(!decision.complete);
        assert_eq!(decision.acknowledgment, "Thank you for your answer.");
        assert!(decision.followup_question.is_none());
    }

    #[test]
    fn fallback_greeting_mentions_role_and_name() {
        let greeting = fallback_greeting(Role::Sde, "Ada");
        assert!(greeting.contains("Ada"));
        assert!(greeting.contains("SDE"));
        assert!(!greeting.is_empty());
    }

    #[test]
    fn decision_round_trips_through_json() {
        let decision = Decision {
            acknowledgment: "Good answer.".to_string(),
            wants_followup: true,
            followup_question: Some("Can you give an example?".to_string()),
            complete: false,
        };
        let json = serde_json::to_string(&decision).unwrap();
        let parsed: Decision = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, decision);
    }
}
