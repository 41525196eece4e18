//! Core engine for mock-interview sessions: the orchestration state
//! machine, conversation memory, question sequencing, and cheating-event
//! aggregation, behind a registry that owns every live session.
//!
//! External collaborators — the language-model decision oracle and the
//! computer-vision frame analyzer — sit behind the [`oracle::DecisionOracle`]
//! and [`analyzer::FrameAnalyzer`] traits. Both are fallible; the engine
//! recovers from their failures with deterministic fallbacks so that a
//! session always reaches a terminal state.

pub mod analyzer;
pub mod error;
pub mod feedback;
pub mod memory;
pub mod oracle;
pub mod proctor;
pub mod questionnaire;
pub mod registry;
pub mod roles;
pub mod session;

pub use analyzer::{FrameAnalyzer, FrameClassification};
pub use error::{InterviewError, Result, SessionId};
pub use feedback::FeedbackReport;
pub use memory::{ConversationMemory, ConversationTurn, Speaker};
pub use oracle::{Decision, DecisionOracle, EvaluationRequest, FeedbackDraft, FeedbackRequest};
pub use proctor::{
    CheatingEvent, CheatingMonitor, CheatingSummary, DetailedCheatingSummary, EventCategory,
    Severity,
};
pub use questionnaire::QuestionSequencer;
pub use registry::{FrameLog, RegistryConfig, SessionRegistry, SessionReport, StartedSession};
pub use roles::{Persona, Role};
pub use session::{InterviewSession, SessionConfig, SessionSnapshot, SessionState, TurnAdvance};
