//! The interview state machine for one session.
//!
//! A turn is split into two halves around the oracle call: `record_answer`
//! appends the answer and snapshots everything the oracle needs, then
//! `apply_decision` folds the (possibly fallback) decision back in. The
//! caller awaits the oracle in between with no session lock held.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{InterviewError, Result, SessionId};
use crate::memory::{ConversationMemory, Speaker};
use crate::oracle::{Decision, EvaluationRequest};
use crate::proctor::CheatingSummary;
use crate::questionnaire::QuestionSequencer;
use crate::roles::{Persona, Role};

/// Hard cap on base questions per session.
pub const DEFAULT_MAX_QUESTIONS: u32 = 7;

/// Prompt substituted when the oracle wants a follow-up but supplied no
/// question text.
pub const CLARIFYING_PROMPT: &str = "Could you elaborate on that?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    /// Freshly created; collapses into `AwaitingAnswer` once the greeting
    /// and first question are seeded.
    Greeting,
    AwaitingAnswer,
    /// An answer has been recorded and its oracle call is outstanding.
    Evaluating,
    Completed,
}

#[derive(Debug, Clone, Copy)]
pub struct SessionConfig {
    pub max_questions: u32,
    pub memory_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_questions: DEFAULT_MAX_QUESTIONS,
            memory_limit: crate::memory::DEFAULT_MEMORY_LIMIT,
        }
    }
}

/// What one completed turn hands back to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TurnAdvance {
    pub acknowledgment: String,
    pub next_question: Option<String>,
    pub is_followup: bool,
    pub ended: bool,
}

/// Copy-on-read view of a session for observability listings.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub role: Role,
    pub persona: Persona,
    pub candidate_name: String,
    pub state: SessionState,
    pub question_count: u32,
    pub created_at: DateTime<Utc>,
}

pub struct InterviewSession {
    id: SessionId,
    role: Role,
    persona: Persona,
    candidate_name: String,
    created_at: DateTime<Utc>,
    state: SessionState,
    /// Base questions asked so far. Monotonic, never exceeds
    /// `max_questions`; follow-ups do not count.
    question_count: u32,
    /// Answers processed so far, follow-up answers included. Bounds total
    /// session length against an oracle that never stops asking
    /// follow-ups.
    answer_count: u32,
    current_prompt: String,
    memory: ConversationMemory,
    questions: QuestionSequencer,
    max_questions: u32,
}

impl InterviewSession {
    pub fn new(
        id: SessionId,
        role: Role,
        persona: Persona,
        candidate_name: impl Into<String>,
        config: SessionConfig,
    ) -> Self {
        Self {
            id,
            role,
            persona,
            candidate_name: candidate_name.into(),
            created_at: Utc::now(),
            state: SessionState::Greeting,
            question_count: 0,
            answer_count: 0,
            current_prompt: String::new(),
            memory: ConversationMemory::new(config.memory_limit),
            questions: QuestionSequencer::for_role(role),
            max_questions: config.max_questions.max(1),
        }
    }

    /// Seed the session: the greeting plus the first base question land as
    /// a single interviewer turn, and the session starts awaiting its
    /// first answer. Returns the first question.
    pub fn begin(&mut self, greeting: &str) -> Result<String> {
        if self.state != SessionState::Greeting {
            return Err(InterviewError::InvalidArgument(
                "session has already been started".to_string(),
            ));
        }
        let first_question = self.questions.next().ok_or_else(|| {
            InterviewError::InvalidArgument("role has an empty question plan".to_string())
        })?;

        self.question_count = 1;
        self.current_prompt = first_question.clone();
        self.memory.append(
            Speaker::Interviewer,
            format!("{greeting}\n\n{first_question}"),
        );
        self.state = SessionState::AwaitingAnswer;

        tracing::debug!(session = %self.id, role = %self.role, "session seeded");
        Ok(first_question)
    }

    /// First half of a turn: append the candidate's answer and snapshot
    /// the oracle's input. Leaves the session in `Evaluating`.
    pub fn record_answer(
        &mut self,
        answer: &str,
        cheating: CheatingSummary,
    ) -> Result<EvaluationRequest> {
        match self.state {
            SessionState::AwaitingAnswer => {}
            SessionState::Evaluating => {
                return Err(InterviewError::InvalidArgument(
                    "previous answer is still being evaluated".to_string(),
                ));
            }
            SessionState::Greeting => {
                return Err(InterviewError::InvalidArgument(
                    "session has not been started".to_string(),
                ));
            }
            SessionState::Completed => {
                return Err(InterviewError::InvalidArgument(
                    "session is already completed".to_string(),
                ));
            }
        }

        self.memory.append(Speaker::Candidate, answer);
        self.answer_count += 1;
        self.state = SessionState::Evaluating;

        Ok(EvaluationRequest {
            answer: answer.to_string(),
            current_prompt: self.current_prompt.clone(),
            history: self.memory.history(),
            cheating,
            role: self.role,
            persona: self.persona,
        })
    }

    /// Second half of a turn: fold the oracle's decision back in and apply
    /// the advance rule. Priority order:
    ///
    /// 1. explicit completion, the base-question cap, or the total-answer
    ///    cap end the session — these outrank the oracle's follow-up
    ///    preference, so termination is guaranteed even against an oracle
    ///    that always asks for more;
    /// 2. a requested follow-up becomes the active prompt without
    ///    consuming a base question;
    /// 3. otherwise the next base question is pulled, or the session ends
    ///    when the plan is exhausted.
    pub fn apply_decision(&mut self, decision: Decision) -> Result<TurnAdvance> {
        if self.state != SessionState::Evaluating {
            return Err(InterviewError::InvalidArgument(
                "no answer is awaiting a decision".to_string(),
            ));
        }

        self.memory
            .append(Speaker::Interviewer, decision.acknowledgment.clone());

        if decision.complete
            || self.question_count >= self.max_questions
            || self.answer_count >= self.answer_cap()
        {
            self.state = SessionState::Completed;
            tracing::info!(
                session = %self.id,
                questions = self.question_count,
                answers = self.answer_count,
                "interview completed"
            );
            return Ok(TurnAdvance {
                acknowledgment: decision.acknowledgment,
                next_question: None,
                is_followup: false,
                ended: true,
            });
        }

        if decision.wants_followup {
            let followup = decision
                .followup_question
                .filter(|q| !q.trim().is_empty())
                .unwrap_or_else(|| CLARIFYING_PROMPT.to_string());
            self.current_prompt = followup.clone();
            self.memory.append(Speaker::Interviewer, followup.clone());
            self.state = SessionState::AwaitingAnswer;
            return Ok(TurnAdvance {
                acknowledgment: decision.acknowledgment,
                next_question: Some(followup),
                is_followup: true,
                ended: false,
            });
        }

        match self.questions.next() {
            Some(question) => {
                self.question_count += 1;
                self.current_prompt = question.clone();
                self.memory.append(Speaker::Interviewer, question.clone());
                self.state = SessionState::AwaitingAnswer;
                Ok(TurnAdvance {
                    acknowledgment: decision.acknowledgment,
                    next_question: Some(question),
                    is_followup: false,
                    ended: false,
                })
            }
            None => {
                self.state = SessionState::Completed;
                tracing::info!(session = %self.id, "question plan exhausted");
                Ok(TurnAdvance {
                    acknowledgment: decision.acknowledgment,
                    next_question: None,
                    is_followup: false,
                    ended: true,
                })
            }
        }
    }

    /// Force the terminal state. Used when the caller ends the session
    /// early; idempotent.
    pub fn finish(&mut self) {
        self.state = SessionState::Completed;
    }

    fn answer_cap(&self) -> u32 {
        self.max_questions.saturating_mul(2)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    pub fn current_prompt(&self) -> &str {
        &self.current_prompt
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id,
            role: self.role,
            persona: self.persona,
            candidate_name: self.candidate_name.clone(),
            state: self.state,
            question_count: self.question_count,
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_cheating() -> CheatingSummary {
        CheatingSummary {
            total_events: 0,
            critical_events: 0,
            recent_severity: crate::proctor::Severity::Low,
        }
    }

    fn started_session() -> InterviewSession {
        let mut session = InterviewSession::new(
            SessionId::new(),
            Role::Sde,
            Persona::Efficient,
            "Ada",
            SessionConfig::default(),
        );
        session.begin("Welcome!").unwrap();
        session
    }

    fn plain_decision() -> Decision {
        Decision {
            acknowledgment: "Noted.".to_string(),
            wants_followup: false,
            followup_question: None,
            complete: false,
        }
    }

    fn followup_decision(question: Option<&str>) -> Decision {
        Decision {
            acknowledgment: "Interesting.".to_string(),
            wants_followup: true,
            followup_question: question.map(str::to_string),
            complete: false,
        }
    }

    fn take_turn(session: &mut InterviewSession, decision: Decision) -> TurnAdvance {
        session.record_answer("my answer", no_cheating()).unwrap();
        session.apply_decision(decision).unwrap()
    }

    // ===== Bootstrap =====

    #[test]
    fn begin_seeds_greeting_and_first_question() {
        let mut session = InterviewSession::new(
            SessionId::new(),
            Role::Sde,
            Persona::Efficient,
            "Ada",
            SessionConfig::default(),
        );
        assert_eq!(session.state(), SessionState::Greeting);

        let first = session.begin("Welcome, Ada!").unwrap();

        assert_eq!(first, Role::Sde.questions()[0]);
        assert_eq!(session.state(), SessionState::AwaitingAnswer);
        assert_eq!(session.question_count(), 1);
        assert_eq!(session.current_prompt(), first);

        // Greeting and first question land as one interviewer turn.
        let history = session.memory().history();
        assert_eq!(history.len(), 1);
        assert!(history[0].content.contains("Welcome, Ada!"));
        assert!(history[0].content.contains(&first));
    }

    #[test]
    fn begin_twice_is_rejected() {
        let mut session = started_session();
        assert!(matches!(
            session.begin("again"),
            Err(InterviewError::InvalidArgument(_))
        ));
    }

    // ===== Turn flow =====

    #[test]
    fn plain_answers_walk_the_question_plan_to_completion() {
        let mut session = started_session();
        let plan = Role::Sde.questions();

        // Answers 1..=6 each pull the next base question.
        for i in 0..6 {
            let advance = take_turn(&mut session, plain_decision());
            assert!(!advance.ended);
            assert!(!advance.is_followup);
            assert_eq!(advance.next_question.as_deref(), Some(plan[i + 1]));
        }
        assert_eq!(session.question_count(), 7);

        // The seventh answer hits the cap.
        let advance = take_turn(&mut session, plain_decision());
        assert!(advance.ended);
        assert!(advance.next_question.is_none());
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.question_count(), 7);
    }

    #[test]
    fn record_answer_snapshots_oracle_input() {
        let mut session = started_session();
        let request = session
            .record_answer("I once fixed a race condition.", no_cheating())
            .unwrap();

        assert_eq!(request.answer, "I once fixed a race condition.");
        assert_eq!(request.current_prompt, Role::Sde.questions()[0]);
        assert_eq!(request.role, Role::Sde);
        assert_eq!(request.persona, Persona::Efficient);
        // Seed turn + the answer just recorded.
        assert_eq!(request.history.len(), 2);
        assert_eq!(session.state(), SessionState::Evaluating);
    }

    #[test]
    fn explicit_completion_ends_immediately() {
        let mut session = started_session();
        let advance = take_turn(
            &mut session,
            Decision {
                complete: true,
                ..plain_decision()
            },
        );

        assert!(advance.ended);
        assert_eq!(session.state(), SessionState::Completed);
        // The plan was barely touched; completion still wins.
        assert_eq!(session.question_count(), 1);
    }

    #[test]
    fn completion_outranks_a_followup_request() {
        let mut session = started_session();
        let advance = take_turn(
            &mut session,
            Decision {
                complete: true,
                ..followup_decision(Some("One more thing?"))
            },
        );
        assert!(advance.ended);
        assert!(advance.next_question.is_none());
    }

    #[test]
    fn followup_becomes_the_active_prompt_without_consuming_the_plan() {
        let mut session = started_session();
        let advance = take_turn(&mut session, followup_decision(Some("Which database?")));

        assert!(advance.is_followup);
        assert!(!advance.ended);
        assert_eq!(advance.next_question.as_deref(), Some("Which database?"));
        assert_eq!(session.current_prompt(), "Which database?");
        // Still on base question 1.
        assert_eq!(session.question_count(), 1);

        // The next plain answer resumes the plan where it left off.
        let advance = take_turn(&mut session, plain_decision());
        assert_eq!(
            advance.next_question.as_deref(),
            Some(Role::Sde.questions()[1])
        );
        assert_eq!(session.question_count(), 2);
    }

    #[test]
    fn empty_followup_text_substitutes_the_clarifying_prompt() {
        let mut session = started_session();

        let advance = take_turn(&mut session, followup_decision(None));
        assert_eq!(advance.next_question.as_deref(), Some(CLARIFYING_PROMPT));

        let advance = take_turn(&mut session, followup_decision(Some("   ")));
        assert_eq!(advance.next_question.as_deref(), Some(CLARIFYING_PROMPT));
    }

    #[test]
    fn an_oracle_that_always_wants_followups_still_terminates() {
        let mut session = started_session();

        let mut turns = 0;
        loop {
            let advance = take_turn(&mut session, followup_decision(Some("And then?")));
            turns += 1;
            assert!(turns <= 14, "session failed to terminate");
            if advance.ended {
                break;
            }
        }
        assert_eq!(session.state(), SessionState::Completed);
        // The base-question counter never moved past the first question,
        // but the total-answer cap closed the session.
        assert_eq!(session.question_count(), 1);
    }

    #[test]
    fn question_counter_is_monotonic_and_never_exceeds_the_cap() {
        let mut session = started_session();
        let mut last = session.question_count();

        for _ in 0..20 {
            if session.state() == SessionState::Completed {
                break;
            }
            take_turn(&mut session, plain_decision());
            let count = session.question_count();
            assert!(count >= last);
            assert!(count <= DEFAULT_MAX_QUESTIONS);
            last = count;
        }
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn smaller_configured_cap_is_honored() {
        let mut session = InterviewSession::new(
            SessionId::new(),
            Role::Hr,
            Persona::Chatty,
            "Sam",
            SessionConfig {
                max_questions: 2,
                ..SessionConfig::default()
            },
        );
        session.begin("Hello").unwrap();

        let advance = take_turn(&mut session, plain_decision());
        assert!(!advance.ended);
        let advance = take_turn(&mut session, plain_decision());
        assert!(advance.ended);
    }

    // ===== Misuse =====

    #[test]
    fn answering_a_completed_session_is_rejected() {
        let mut session = started_session();
        take_turn(
            &mut session,
            Decision {
                complete: true,
                ..plain_decision()
            },
        );

        assert!(matches!(
            session.record_answer("too late", no_cheating()),
            Err(InterviewError::InvalidArgument(_))
        ));
    }

    #[test]
    fn double_record_without_a_decision_is_rejected() {
        let mut session = started_session();
        session.record_answer("first", no_cheating()).unwrap();
        assert!(matches!(
            session.record_answer("second", no_cheating()),
            Err(InterviewError::InvalidArgument(_))
        ));
    }

    #[test]
    fn decision_without_a_recorded_answer_is_rejected() {
        let mut session = started_session();
        assert!(matches!(
            session.apply_decision(plain_decision()),
            Err(InterviewError::InvalidArgument(_))
        ));
    }

    #[test]
    fn finish_is_idempotent() {
        let mut session = started_session();
        session.finish();
        session.finish();
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn snapshot_reflects_session_attributes() {
        let session = started_session();
        let snapshot = session.snapshot();
        assert_eq!(snapshot.id, session.id());
        assert_eq!(snapshot.role, Role::Sde);
        assert_eq!(snapshot.candidate_name, "Ada");
        assert_eq!(snapshot.question_count, 1);
    }
}
