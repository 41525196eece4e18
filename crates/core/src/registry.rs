//! The session registry: owns the id→session map, drives turns against
//! the decision oracle, and routes proctoring frames into each session's
//! cheating monitor.
//!
//! Locking layout: the map has its own short-lived mutex (create, get and
//! terminate serialize on it, session contents never do); each session's
//! turn order is serialized by a per-session async mutex; the cheating
//! ledger carries its own lock so frames never contend with turns. No
//! session lock is held across an oracle or analyzer call — a turn
//! snapshots under the lock, awaits the oracle unlocked, then re-locks to
//! apply the decision.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::analyzer::FrameAnalyzer;
use crate::error::{InterviewError, Result, SessionId};
use crate::feedback::{self, FeedbackReport};
use crate::oracle::{fallback_greeting, Decision, DecisionOracle, FeedbackRequest};
use crate::proctor::{CheatingEvent, CheatingMonitor, DetailedCheatingSummary, EventCategory};
use crate::roles::{Persona, Role};
use crate::session::{InterviewSession, SessionConfig, SessionSnapshot, TurnAdvance};

#[derive(Debug, Clone, Copy)]
pub struct RegistryConfig {
    pub session: SessionConfig,
    /// Bound on every oracle call; on expiry the turn proceeds with the
    /// fallback decision instead of hanging the session.
    pub oracle_timeout: Duration,
    /// Bound on analyzer calls; expiry surfaces as a retryable error to
    /// the frame's submitter.
    pub analyzer_timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            oracle_timeout: Duration::from_secs(20),
            analyzer_timeout: Duration::from_secs(10),
        }
    }
}

/// Result of starting a session.
#[derive(Debug, Clone, Serialize)]
pub struct StartedSession {
    pub id: SessionId,
    pub role: Role,
    pub persona: Persona,
    pub greeting: String,
    pub first_question: String,
}

/// Result of submitting one proctoring frame.
#[derive(Debug, Clone, Serialize)]
pub struct FrameLog {
    pub event: CheatingEvent,
    /// Only device detections are worth alerting the caller about;
    /// everything else is tracked silently for the final summary.
    pub alerted: bool,
}

/// The closing report handed out when a session ends.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub id: SessionId,
    pub feedback: FeedbackReport,
}

struct SessionHandle {
    session: tokio::sync::Mutex<InterviewSession>,
    monitor: CheatingMonitor,
}

pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, Arc<SessionHandle>>>,
    oracle: Arc<dyn DecisionOracle>,
    analyzer: Arc<dyn FrameAnalyzer>,
    config: RegistryConfig,
}

impl SessionRegistry {
    pub fn new(
        oracle: Arc<dyn DecisionOracle>,
        analyzer: Arc<dyn FrameAnalyzer>,
        config: RegistryConfig,
    ) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            oracle,
            analyzer,
            config,
        }
    }

    /// Create and register a new session. Role and persona are validated
    /// against their closed enumerations; a greeting failure degrades to
    /// the generic greeting rather than failing the start.
    pub async fn start(
        &self,
        role: &str,
        persona: &str,
        display_name: &str,
    ) -> Result<StartedSession> {
        let role: Role = role.parse()?;
        let persona: Persona = persona.parse()?;
        let name = if display_name.trim().is_empty() {
            "Candidate"
        } else {
            display_name.trim()
        };

        let id = SessionId::new();
        let mut session = InterviewSession::new(id, role, persona, name, self.config.session);

        let greeting = match with_timeout(
            self.config.oracle_timeout,
            self.oracle.greet(role, persona, name),
        )
        .await
        {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => fallback_greeting(role, name),
            Err(error) => {
                tracing::warn!(session = %id, %error, "greeting failed, using generic greeting");
                fallback_greeting(role, name)
            }
        };

        let first_question = session.begin(&greeting)?;

        let handle = Arc::new(SessionHandle {
            session: tokio::sync::Mutex::new(session),
            monitor: CheatingMonitor::new(),
        });
        self.sessions
            .lock()
            .expect("session map poisoned")
            .insert(id, handle);

        tracing::info!(session = %id, %role, %persona, "session started");
        Ok(StartedSession {
            id,
            role,
            persona,
            greeting,
            first_question,
        })
    }

    /// Process one answer: record it, consult the oracle (bounded, with
    /// the fallback decision on failure), and apply the advance rule.
    pub async fn submit_answer(&self, id: SessionId, answer: &str) -> Result<TurnAdvance> {
        let handle = self.get(id)?;

        let request = {
            let mut session = handle.session.lock().await;
            session.record_answer(answer, handle.monitor.summary())?
        };

        let decision = match with_timeout(
            self.config.oracle_timeout,
            self.oracle.evaluate(request),
        )
        .await
        {
            Ok(decision) => decision,
            Err(error) => {
                tracing::warn!(session = %id, %error, "oracle evaluation failed, using fallback decision");
                Decision::fallback()
            }
        };

        let advance = {
            let mut session = handle.session.lock().await;
            session.apply_decision(decision)
        };
        match advance {
            Ok(advance) => Ok(advance),
            // The session may have been terminated while the oracle call
            // was in flight; the decision is simply discarded.
            Err(_) if !self.contains(id) => Err(InterviewError::NotFound(id)),
            Err(error) => Err(error),
        }
    }

    /// Classify one proctoring frame and append it to the session's
    /// ledger. Analyzer failures are retryable and never touch the
    /// session itself.
    pub async fn submit_frame(
        &self,
        id: SessionId,
        image: &[u8],
        captured_at: Option<DateTime<Utc>>,
    ) -> Result<FrameLog> {
        if image.is_empty() {
            return Err(InterviewError::InvalidArgument(
                "frame image is empty".to_string(),
            ));
        }
        let handle = self.get(id)?;

        let classification = with_timeout(
            self.config.analyzer_timeout,
            self.analyzer.classify(image),
        )
        .await
        .map_err(|error| InterviewError::UpstreamUnavailable(error.to_string()))?;

        let event = handle.monitor.record(classification, captured_at);
        let alerted = event.category == EventCategory::DeviceDetected;
        tracing::debug!(
            session = %id,
            category = ?event.category,
            severity = ?event.severity,
            "frame logged"
        );
        Ok(FrameLog { event, alerted })
    }

    /// End a session: remove it from the live set, compile the closing
    /// report (oracle draft, or the deterministic fallback), and hand the
    /// full cheating summary over. A second end on the same id fails with
    /// `NotFound`.
    pub async fn end(&self, id: SessionId) -> Result<SessionReport> {
        let handle = self
            .sessions
            .lock()
            .expect("session map poisoned")
            .remove(&id)
            .ok_or(InterviewError::NotFound(id))?;

        let (history, role, persona) = {
            let mut session = handle.session.lock().await;
            session.finish();
            (session.memory().history(), session.role(), session.persona())
        };
        let cheating = handle.monitor.detailed_summary();

        let request = FeedbackRequest {
            history: history.clone(),
            role,
            persona,
            cheating: cheating.clone(),
        };
        let report = match with_timeout(
            self.config.oracle_timeout,
            self.oracle.final_feedback(request),
        )
        .await
        {
            Ok(draft) => feedback::from_draft(draft, cheating),
            Err(error) => {
                tracing::warn!(session = %id, %error, "feedback draft failed, using local scoring");
                feedback::fallback_report(&history, role, cheating)
            }
        };

        tracing::info!(session = %id, "session ended");
        Ok(SessionReport { id, feedback: report })
    }

    /// Copy-on-read view of one live session. Fails with `NotFound` for
    /// absent or already-terminated identifiers.
    pub async fn session(&self, id: SessionId) -> Result<SessionSnapshot> {
        let handle = self.get(id)?;
        let snapshot = handle.session.lock().await.snapshot();
        Ok(snapshot)
    }

    /// Full ledger plus the detailed summary, without ending the session.
    pub fn timeline(&self, id: SessionId) -> Result<DetailedCheatingSummary> {
        Ok(self.get(id)?.monitor.detailed_summary())
    }

    /// Copy-on-read snapshots of every live session.
    pub async fn active_sessions(&self) -> Vec<SessionSnapshot> {
        let handles: Vec<Arc<SessionHandle>> = self
            .sessions
            .lock()
            .expect("session map poisoned")
            .values()
            .cloned()
            .collect();

        let mut snapshots = Vec::with_capacity(handles.len());
        for handle in handles {
            snapshots.push(handle.session.lock().await.snapshot());
        }
        snapshots
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session map poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, id: SessionId) -> Result<Arc<SessionHandle>> {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .get(&id)
            .cloned()
            .ok_or(InterviewError::NotFound(id))
    }

    fn contains(&self, id: SessionId) -> bool {
        self.sessions
            .lock()
            .expect("session map poisoned")
            .contains_key(&id)
    }
}

/// Bound an external call so a stalled collaborator cannot hang a
/// session.
async fn with_timeout<T>(
    limit: Duration,
    call: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!("external call timed out after {limit:?}")),
    }
}
