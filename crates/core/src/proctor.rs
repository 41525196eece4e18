//! Cheating-event aggregation: an append-only ledger of frame
//! classifications plus the two derived views over it.
//!
//! The ledger is the session's permanent audit trail. Events are only
//! ever appended, never mutated or truncated, and both summaries are
//! recomputed on demand as pure functions of the ledger's contents, so
//! there is no cache to invalidate.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analyzer::FrameClassification;

/// Severity tier attached by the frame analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Low,
    Medium,
    High,
    Critical,
}

/// What kind of violation one frame represents.
///
/// Classification priority is fixed: a detected device always wins,
/// regardless of any other signal in the same frame; absent a device,
/// face-count anomalies outrank gaze/distance anomalies, which are only
/// inferred when exactly one face is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    DeviceDetected,
    MultipleFaces,
    NoFace,
    LookingAway,
    DistanceTooFar,
    DistanceTooClose,
    Normal,
}

impl EventCategory {
    pub fn from_classification(classification: &FrameClassification) -> Self {
        if classification.mobile_detected {
            return EventCategory::DeviceDetected;
        }
        if classification.num_faces > 1 {
            return EventCategory::MultipleFaces;
        }
        if classification.num_faces == 0 {
            return EventCategory::NoFace;
        }

        // Exactly one face: infer gaze/distance anomalies from the
        // detector's free-text issue list.
        for issue in &classification.issues {
            let issue = issue.to_lowercase();
            if issue.contains("not centered")
                || issue.contains("looking away")
                || issue.contains("eyes not")
                || issue.contains("gaze away")
            {
                return EventCategory::LookingAway;
            }
            if issue.contains("too far") {
                return EventCategory::DistanceTooFar;
            }
            if issue.contains("too close") {
                return EventCategory::DistanceTooClose;
            }
        }

        EventCategory::Normal
    }
}

/// One entry in the ledger: the classification record decorated with the
/// submitter's logical timestamp and the ledger's own ingestion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheatingEvent {
    pub category: EventCategory,
    pub severity: Severity,
    pub num_faces: u32,
    pub mobile_detected: bool,
    pub issues: Vec<String>,
    pub detector_score: f32,
    pub message: String,
    pub captured_at: DateTime<Utc>,
    pub logged_at: DateTime<Utc>,
}

/// Cheap running view, queried on every turn and passed to the oracle as
/// context. Never blocks a turn on proctoring conclusions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheatingSummary {
    pub total_events: usize,
    pub critical_events: usize,
    pub recent_severity: Severity,
}

/// Full end-of-session view: per-category counts, the capped risk score,
/// and the ledger handed over verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedCheatingSummary {
    pub total_events: usize,
    pub critical_events: usize,
    pub no_face_count: usize,
    pub looking_away_count: usize,
    pub multiple_faces_count: usize,
    pub device_detected_count: usize,
    pub distance_violations: usize,
    pub risk_score: u32,
    pub timeline: Vec<CheatingEvent>,
}

impl DetailedCheatingSummary {
    pub fn empty() -> Self {
        Self {
            total_events: 0,
            critical_events: 0,
            no_face_count: 0,
            looking_away_count: 0,
            multiple_faces_count: 0,
            device_detected_count: 0,
            distance_violations: 0,
            risk_score: 0,
            timeline: Vec::new(),
        }
    }
}

/// The per-session aggregator. `record` is safe under concurrent writers:
/// frame ingestion and turn processing arrive on separate channels and
/// must not block each other, so the ledger carries its own lock and
/// nothing else shares it.
#[derive(Debug, Default)]
pub struct CheatingMonitor {
    events: Mutex<Vec<CheatingEvent>>,
}

impl CheatingMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify and append one frame classification. `captured_at` is the
    /// submitter's logical timestamp; it defaults to ingestion time.
    pub fn record(
        &self,
        classification: FrameClassification,
        captured_at: Option<DateTime<Utc>>,
    ) -> CheatingEvent {
        let logged_at = Utc::now();
        let event = CheatingEvent {
            category: EventCategory::from_classification(&classification),
            severity: classification.severity,
            num_faces: classification.num_faces,
            mobile_detected: classification.mobile_detected,
            issues: classification.issues,
            detector_score: classification.cheating_score,
            message: classification.message,
            captured_at: captured_at.unwrap_or(logged_at),
            logged_at,
        };

        let mut events = self.events.lock().expect("cheating ledger poisoned");
        events.push(event.clone());
        event
    }

    pub fn event_count(&self) -> usize {
        self.events.lock().expect("cheating ledger poisoned").len()
    }

    /// Lightweight running summary: counts only, not the ledger.
    pub fn summary(&self) -> CheatingSummary {
        let events = self.events.lock().expect("cheating ledger poisoned");
        CheatingSummary {
            total_events: events.len(),
            critical_events: events
                .iter()
                .filter(|e| e.severity == Severity::Critical)
                .count(),
            recent_severity: events.last().map(|e| e.severity).unwrap_or_default(),
        }
    }

    /// Full summary over the ledger, including the risk score:
    /// `min(100, 20·critical + 15·multiple_faces + 10·no_face +
    /// 5·looking_away + 3·distance_violations)`.
    ///
    /// The weighted sum is deliberately simple and monotonic: appending an
    /// event can only raise or hold the score.
    pub fn detailed_summary(&self) -> DetailedCheatingSummary {
        let events = self.events.lock().expect("cheating ledger poisoned");

        let count_category = |category: EventCategory| -> usize {
            events.iter().filter(|e| e.category == category).count()
        };

        let critical_events = events
            .iter()
            .filter(|e| e.severity == Severity::Critical)
            .count();
        let no_face_count = count_category(EventCategory::NoFace);
        let looking_away_count = count_category(EventCategory::LookingAway);
        let multiple_faces_count = count_category(EventCategory::MultipleFaces);
        let device_detected_count = count_category(EventCategory::DeviceDetected);
        let distance_violations = count_category(EventCategory::DistanceTooFar)
            + count_category(EventCategory::DistanceTooClose);

        let score = 20 * critical_events
            + 15 * multiple_faces_count
            + 10 * no_face_count
            + 5 * looking_away_count
            + 3 * distance_violations;

        DetailedCheatingSummary {
            total_events: events.len(),
            critical_events,
            no_face_count,
            looking_away_count,
            multiple_faces_count,
            device_detected_count,
            distance_violations,
            risk_score: score.min(100) as u32,
            timeline: events.clone(),
        }
    }
}
