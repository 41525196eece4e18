//! Feedback compilation: turns an oracle draft (or, when the oracle
//! fails, observable engagement metrics) into the session's closing
//! report. The fallback path is pure and total — any transcript yields a
//! complete report with no external call.

use serde::{Deserialize, Serialize};

use crate::memory::{ConversationTurn, Speaker};
use crate::oracle::FeedbackDraft;
use crate::proctor::DetailedCheatingSummary;
use crate::roles::Role;

/// Candidate answers below this word count are treated as
/// non-participation.
const MIN_PARTICIPATION_WORDS: usize = 10;

/// The closing report: three 0–10 scores, a short narrative, and the full
/// cheating summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackReport {
    pub technical_score: u8,
    pub communication_score: u8,
    pub confidence_score: u8,
    pub overall_summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
    pub cheating_summary: DetailedCheatingSummary,
}

/// Accept an oracle draft, clamping its scores into [0, 10].
pub fn from_draft(draft: FeedbackDraft, cheating: DetailedCheatingSummary) -> FeedbackReport {
    FeedbackReport {
        technical_score: clamp_score(draft.technical_score),
        communication_score: clamp_score(draft.communication_score),
        confidence_score: clamp_score(draft.confidence_score),
        overall_summary: draft.overall_summary,
        strengths: draft.strengths,
        weaknesses: draft.weaknesses,
        recommendations: draft.recommendations,
        cheating_summary: cheating,
    }
}

/// Deterministic local report used whenever the oracle's draft is missing
/// or malformed. Scores derive from observable engagement only.
pub fn fallback_report(
    history: &[ConversationTurn],
    role: Role,
    cheating: DetailedCheatingSummary,
) -> FeedbackReport {
    let answers: Vec<&ConversationTurn> = history
        .iter()
        .filter(|t| t.speaker == Speaker::Candidate)
        .collect();
    let total_words: usize = answers
        .iter()
        .map(|t| t.content.split_whitespace().count())
        .sum();

    if answers.is_empty() || total_words < MIN_PARTICIPATION_WORDS {
        return FeedbackReport {
            technical_score: 0,
            communication_score: 0,
            confidence_score: 0,
            overall_summary: "Interview was ended without providing any meaningful \
                              responses. No evaluation possible."
                .to_string(),
            strengths: Vec::new(),
            weaknesses: vec![
                "Did not participate in the interview".to_string(),
                "Ended session immediately without providing any answers".to_string(),
            ],
            recommendations: vec![
                "Complete the full interview".to_string(),
                "Provide thoughtful answers to questions".to_string(),
                "Engage with the interviewer".to_string(),
            ],
            cheating_summary: cheating,
        };
    }

    let avg_answer_len =
        answers.iter().map(|t| t.content.len()).sum::<usize>() / answers.len();

    let technical = ((answers.len() as f64 * 1.5) as i64).clamp(1, 10);
    let cheating_penalty = cheating.critical_events.min(3) as i64;
    let technical_score = clamp_score((technical - cheating_penalty).max(1));

    let communication_score = if avg_answer_len > 200 {
        8
    } else if avg_answer_len > 100 {
        6
    } else {
        4
    };
    // Mid-range without sentiment signals to go on.
    let confidence_score = 6;

    FeedbackReport {
        technical_score,
        communication_score,
        confidence_score,
        overall_summary: summarize(technical_score, communication_score, confidence_score),
        strengths: identify_strengths(technical_score, communication_score),
        weaknesses: identify_weaknesses(technical_score, communication_score, &cheating),
        recommendations: recommend(role, technical_score, communication_score),
        cheating_summary: cheating,
    }
}

fn clamp_score(score: i64) -> u8 {
    score.clamp(0, 10) as u8
}

fn summarize(technical: u8, communication: u8, confidence: u8) -> String {
    let avg = f64::from(u16::from(technical) + u16::from(communication) + u16::from(confidence))
        / 3.0;

    if avg >= 8.0 {
        "Excellent performance with strong technical knowledge and communication skills."
    } else if avg >= 6.0 {
        "Good performance with solid understanding. Some areas for improvement identified."
    } else if avg >= 4.0 {
        "Fair performance. Significant room for improvement in technical depth and \
         communication."
    } else {
        "Needs improvement. Focus on building foundational knowledge and interview skills."
    }
    .to_string()
}

fn identify_strengths(technical: u8, communication: u8) -> Vec<String> {
    let mut strengths = Vec::new();
    if technical >= 7 {
        strengths.push("Strong technical knowledge".to_string());
    }
    if communication >= 7 {
        strengths.push("Clear and articulate communication".to_string());
    }
    if technical >= 5 && communication >= 5 {
        strengths.push("Consistent engagement throughout interview".to_string());
    }
    if strengths.is_empty() {
        strengths.push("Completed the interview".to_string());
    }
    strengths
}

fn identify_weaknesses(
    technical: u8,
    communication: u8,
    cheating: &DetailedCheatingSummary,
) -> Vec<String> {
    let mut weaknesses = Vec::new();
    if technical < 5 {
        weaknesses.push("Technical knowledge needs strengthening".to_string());
    }
    if communication < 5 {
        weaknesses.push("Communication clarity could be improved".to_string());
    }
    if cheating.total_events > 5 {
        weaknesses.push("Multiple protocol violations detected".to_string());
    }
    if weaknesses.is_empty() {
        weaknesses.push("Minor areas for refinement".to_string());
    }
    weaknesses
}

fn recommend(role: Role, technical: u8, communication: u8) -> Vec<String> {
    let mut recommendations = vec![role.practice_tip().to_string()];
    if technical < 6 {
        recommendations
            .push("Deepen technical knowledge through online courses and practice".to_string());
    }
    if communication < 6 {
        recommendations.push("Practice articulating thoughts clearly and concisely".to_string());
    }
    recommendations.push("Conduct more mock interviews to build confidence".to_string());
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ConversationTurn;

    fn turn(speaker: Speaker, content: &str) -> ConversationTurn {
        ConversationTurn::new(speaker, content)
    }

    fn answers(contents: &[&str]) -> Vec<ConversationTurn> {
        let mut history = Vec::new();
        for (i, content) in contents.iter().enumerate() {
            history.push(turn(Speaker::Interviewer, &format!("Question {i}")));
            history.push(turn(Speaker::Candidate, content));
        }
        history
    }

    #[test]
    fn empty_transcript_scores_zero_with_no_participation_narrative() {
        let report = fallback_report(&[], Role::Sde, DetailedCheatingSummary::empty());

        assert_eq!(report.technical_score, 0);
        assert_eq!(report.communication_score, 0);
        assert_eq!(report.confidence_score, 0);
        assert!(report.overall_summary.contains("No evaluation possible"));
        assert!(report.strengths.is_empty());
        assert!(!report.weaknesses.is_empty());
    }

    #[test]
    fn fewer_than_ten_words_counts_as_no_participation() {
        let history = answers(&["yes", "no maybe"]);
        let report = fallback_report(&history, Role::Sales, DetailedCheatingSummary::empty());
        assert_eq!(report.technical_score, 0);
    }

    #[test]
    fn ten_words_crosses_the_participation_threshold() {
        let history = answers(&["one two three four five six seven eight nine ten"]);
        let report = fallback_report(&history, Role::Sales, DetailedCheatingSummary::empty());
        assert!(report.technical_score > 0);
    }

    #[test]
    fn engaged_transcript_derives_scores_from_counts_and_lengths() {
        let long_answer = "word ".repeat(60); // ~300 chars
        let history = answers(&[&long_answer, &long_answer, &long_answer, &long_answer]);

        let report = fallback_report(&history, Role::Sde, DetailedCheatingSummary::empty());

        // 4 answers * 1.5 = 6.
        assert_eq!(report.technical_score, 6);
        // Average length > 200 chars.
        assert_eq!(report.communication_score, 8);
        assert_eq!(report.confidence_score, 6);
        assert!(!report.overall_summary.is_empty());
        assert!(!report.recommendations.is_empty());
    }

    #[test]
    fn short_answers_lower_the_communication_score() {
        let history = answers(&[
            "a fairly short answer with enough words to participate fully",
            "another brief reply",
        ]);
        let report = fallback_report(&history, Role::Hr, DetailedCheatingSummary::empty());
        assert_eq!(report.communication_score, 4);
    }

    #[test]
    fn critical_events_penalize_the_technical_score() {
        let long_answer = "word ".repeat(60);
        let history = answers(&[&long_answer, &long_answer, &long_answer, &long_answer]);

        let cheating = DetailedCheatingSummary {
            total_events: 2,
            critical_events: 2,
            ..DetailedCheatingSummary::empty()
        };
        let report = fallback_report(&history, Role::Sde, cheating);

        // 6 base minus a 2-point penalty.
        assert_eq!(report.technical_score, 4);
    }

    #[test]
    fn penalty_never_drives_the_engaged_score_below_one() {
        let history = answers(&["a single answer that is just long enough to count here"]);
        let cheating = DetailedCheatingSummary {
            total_events: 9,
            critical_events: 9,
            ..DetailedCheatingSummary::empty()
        };
        let report = fallback_report(&history, Role::Sde, cheating);
        assert!(report.technical_score >= 1);
    }

    #[test]
    fn many_violations_surface_as_a_weakness() {
        let history = answers(&["an answer with comfortably more than the ten word minimum"]);
        let cheating = DetailedCheatingSummary {
            total_events: 6,
            ..DetailedCheatingSummary::empty()
        };
        let report = fallback_report(&history, Role::Sde, cheating);
        assert!(report
            .weaknesses
            .iter()
            .any(|w| w.contains("protocol violations")));
    }

    #[test]
    fn fallback_is_deterministic() {
        let history = answers(&["the same transcript always yields the same report"]);
        let a = fallback_report(&history, Role::Hr, DetailedCheatingSummary::empty());
        let b = fallback_report(&history, Role::Hr, DetailedCheatingSummary::empty());
        assert_eq!(a, b);
    }

    #[test]
    fn draft_scores_are_clamped_into_range() {
        let draft = FeedbackDraft {
            technical_score: 14,
            communication_score: -3,
            confidence_score: 7,
            overall_summary: "Solid.".to_string(),
            strengths: vec!["Depth".to_string()],
            weaknesses: vec![],
            recommendations: vec![],
        };
        let report = from_draft(draft, DetailedCheatingSummary::empty());

        assert_eq!(report.technical_score, 10);
        assert_eq!(report.communication_score, 0);
        assert_eq!(report.confidence_score, 7);
        assert_eq!(report.overall_summary, "Solid.");
    }

    #[test]
    fn report_carries_the_cheating_summary_verbatim() {
        let cheating = DetailedCheatingSummary {
            total_events: 3,
            risk_score: 35,
            ..DetailedCheatingSummary::empty()
        };
        let report = fallback_report(&[], Role::Sde, cheating.clone());
        assert_eq!(report.cheating_summary, cheating);
    }
}
