//! The question sequencer: a stateful cursor over a role's fixed base
//! questions. Once exhausted it stays exhausted; it never wraps or
//! repeats.

use rand::seq::SliceRandom;

use crate::roles::Role;

/// Ordered question plan for one session, captured from the role at
/// creation time.
#[derive(Debug)]
pub struct QuestionSequencer {
    questions: Vec<String>,
    cursor: usize,
    asked: Vec<String>,
}

impl QuestionSequencer {
    pub fn for_role(role: Role) -> Self {
        Self::from_questions(role.questions().iter().map(|q| q.to_string()).collect())
    }

    pub fn from_questions(questions: Vec<String>) -> Self {
        Self {
            questions,
            cursor: 0,
            asked: Vec::new(),
        }
    }

    /// Next base question in plan order, or `None` forever once the plan
    /// is exhausted. Questions already handed out by `next_random` are
    /// skipped, never re-asked.
    pub fn next(&mut self) -> Option<String> {
        while let Some(question) = self.questions.get(self.cursor) {
            self.cursor += 1;
            if !self.asked.contains(question) {
                let question = question.clone();
                self.asked.push(question.clone());
                return Some(question);
            }
        }
        None
    }

    /// Unbiased draw over the not-yet-asked questions. Never re-selects a
    /// question that was already handed out by either selection mode.
    pub fn next_random(&mut self) -> Option<String> {
        let remaining: Vec<&String> = self
            .questions
            .iter()
            .filter(|q| !self.asked.contains(q))
            .collect();
        let question = (*remaining.choose(&mut rand::thread_rng())?).clone();
        self.asked.push(question.clone());
        Some(question)
    }

    pub fn remaining(&self) -> usize {
        self.questions.len() - self.asked.len()
    }

    pub fn asked_count(&self) -> usize {
        self.asked.len()
    }

    pub fn has_more(&self) -> bool {
        self.remaining() > 0
    }
}
