//! Conversation memory: an append-only, order-preserving transcript with a
//! bounded sliding window. Reads hand out copies, so trimming can never
//! tear a view a caller already holds.

use serde::{Deserialize, Serialize};

/// Default retention bound for one session's transcript.
pub const DEFAULT_MEMORY_LIMIT: usize = 50;

/// Who produced a turn. The interviewer asks, the candidate responds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    Interviewer,
    Candidate,
}

/// One message in the transcript. Insertion order is the only ranking
/// signal; turns are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub speaker: Speaker,
    pub content: String,
}

impl ConversationTurn {
    pub fn new(speaker: Speaker, content: impl Into<String>) -> Self {
        Self {
            speaker,
            content: content.into(),
        }
    }
}

/// The transcript store for one session. `append` is the single mutation
/// entry point; once the configured bound is exceeded, the oldest turns
/// are evicted first.
#[derive(Debug)]
pub struct ConversationMemory {
    turns: Vec<ConversationTurn>,
    max_turns: usize,
}

impl ConversationMemory {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: Vec::new(),
            max_turns: max_turns.max(1),
        }
    }

    pub fn append(&mut self, speaker: Speaker, content: impl Into<String>) {
        self.turns.push(ConversationTurn::new(speaker, content));
        if self.turns.len() > self.max_turns {
            let excess = self.turns.len() - self.max_turns;
            self.turns.drain(..excess);
        }
    }

    /// Immutable copy of the full retained transcript, oldest first.
    pub fn history(&self) -> Vec<ConversationTurn> {
        self.turns.clone()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn candidate_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::Candidate)
            .count()
    }

    pub fn interviewer_turns(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::Interviewer)
            .count()
    }

    /// Total whitespace-separated words across candidate turns. Feeds the
    /// feedback compiler's participation check.
    pub fn candidate_word_count(&self) -> usize {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::Candidate)
            .map(|t| t.content.split_whitespace().count())
            .sum()
    }
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(DEFAULT_MEMORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_preserves_insertion_order() {
        let mut memory = ConversationMemory::default();
        memory.append(Speaker::Interviewer, "Tell me about yourself.");
        memory.append(Speaker::Candidate, "I build backends.");
        memory.append(Speaker::Interviewer, "Thanks.");

        let history = memory.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].speaker, Speaker::Interviewer);
        assert_eq!(history[1].content, "I build backends.");
        assert_eq!(history[2].content, "Thanks.");
    }

    #[test]
    fn window_keeps_exactly_the_most_recent_turns() {
        let mut memory = ConversationMemory::new(5);
        for i in 0..12 {
            memory.append(Speaker::Candidate, format!("turn {i}"));
        }

        let history = memory.history();
        assert_eq!(history.len(), 5);
        // Turns 7..12 survive, in order.
        for (offset, turn) in history.iter().enumerate() {
            assert_eq!(turn.content, format!("turn {}", 7 + offset));
        }
    }

    #[test]
    fn history_is_a_copy_unaffected_by_later_eviction() {
        let mut memory = ConversationMemory::new(2);
        memory.append(Speaker::Candidate, "first");
        memory.append(Speaker::Candidate, "second");

        let before = memory.history();
        memory.append(Speaker::Candidate, "third");

        assert_eq!(before[0].content, "first");
        assert_eq!(memory.history()[0].content, "second");
    }

    #[test]
    fn speaker_counts_are_split_correctly() {
        let mut memory = ConversationMemory::default();
        memory.append(Speaker::Interviewer, "Q1");
        memory.append(Speaker::Candidate, "A1");
        memory.append(Speaker::Interviewer, "Q2");

        assert_eq!(memory.interviewer_turns(), 2);
        assert_eq!(memory.candidate_turns(), 1);
    }

    #[test]
    fn candidate_word_count_ignores_interviewer_turns() {
        let mut memory = ConversationMemory::default();
        memory.append(Speaker::Interviewer, "a very long question indeed");
        memory.append(Speaker::Candidate, "two words");
        memory.append(Speaker::Candidate, "three more words");

        assert_eq!(memory.candidate_word_count(), 5);
    }

    #[test]
    fn zero_limit_is_clamped_to_one() {
        let mut memory = ConversationMemory::new(0);
        memory.append(Speaker::Candidate, "only");
        assert_eq!(memory.len(), 1);
    }
}
