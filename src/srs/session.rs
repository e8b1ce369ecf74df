use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One card of a study deck. Only identifiers live in the session store;
/// prompts and answers are read back from the catalog when needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckEntry {
    pub item_id: i32,
    pub lesson_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Active { index: usize },
    Answered { index: usize, selection: String, correct: bool },
    Completed { correct: usize, total: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("no card is awaiting an answer")]
    NotActive,
    #[error("the current card has not been answered")]
    NotAnswered,
    #[error("the session is still in progress")]
    NotCompleted,
}

/// The study-session state machine. It only sequences cards and tallies the
/// session score; recording reviews is the caller's job, and the caller must
/// not advance the machine until that write has settled. Serializable so it
/// can live in the web session between requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewSession {
    deck: Vec<DeckEntry>,
    correct: usize,
    phase: Phase,
}

impl ReviewSession {
    /// Start a session over a freshly loaded due deck. An empty deck
    /// completes immediately with a zero score.
    pub fn start(deck: Vec<DeckEntry>) -> Self {
        let mut session = ReviewSession { deck, correct: 0, phase: Phase::Idle };
        session.begin();
        session
    }

    fn begin(&mut self) {
        self.correct = 0;
        self.phase = if self.deck.is_empty() {
            Phase::Completed { correct: 0, total: 0 }
        } else {
            Phase::Active { index: 0 }
        };
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn len(&self) -> usize {
        self.deck.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deck.is_empty()
    }

    /// The card currently awaiting an answer, if any.
    pub fn current(&self) -> Option<DeckEntry> {
        match self.phase {
            Phase::Active { index } => self.deck.get(index).copied(),
            _ => None,
        }
    }

    /// Fraction of cards answered correctly in this pass.
    pub fn score(&self) -> f64 {
        if self.deck.is_empty() {
            0.0
        } else {
            self.correct as f64 / self.deck.len() as f64
        }
    }

    /// `Active(i) -> Answered`. Only legal while a card is being shown.
    pub fn answer(&mut self, selection: String, correct: bool) -> Result<(), SessionError> {
        match self.phase {
            Phase::Active { index } => {
                if correct {
                    self.correct += 1;
                }
                self.phase = Phase::Answered { index, selection, correct };
                Ok(())
            }
            _ => Err(SessionError::NotActive),
        }
    }

    /// `Answered -> Active(i+1)` while cards remain, else `Completed`.
    pub fn advance(&mut self) -> Result<&Phase, SessionError> {
        match self.phase {
            Phase::Answered { index, .. } => {
                let next = index + 1;
                self.phase = if next < self.deck.len() {
                    Phase::Active { index: next }
                } else {
                    Phase::Completed { correct: self.correct, total: self.deck.len() }
                };
                Ok(&self.phase)
            }
            _ => Err(SessionError::NotAnswered),
        }
    }

    /// `Completed -> Active(0)`: re-present the same deck. Reviews recorded
    /// during the previous pass stand; only the session tally resets.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        match self.phase {
            Phase::Completed { .. } => {
                self.begin();
                Ok(())
            }
            _ => Err(SessionError::NotCompleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(n: i32) -> Vec<DeckEntry> {
        (1..=n).map(|i| DeckEntry { item_id: i, lesson_id: 1 }).collect()
    }

    #[test]
    fn starts_on_first_card() {
        let session = ReviewSession::start(deck(3));
        assert_eq!(session.phase(), &Phase::Active { index: 0 });
        assert_eq!(session.current(), Some(DeckEntry { item_id: 1, lesson_id: 1 }));
    }

    #[test]
    fn empty_deck_completes_immediately() {
        let session = ReviewSession::start(vec![]);
        assert_eq!(session.phase(), &Phase::Completed { correct: 0, total: 0 });
        assert_eq!(session.score(), 0.0);
    }

    #[test]
    fn full_pass_reaches_completed_with_score() {
        let mut session = ReviewSession::start(deck(3));

        session.answer("a".into(), true).unwrap();
        assert!(matches!(session.phase(), Phase::Answered { index: 0, correct: true, .. }));
        session.advance().unwrap();

        session.answer("b".into(), false).unwrap();
        session.advance().unwrap();

        session.answer("c".into(), true).unwrap();
        let phase = session.advance().unwrap().clone();

        assert_eq!(phase, Phase::Completed { correct: 2, total: 3 });
        assert!((session.score() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn cannot_answer_twice_without_advancing() {
        let mut session = ReviewSession::start(deck(2));
        session.answer("a".into(), true).unwrap();
        assert_eq!(session.answer("a".into(), true), Err(SessionError::NotActive));
    }

    #[test]
    fn cannot_advance_without_answering() {
        let mut session = ReviewSession::start(deck(2));
        assert_eq!(session.advance().unwrap_err(), SessionError::NotAnswered);
    }

    #[test]
    fn retry_resets_tally_but_keeps_deck() {
        let mut session = ReviewSession::start(deck(1));
        session.answer("a".into(), true).unwrap();
        session.advance().unwrap();
        assert!(matches!(session.phase(), Phase::Completed { correct: 1, total: 1 }));

        session.retry().unwrap();
        assert_eq!(session.phase(), &Phase::Active { index: 0 });
        assert_eq!(session.len(), 1);
        assert_eq!(session.score(), 0.0);
    }

    #[test]
    fn retry_only_from_completed() {
        let mut session = ReviewSession::start(deck(2));
        assert_eq!(session.retry().unwrap_err(), SessionError::NotCompleted);
    }
}
