//! Per-round state for interactive front ends.
//!
//! A round starts with a fresh question, accepts at most one selection while
//! a feedback request is outstanding, and ignores results that arrive after
//! the round has been replaced.

use std::fmt;

use rand::Rng;

use crate::error::SessionError;
use crate::feedback::FeedbackResult;
use crate::prompt::FeedbackRequest;
use crate::question::{Question, QuestionGenerator};

/// Identifies one round within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoundId(u64);

impl fmt::Display for RoundId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A selection waiting for feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingFeedback {
    pub round: RoundId,
    pub request: FeedbackRequest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum RoundState {
    Idle,
    Awaiting,
    Answered(FeedbackResult),
}

#[derive(Debug)]
struct Round {
    id: RoundId,
    question: Question,
    selected: Option<String>,
    state: RoundState,
}

/// Drives quiz rounds for one user.
#[derive(Debug)]
pub struct QuizSession {
    generator: QuestionGenerator,
    next_id: u64,
    current: Option<Round>,
}

impl QuizSession {
    pub fn new(generator: QuestionGenerator) -> Self {
        Self {
            generator,
            next_id: 1,
            current: None,
        }
    }

    /// Start a new round with a question from the thread RNG.
    pub fn start_round(&mut self) -> &Question {
        let question = self.generator.generate();
        self.begin(question)
    }

    /// Start a new round using the supplied RNG.
    pub fn start_round_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> &Question {
        let question = self.generator.generate_with(rng);
        self.begin(question)
    }

    fn begin(&mut self, question: Question) -> &Question {
        let id = RoundId(self.next_id);
        self.next_id += 1;
        let round = self.current.insert(Round {
            id,
            question,
            selected: None,
            state: RoundState::Idle,
        });
        &round.question
    }

    pub fn round(&self) -> Option<RoundId> {
        self.current.as_ref().map(|r| r.id)
    }

    pub fn question(&self) -> Option<&Question> {
        self.current.as_ref().map(|r| &r.question)
    }

    /// The option picked in the current round, if any.
    pub fn selected(&self) -> Option<&str> {
        self.current.as_ref().and_then(|r| r.selected.as_deref())
    }

    pub fn is_pending(&self) -> bool {
        matches!(
            self.current,
            Some(Round {
                state: RoundState::Awaiting,
                ..
            })
        )
    }

    /// Feedback recorded for the current round.
    pub fn feedback(&self) -> Option<&FeedbackResult> {
        match &self.current {
            Some(Round {
                state: RoundState::Answered(result),
                ..
            }) => Some(result),
            _ => None,
        }
    }

    /// Record the user's choice and build the feedback request for it.
    pub fn select(&mut self, choice: &str) -> Result<PendingFeedback, SessionError> {
        let round = self.current.as_mut().ok_or(SessionError::NoActiveRound)?;
        match round.state {
            RoundState::Awaiting => return Err(SessionError::RequestPending),
            RoundState::Answered(_) => return Err(SessionError::AlreadyAnswered),
            RoundState::Idle => {}
        }
        if !round.question.has_option(choice) {
            return Err(SessionError::NotAnOption(choice.to_string()));
        }

        round.selected = Some(choice.to_string());
        round.state = RoundState::Awaiting;
        Ok(PendingFeedback {
            round: round.id,
            request: FeedbackRequest::new(
                round.question.term.clone(),
                choice,
                round.question.correct_theory.clone(),
            ),
        })
    }

    /// Apply a feedback result.
    ///
    /// Returns `false` and drops the result when `round` is no longer the
    /// current round or is not waiting for feedback.
    pub fn resolve(&mut self, round: RoundId, result: FeedbackResult) -> bool {
        match self.current.as_mut() {
            Some(current) if current.id == round && current.state == RoundState::Awaiting => {
                current.state = RoundState::Answered(result);
                true
            }
            _ => {
                tracing::debug!(%round, "discarding stale feedback");
                false
            }
        }
    }

    /// Give up on an outstanding request without recording a result, so the
    /// same round can be answered again.
    pub fn release(&mut self, round: RoundId) -> bool {
        match self.current.as_mut() {
            Some(current) if current.id == round && current.state == RoundState::Awaiting => {
                current.state = RoundState::Idle;
                current.selected = None;
                true
            }
            _ => false,
        }
    }
}
