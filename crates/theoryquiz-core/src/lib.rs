//! theoryquiz-core: knowledge base, question generation, and feedback.
//!
//! This crate holds everything a front end needs to run a round: building
//! a fair multiple-choice question, turning the user's answer into a prompt,
//! and asking a text-generation provider for an explanation.

pub mod error;
pub mod feedback;
pub mod knowledge;
pub mod prompt;
pub mod question;
pub mod session;
pub mod traits;

pub use error::{ProviderError, QuizError, SessionError};
pub use feedback::{FeedbackConfig, FeedbackResult, FeedbackService, FALLBACK_MESSAGE};
pub use knowledge::{KnowledgeBase, TermEntry, Theory};
pub use prompt::{build_prompt, FeedbackRequest};
pub use question::{Question, QuestionGenerator, OPTION_COUNT};
pub use session::{PendingFeedback, QuizSession, RoundId};
