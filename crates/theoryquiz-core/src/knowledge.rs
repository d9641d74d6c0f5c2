//! The theory knowledge base.
//!
//! A knowledge base maps each theory name to the hallmark terms a student
//! should associate with it. It is validated once when built and never
//! mutated afterwards, so it can be shared behind an `Arc` without locking.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::QuizError;
use crate::prompt::FeedbackRequest;
use crate::question::OPTION_COUNT;

/// Built-in theories and their hallmark terms.
pub static BUILTIN_THEORIES: &[(&str, &[&str])] = &[
    (
        "Cognitive Behavioral Therapy (CBT)",
        &["cognitive distortions", "schemas", "Aaron Beck", "thought records"],
    ),
    (
        "Attachment Theory",
        &["secure base", "John Bowlby", "Strange Situation", "Mary Ainsworth"],
    ),
    (
        "Family Systems Theory",
        &["triangulation", "Murray Bowen", "genograms", "differentiation of self"],
    ),
    (
        "Psychoanalytic Theory",
        &["Oedipus complex", "Freud", "defense mechanisms", "free association"],
    ),
    (
        "Person-Centered Therapy",
        &["Carl Rogers", "unconditional positive regard", "congruence", "empathic understanding"],
    ),
    (
        "Behaviorism",
        &["operant conditioning", "B. F. Skinner", "classical conditioning", "reinforcement schedules"],
    ),
    (
        "Gestalt Therapy",
        &["Fritz Perls", "empty chair technique", "here and now"],
    ),
    (
        "Dialectical Behavior Therapy (DBT)",
        &["Marsha Linehan", "distress tolerance", "wise mind", "radical acceptance"],
    ),
    (
        "Solution-Focused Brief Therapy",
        &["miracle question", "scaling questions", "Steve de Shazer", "exception finding"],
    ),
    (
        "Narrative Therapy",
        &["externalizing the problem", "Michael White", "re-authoring", "unique outcomes"],
    ),
    (
        "Existential Therapy",
        &["Viktor Frankl", "logotherapy", "Irvin Yalom", "meaning-making"],
    ),
    (
        "Structural Family Therapy",
        &["Salvador Minuchin", "enmeshment", "family mapping", "joining"],
    ),
    (
        "Acceptance and Commitment Therapy (ACT)",
        &["cognitive defusion", "Steven Hayes", "psychological flexibility", "committed action"],
    ),
    (
        "Motivational Interviewing",
        &["change talk", "rolling with resistance", "William Miller", "decisional balance"],
    ),
    (
        "Individual Psychology",
        &["Alfred Adler", "inferiority complex", "birth order", "social interest"],
    ),
];

/// A named theory and the terms that belong to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theory {
    pub name: String,
    pub terms: Vec<String>,
}

impl Theory {
    pub fn new<N, I, T>(name: N, terms: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            name: name.into(),
            terms: terms.into_iter().map(Into::into).collect(),
        }
    }
}

/// A single (term, owning theory) pair from the flattened knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TermEntry {
    pub term: String,
    pub theory: String,
}

/// Immutable, validated collection of theories.
#[derive(Debug, Clone)]
pub struct KnowledgeBase {
    theories: Vec<Theory>,
    entries: Vec<TermEntry>,
}

impl KnowledgeBase {
    /// Validate and build a knowledge base.
    ///
    /// # Errors
    /// * [`QuizError::TooFewTheories`] if there are fewer theories than
    ///   options per question.
    /// * [`QuizError::BlankTheoryName`], [`QuizError::DuplicateTheory`],
    ///   [`QuizError::EmptyTheory`] or [`QuizError::BlankTerm`] for
    ///   malformed theories.
    pub fn new(theories: Vec<Theory>) -> Result<Self, QuizError> {
        if theories.len() < OPTION_COUNT {
            return Err(QuizError::TooFewTheories {
                required: OPTION_COUNT,
                found: theories.len(),
            });
        }

        let mut seen = HashSet::new();
        for theory in &theories {
            if theory.name.trim().is_empty() {
                return Err(QuizError::BlankTheoryName);
            }
            if !seen.insert(theory.name.as_str()) {
                return Err(QuizError::DuplicateTheory(theory.name.clone()));
            }
            if theory.terms.is_empty() {
                return Err(QuizError::EmptyTheory(theory.name.clone()));
            }
            if theory.terms.iter().any(|t| t.trim().is_empty()) {
                return Err(QuizError::BlankTerm(theory.name.clone()));
            }
        }

        let entries = flatten_theories(&theories);
        Ok(Self { theories, entries })
    }

    /// Build the knowledge base shipped with the binary.
    pub fn builtin() -> Result<Self, QuizError> {
        Self::new(
            BUILTIN_THEORIES
                .iter()
                .map(|(name, terms)| Theory::new(*name, terms.iter().copied()))
                .collect(),
        )
    }

    pub fn theories(&self) -> &[Theory] {
        &self.theories
    }

    /// The cached flattened view, one entry per (theory, term) pair.
    pub fn entries(&self) -> &[TermEntry] {
        &self.entries
    }

    /// Recompute the flattened view from the theories.
    pub fn flatten(&self) -> Vec<TermEntry> {
        flatten_theories(&self.theories)
    }

    pub fn theory_names(&self) -> Vec<&str> {
        self.theories.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn theory(&self, name: &str) -> Option<&Theory> {
        self.theories.iter().find(|t| t.name == name)
    }

    pub fn contains_theory(&self, name: &str) -> bool {
        self.theory(name).is_some()
    }

    /// Whether `theory` lists `term` among its terms.
    pub fn owns_term(&self, theory: &str, term: &str) -> bool {
        self.theory(theory)
            .is_some_and(|t| t.terms.iter().any(|candidate| candidate == term))
    }

    /// Number of theories.
    pub fn len(&self) -> usize {
        self.theories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.theories.is_empty()
    }

    /// Number of (theory, term) pairs.
    pub fn term_count(&self) -> usize {
        self.entries.len()
    }

    /// Check a feedback request against this knowledge base.
    ///
    /// Runs [`FeedbackRequest::validate`] first, then rejects theories that
    /// do not exist and terms the claimed correct theory does not own.
    pub fn check_request(&self, request: &FeedbackRequest) -> Result<(), QuizError> {
        request.validate()?;

        for name in [&request.selected_theory, &request.correct_theory] {
            if !self.contains_theory(name) {
                return Err(QuizError::UnknownTheory(name.clone()));
            }
        }

        if !self.owns_term(&request.correct_theory, &request.term) {
            return Err(QuizError::TermNotInTheory {
                term: request.term.clone(),
                theory: request.correct_theory.clone(),
            });
        }

        Ok(())
    }
}

fn flatten_theories(theories: &[Theory]) -> Vec<TermEntry> {
    theories
        .iter()
        .flat_map(|theory| {
            theory.terms.iter().map(move |term| TermEntry {
                term: term.clone(),
                theory: theory.name.clone(),
            })
        })
        .collect()
}
