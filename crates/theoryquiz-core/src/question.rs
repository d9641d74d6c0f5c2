//! Question generation.
//!
//! A question pairs a randomly chosen term with three candidate theories.
//! Sampling, forced inclusion of the correct theory, and the final shuffle
//! are separate functions so each can be exercised on its own.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::knowledge::KnowledgeBase;

/// Number of candidate theories offered per question.
pub const OPTION_COUNT: usize = 3;

/// A single quiz question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// The term the user has to place.
    pub term: String,
    /// The theory that owns `term`. Not meant to be shown before answering.
    pub correct_theory: String,
    /// Candidate theories in display order.
    pub options: Vec<String>,
}

impl Question {
    /// Whether `choice` names the correct theory.
    pub fn is_correct(&self, choice: &str) -> bool {
        self.correct_theory == choice
    }

    pub fn has_option(&self, choice: &str) -> bool {
        self.options.iter().any(|o| o == choice)
    }

    /// Index of the correct theory within `options`.
    pub fn correct_index(&self) -> Option<usize> {
        self.options.iter().position(|o| *o == self.correct_theory)
    }
}

/// Draw `count` distinct items uniformly without replacement.
///
/// Uses a partial Fisher-Yates shuffle over a copy of `items`, so the
/// returned order is itself uniformly random. Returns every item (shuffled)
/// when `count` exceeds `items.len()`.
pub fn sample_distinct<R, T>(rng: &mut R, items: &[T], count: usize) -> Vec<T>
where
    R: Rng + ?Sized,
    T: Clone,
{
    let mut pool = items.to_vec();
    let amount = count.min(pool.len());
    let (chosen, _) = pool.partial_shuffle(rng, amount);
    chosen.to_vec()
}

/// Make sure `correct` appears in `options`.
///
/// If it is already present nothing changes. Otherwise one uniformly chosen
/// slot is overwritten, which cannot create a duplicate because `correct`
/// was absent. An empty `options` gets `correct` pushed.
pub fn ensure_included<R>(rng: &mut R, options: &mut Vec<String>, correct: &str)
where
    R: Rng + ?Sized,
{
    if options.iter().any(|o| o == correct) {
        return;
    }
    if options.is_empty() {
        options.push(correct.to_string());
        return;
    }
    let slot = rng.gen_range(0..options.len());
    options[slot] = correct.to_string();
}

/// Produces questions from a shared knowledge base.
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    knowledge: Arc<KnowledgeBase>,
}

impl QuestionGenerator {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    pub fn knowledge(&self) -> &KnowledgeBase {
        &self.knowledge
    }

    /// Generate a question using the thread-local RNG.
    pub fn generate(&self) -> Question {
        self.generate_with(&mut rand::thread_rng())
    }

    /// Generate a question using the supplied RNG.
    ///
    /// Deterministic for a seeded RNG, which is what tests and the
    /// `--seed` flag rely on.
    pub fn generate_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Question {
        // A validated knowledge base always has entries.
        let entries = self.knowledge.entries();
        let entry = &entries[rng.gen_range(0..entries.len())];

        let names: Vec<String> = self
            .knowledge
            .theories()
            .iter()
            .map(|t| t.name.clone())
            .collect();

        let mut options = sample_distinct(rng, &names, OPTION_COUNT);
        ensure_included(rng, &mut options, &entry.theory);
        options.shuffle(rng);

        Question {
            term: entry.term.clone(),
            correct_theory: entry.theory.clone(),
            options,
        }
    }
}
