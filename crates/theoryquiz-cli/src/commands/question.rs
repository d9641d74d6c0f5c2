//! The `theoryquiz question` command.

use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use theoryquiz_core::knowledge::KnowledgeBase;
use theoryquiz_core::question::{Question, QuestionGenerator};

pub fn execute(count: usize, seed: Option<u64>, json: bool, reveal: bool) -> Result<()> {
    anyhow::ensure!(count >= 1, "count must be at least 1");

    let knowledge = KnowledgeBase::builtin().context("invalid knowledge base")?;
    let generator = QuestionGenerator::new(Arc::new(knowledge));
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    for i in 0..count {
        let question = generator.generate_with(&mut rng);
        if json {
            println!("{}", serde_json::to_string(&question)?);
        } else {
            if i > 0 {
                println!();
            }
            print_question(&question, reveal);
        }
    }
    Ok(())
}

pub fn print_question(question: &Question, reveal: bool) {
    println!("Which theory is associated with: {}", question.term);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {option}", i + 1);
    }
    if reveal {
        println!("Answer: {}", question.correct_theory);
    }
}
