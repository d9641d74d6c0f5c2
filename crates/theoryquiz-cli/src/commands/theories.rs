//! The `theoryquiz theories` command.

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use theoryquiz_core::knowledge::KnowledgeBase;

pub fn execute() -> Result<()> {
    let knowledge = KnowledgeBase::builtin().context("invalid knowledge base")?;

    let mut table = Table::new();
    table.set_header(vec!["Theory", "Terms"]);
    for theory in knowledge.theories() {
        table.add_row(vec![Cell::new(&theory.name), Cell::new(theory.terms.join(", "))]);
    }

    println!("{table}");
    println!(
        "{} theories, {} terms",
        knowledge.len(),
        knowledge.term_count()
    );
    Ok(())
}
