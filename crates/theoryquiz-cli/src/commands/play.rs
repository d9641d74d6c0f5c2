//! The `theoryquiz play` command.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use theoryquiz_core::feedback::{FeedbackResult, FeedbackService};
use theoryquiz_core::knowledge::KnowledgeBase;
use theoryquiz_core::prompt::FeedbackRequest;
use theoryquiz_core::question::{Question, QuestionGenerator};
use theoryquiz_core::session::QuizSession;
use theoryquiz_providers::config::load_config_from;
use theoryquiz_providers::create_provider;

use crate::commands::question::print_question;
use crate::remote::{RemoteClient, TransportError};

/// Where feedback comes from.
enum Backend {
    Local(FeedbackService),
    Remote(RemoteClient),
}

impl Backend {
    async fn feedback(&self, request: &FeedbackRequest) -> Result<FeedbackResult, TransportError> {
        match self {
            Backend::Local(service) => Ok(service.request_feedback(request).await),
            Backend::Remote(client) => client.feedback(request).await,
        }
    }
}

/// What the user typed at the prompt.
enum Input {
    Choice(String),
    Quit,
    Invalid,
}

fn parse_input(line: &str, question: &Question) -> Input {
    let line = line.trim();
    if line.eq_ignore_ascii_case("q") || line.eq_ignore_ascii_case("quit") {
        return Input::Quit;
    }
    if let Ok(n) = line.parse::<usize>() {
        return match n.checked_sub(1).and_then(|i| question.options.get(i)) {
            Some(option) => Input::Choice(option.clone()),
            None => Input::Invalid,
        };
    }
    question
        .options
        .iter()
        .find(|o| o.eq_ignore_ascii_case(line))
        .map_or(Input::Invalid, |o| Input::Choice(o.clone()))
}

async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    print!("> ");
    std::io::stdout().flush()?;
    lines.next_line().await.context("failed to read from stdin")
}

pub async fn execute(
    config_path: Option<PathBuf>,
    rounds: usize,
    seed: Option<u64>,
    server: Option<String>,
) -> Result<()> {
    anyhow::ensure!(rounds >= 1, "rounds must be at least 1");

    let config = load_config_from(config_path.as_deref())?;
    let backend = match &server {
        Some(url) => Backend::Remote(RemoteClient::new(
            url,
            Duration::from_secs(config.timeout_secs + 5),
        )?),
        None => Backend::Local(FeedbackService::new(
            create_provider(&config)?,
            config.feedback_config(),
        )),
    };

    let knowledge = KnowledgeBase::builtin().context("invalid knowledge base")?;
    let mut session = QuizSession::new(QuestionGenerator::new(Arc::new(knowledge)));
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type the number (or name) of a theory, or 'q' to quit.");

    'rounds: for round in 1..=rounds {
        let question = session.start_round_with(&mut rng).clone();
        println!("\nRound {round}/{rounds}");
        print_question(&question, false);

        loop {
            let Some(line) = read_line(&mut lines).await? else {
                break 'rounds;
            };
            let choice = match parse_input(&line, &question) {
                Input::Quit => break 'rounds,
                Input::Invalid => {
                    println!("Please pick 1-{} or type a theory name.", question.options.len());
                    continue;
                }
                Input::Choice(choice) => choice,
            };

            let pending = session.select(&choice)?;
            println!("Checking...");

            match backend.feedback(&pending.request).await {
                Ok(result) => {
                    if question.is_correct(&choice) {
                        println!("Correct!");
                    } else {
                        println!("Not quite. The answer is {}.", question.correct_theory);
                    }
                    println!("{}", result.text());
                    if let Some(detail) = result.detail() {
                        println!("(detail: {detail})");
                    }
                    session.resolve(pending.round, result);
                    break;
                }
                Err(TransportError::Rejected { status, message }) => {
                    tracing::warn!(status, %message, "feedback request rejected");
                    if message.is_empty() {
                        println!("The server rejected this answer (HTTP {status}).");
                    } else {
                        println!("The server rejected this answer: {message}");
                    }
                    println!("Pick another option or type 'q' to quit.");
                    session.release(pending.round);
                }
                Err(e) => {
                    tracing::warn!(error = %e, "feedback request failed");
                    println!("Could not reach the feedback service. Please try again.");
                    session.release(pending.round);
                }
            }
        }
    }

    println!("\nThanks for playing!");
    Ok(())
}
