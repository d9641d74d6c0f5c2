//! The `theoryquiz` binary: terminal play, question printing and the HTTP server.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod remote;

#[derive(Parser)]
#[command(
    name = "theoryquiz",
    version,
    about = "Vocabulary quiz for psychological and therapeutic theories"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP feedback server
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Address to listen on (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Print generated questions
    Question {
        /// Number of questions to generate
        #[arg(long, default_value = "1")]
        count: usize,

        /// Seed for reproducible questions
        #[arg(long)]
        seed: Option<u64>,

        /// Emit one JSON object per line
        #[arg(long)]
        json: bool,

        /// Show the correct theory under each question
        #[arg(long)]
        reveal: bool,
    },

    /// Play interactive rounds in the terminal
    Play {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of rounds
        #[arg(long, default_value = "5")]
        rounds: usize,

        /// Seed for reproducible questions
        #[arg(long)]
        seed: Option<u64>,

        /// Get feedback from a running theoryquiz server instead of calling
        /// the provider directly (e.g. "http://127.0.0.1:3000")
        #[arg(long)]
        server: Option<String>,
    },

    /// List the theories and their terms
    Theories,

    /// Create a starter config file
    Init,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("theoryquiz={default_level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Interactive commands keep stderr quiet unless RUST_LOG says otherwise.
    init_tracing(match cli.command {
        Commands::Serve { .. } => "info",
        _ => "warn",
    });

    let result = match cli.command {
        Commands::Serve { config, bind } => commands::serve::execute(config, bind).await,
        Commands::Question {
            count,
            seed,
            json,
            reveal,
        } => commands::question::execute(count, seed, json, reveal),
        Commands::Play {
            config,
            rounds,
            seed,
            server,
        } => commands::play::execute(config, rounds, seed, server).await,
        Commands::Theories => commands::theories::execute(),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
