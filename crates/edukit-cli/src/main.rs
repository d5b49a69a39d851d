//! edukit CLI entry point.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use uuid::Uuid;

mod commands;

#[derive(Parser)]
#[command(name = "edukit", version, about = "E-learning quiz authoring and grading toolkit")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz authoring files
    Validate {
        /// Path to a .toml quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Grade an answers file against a quiz, offline
    Grade {
        /// Path to a .toml quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to a JSON answers file (question number or id → answer)
        #[arg(long)]
        answers: PathBuf,

        /// Pass threshold in percent (default: from config, 70)
        #[arg(long)]
        threshold: Option<u8>,
    },

    /// Show attempt statistics from the persistence service
    Stats {
        /// Quiz to aggregate; omit for global statistics
        #[arg(long)]
        quiz_id: Option<Uuid>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and an example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("edukit=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Grade {
            quiz,
            answers,
            threshold,
        } => commands::grade::execute(quiz, answers, threshold),
        Commands::Stats { quiz_id, config } => commands::stats::execute(quiz_id, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
