//! examguard CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod script;

#[derive(Parser)]
#[command(name = "examguard", version, about = "Proctored quiz session controller")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate quiz definition TOML files
    Validate {
        /// Path to a quiz file or directory
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Show a quiz as a student would see it (answer keys redacted)
    Preview {
        /// Path to a quiz file
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Replay a scripted session against a quiz
    Replay {
        /// Path to a quiz file
        #[arg(long)]
        quiz: PathBuf,

        /// Path to an event script TOML
        #[arg(long)]
        script: PathBuf,

        /// Student name recorded on the attempt
        #[arg(long, default_value = "Test Student")]
        student: String,

        /// Submit to an in-process sink instead of the platform API
        #[arg(long)]
        dry_run: bool,

        /// Output directory for session reports
        #[arg(long, default_value = "./examguard-results")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config, example quiz, and example script
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examguard=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Preview { quiz } => commands::preview::execute(quiz),
        Commands::Replay {
            quiz,
            script,
            student,
            dry_run,
            output,
            config,
        } => commands::replay::execute(quiz, script, student, dry_run, output, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
