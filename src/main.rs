// Interview Agent - command-line entry point

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use interview_agent::commands;
use interview_agent::state::AppState;

#[derive(Parser)]
#[command(name = "interview-agent")]
#[command(version, about = "LLM-driven job interviews with scoring and anti-cheating")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an interview session and print its token
    Create {
        /// Candidate name
        #[arg(long)]
        name: String,
        /// Candidate email
        #[arg(long)]
        email: String,
        /// Candidate phone
        #[arg(long)]
        phone: Option<String>,
        /// Resume to attach (.pdf or .docx, up to 5 MB)
        #[arg(long)]
        resume: Option<PathBuf>,
    },

    /// Start a session and conduct the interview on this terminal
    Interview {
        token: String,
        /// Record that the candidate's camera is on
        #[arg(long)]
        camera: bool,
        /// Record that the candidate's microphone is on
        #[arg(long)]
        microphone: bool,
    },

    /// Log an anti-cheating event (e.g. TAB_SWITCH, CAMERA_OFF)
    Cheat {
        token: String,
        event_type: String,
        /// Event metadata as key=value, repeatable
        #[arg(long = "meta")]
        meta: Vec<String>,
    },

    /// Generate the final evaluation of a finished session
    Evaluate { token: String },

    /// Show a session in detail
    Show { token: String },

    /// List sessions, newest first
    List {
        /// Only sessions in this status (CREATED, IN_PROGRESS, COMPLETED, TERMINATED)
        #[arg(long)]
        status: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let state = AppState::initialize().context("failed to initialize interview agent")?;

    match cli.command {
        Commands::Create {
            name,
            email,
            phone,
            resume,
        } => {
            let session =
                commands::create_session(&state, &name, &email, phone, resume.as_deref()).await?;
            println!("{}", session.token);
        }
        Commands::Interview {
            token,
            camera,
            microphone,
        } => {
            let stdin = io::stdin();
            let session = commands::run_interview(
                &state,
                &token,
                camera,
                microphone,
                stdin.lock(),
                io::stdout(),
            )
            .await?;
            tracing::debug!(token = %session.token, status = %session.status, "interview command finished");
        }
        Commands::Cheat {
            token,
            event_type,
            meta,
        } => {
            let outcome = commands::log_cheating_event(&state, &token, &event_type, &meta).await?;
            println!(
                "cheating score {} ({}){}",
                outcome.cheating_score,
                outcome.status,
                if outcome.terminated_now {
                    ", interview terminated"
                } else {
                    ""
                }
            );
        }
        Commands::Evaluate { token } => {
            let session = commands::evaluate(&state, &token).await?;
            if let Some(report) = session.evaluation_report {
                println!("{}", report);
            }
        }
        Commands::Show { token } => {
            print!("{}", commands::show_session(&state, &token)?);
        }
        Commands::List { status } => {
            print!("{}", commands::list_sessions(&state, status.as_deref())?);
        }
    }

    Ok(())
}
