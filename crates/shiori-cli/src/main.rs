//! Terminal player and tools for Shiori stories.

mod commands;
mod render;
mod story;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "shiori",
    about = "Shiori: play and check interactive fiction scripts",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a story in the terminal
    Play {
        /// Story file (JSON)
        story: PathBuf,

        /// Directory for save slots and preferences
        #[arg(short, long, default_value = "saves")]
        saves: PathBuf,

        /// Start at this label instead of the configured one
        #[arg(short, long)]
        label: Option<String>,

        /// Script language, for multi-language stories
        #[arg(long)]
        language: Option<String>,

        /// Start with autoplay on, advancing every SECS seconds
        #[arg(long, value_name = "SECS")]
        auto: Option<u32>,
    },

    /// Validate a story: labels, jump targets and particle presets
    Check {
        /// Story file (JSON)
        story: PathBuf,
    },

    /// List save slots
    Saves {
        /// Directory holding the save slots
        #[arg(short, long, default_value = "saves")]
        saves: PathBuf,

        /// List auto-save slots instead of manual ones
        #[arg(long)]
        auto: bool,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("SHIORI_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            story,
            saves,
            label,
            language,
            auto,
        } => commands::play::run(
            &story,
            &saves,
            commands::play::Options {
                label,
                language,
                auto,
            },
        ),
        Commands::Check { story } => commands::check::run(&story),
        Commands::Saves { saves, auto } => commands::saves::run(&saves, auto),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
