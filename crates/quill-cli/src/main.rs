//! Quill CLI
//!
//! Command-line interface for Quill: render app routes headlessly and
//! manage notes in the persisted store.

use std::fs::File;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::task::LocalSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quill_core::{Config, NoteStore};

mod commands;
mod output;
mod prompt;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill - Local-first notes")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a route and print the resulting HTML
    Render {
        /// Path to render, e.g. / or /notes/new
        #[arg(default_value = "/")]
        path: String,
    },
    /// List all notes, most recently modified first
    #[command(alias = "ls")]
    List,
    /// Show a note
    Show {
        /// Note ID
        id: String,
    },
    /// Create a note
    #[command(alias = "add")]
    Create {
        /// Note title
        #[arg(short = 'T', long, default_value = "")]
        title: String,
        /// Note content
        #[arg(short, long, default_value = "")]
        content: String,
        /// Badge color classes
        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID
        id: String,
    },
    /// Search notes by title or content
    Search {
        /// Search query
        query: String,
    },
    /// Show configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that don't need the store
    if let Commands::Config { command } = &cli.command {
        return match command {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
        };
    }

    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config);

    let store = NoteStore::open(&config).context("Failed to open note store")?;

    // Views and the router spawn local tasks
    LocalSet::new()
        .run_until(run(cli.command, config, store, &output))
        .await
}

async fn run(command: Commands, config: Config, store: NoteStore, output: &Output) -> Result<()> {
    match command {
        Commands::Render { path } => commands::render::render(&path, &config, store, output).await,
        Commands::List => commands::notes::list(&store, output).await,
        Commands::Show { id } => commands::notes::show(&store, &id, output).await,
        Commands::Create {
            title,
            content,
            color,
        } => commands::notes::create(&store, title, content, color, output).await,
        Commands::Delete { id } => commands::notes::delete(&store, &id, output).await,
        Commands::Search { query } => commands::notes::search(&store, &query, output).await,
        Commands::Config { .. } => unreachable!(), // Handled in main
    }
}

/// File-based logging, only when QUILL_LOG is set
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("QUILL_LOG") else {
        return;
    };

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "quill_core={level},quill_ui={level},quill_cli={level}",
        level = log_level
    ));

    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}
