//! Atelier CLI
//!
//! Project scaffolding and data management for reproducible
//! data-analysis projects.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "atelier")]
#[command(author, version, about = "Atelier - reproducible data-analysis projects", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Project root (defaults to the current directory)
    #[arg(long, global = true)]
    root: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project
    Init {
        /// Project directory name ("." for the current directory)
        #[arg(default_value = ".")]
        name: String,
    },

    /// Show project status
    Status {
        /// Suppress output, exit code only (used by the pre-commit hook)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Inspect and migrate project settings
    Settings {
        #[command(subcommand)]
        command: commands::settings::SettingsCommand,
    },

    /// Manage the project .env file
    Env {
        #[command(subcommand)]
        command: commands::env::EnvCommand,
    },

    /// Manage git hooks
    Hooks {
        #[command(subcommand)]
        command: commands::hooks::HooksCommand,
    },

    /// Manage the cache store
    Cache {
        #[command(subcommand)]
        command: commands::cache::CacheCommand,
    },

    /// Manage the result store
    Results {
        #[command(subcommand)]
        command: commands::results::ResultsCommand,
    },

    /// Manage the data provenance registry
    Data {
        #[command(subcommand)]
        command: commands::data::DataCommand,
    },

    /// Validate configured database connections
    Connections,

    /// Serve the local settings GUI
    Serve {
        /// Port on 127.0.0.1
        #[arg(short, long, default_value_t = 8787)]
        port: u16,

        /// Directory of prebuilt GUI assets
        #[arg(long)]
        assets: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { name } => commands::init::run(&root, &name).await,
        Commands::Status { quiet } => commands::status::run(&root, quiet).await,
        Commands::Settings { command } => commands::settings::run(&root, command).await,
        Commands::Env { command } => commands::env::run(&root, command),
        Commands::Hooks { command } => commands::hooks::run(&root, command),
        Commands::Cache { command } => commands::cache::run(&root, command).await,
        Commands::Results { command } => commands::results::run(&root, command).await,
        Commands::Data { command } => commands::data::run(&root, command).await,
        Commands::Connections => commands::connections::run(&root),
        Commands::Serve { port, assets } => commands::serve::run(&root, port, assets).await,
    }
}
