//! Tagbox CLI - sidecar-based image tagging from the terminal.
//!
//! Tagbox attaches free-text and structured tags to images as sidecar
//! files, classifies free-text tags with a local text model, auto-tags
//! images with a WD tagger, and crops tagged clips out of images.
//!
//! # Usage
//!
//! ```bash
//! # Show an image's tags
//! tagbox tags show photo.jpg
//!
//! # Classify the free-text tags into character/setting/action buckets
//! tagbox sort photo.jpg
//!
//! # Auto-tag a directory with the WD tagger
//! tagbox autotag ./photos/
//!
//! # Crop a tagged clip out of an image
//! tagbox clip photo.jpg --select 120,80,400,300
//!
//! # Manage models
//! tagbox models download
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Tagbox - sidecar-based image tagging, classification, and clipping.
#[derive(Parser, Debug)]
#[command(name = "tagbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Show or edit an image's tags
    Tags(cli::tags::TagsArgs),

    /// Classify free-text tags into character/setting/action buckets
    Sort(cli::sort::SortArgs),

    /// Score images against the WD tag vocabulary
    Autotag(cli::autotag::AutotagArgs),

    /// Crop a tagged clip out of an image
    Clip(cli::clip::ClipArgs),

    /// Manage models (download, list, etc.)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI verbose override.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match tagbox_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `tagbox config path`."
            );
            tagbox_core::Config::default()
        }
    };
    logging::init(&config.logging, cli.verbose, cli.json_logs);

    tracing::debug!("tagbox v{}", tagbox_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Tags(args) => cli::tags::execute(args, config),
        Commands::Sort(args) => cli::sort::execute(args, config).await,
        Commands::Autotag(args) => cli::autotag::execute(args, config),
        Commands::Clip(args) => cli::clip::execute(args, config),
        Commands::Models(args) => cli::models::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config),
    }
}
