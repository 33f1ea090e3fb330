//! Roastlens - HTTP service that roasts uploaded images.
//!
//! An uploaded photo is scored against a fixed list of candidate captions
//! with a pretrained CLIP model; the best match is folded into a localized
//! roast sentence and returned as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Download the CLIP checkpoint
//! roastlens models download
//!
//! # Start the server (PORT env var or --port override the config)
//! roastlens serve
//!
//! # View configuration
//! roastlens config show
//! ```

use clap::{Args, Parser, Subcommand};

use roastlens::{cli, logging, server};

/// Roastlens - image roast service backed by CLIP caption matching.
#[derive(Parser, Debug)]
#[command(name = "roastlens")]
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
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Manage the CLIP checkpoint (download, list, etc.)
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

/// Arguments for the `serve` command.
#[derive(Args, Debug)]
struct ServeArgs {
    /// Listening port (falls back to the configured value)
    #[arg(long, env = "PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match roastlens_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `roastlens config path`."
            );
            roastlens_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Roastlens v{}", roastlens_core::VERSION);

    match cli.command {
        Commands::Serve(args) => {
            let port = args.port.unwrap_or(config.server.port);
            server::run(config, port).await
        }
        Commands::Models(args) => cli::models::execute(args, &config).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
