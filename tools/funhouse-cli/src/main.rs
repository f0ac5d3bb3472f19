//! Funhouse CLI - Headless driver for the sandbox command pipeline
//!
//! # Commands
//!
//! - `funhouse chat` - Join a chat channel and log the commands it sends
//! - `funhouse demo` - Run a scripted session against an in-memory grid
//! - `funhouse config` - Show, locate or initialize the config file
//!
//! # Usage
//!
//! ```bash
//! # Watch a channel for two minutes
//! funhouse chat --channel somestreamer --duration 120
//!
//! # Draw, record, clear and replay without a window
//! funhouse demo --seconds 10
//!
//! # Write the default config.toml
//! funhouse config init
//! ```

mod chat;
mod config;
mod demo;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Funhouse CLI - Headless driver for the sandbox command pipeline
#[derive(Parser)]
#[command(name = "funhouse")]
#[command(about = "Headless driver for the Funhouse sandbox command pipeline")]
#[command(version)]
struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Join a chat channel and log incoming commands
    Chat(chat::ChatArgs),

    /// Run a scripted draw/record/replay session on an in-memory grid
    Demo(demo::DemoArgs),

    /// Inspect or create the config file
    Config(config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Chat(args) => chat::execute(args),
        Commands::Demo(args) => demo::execute(args),
        Commands::Config(args) => config::execute(args),
    }
}
