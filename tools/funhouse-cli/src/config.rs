//! Config command - locate, print or create `config.toml`

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use funhouse_core::config::{self, Config};

/// Arguments for the config command
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the config file location
    Path,

    /// Print the effective configuration and any binding conflicts
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

pub fn execute(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Path => {
            let path = config::config_path().context("No config directory on this platform")?;
            println!("{}", path.display());
        }
        ConfigAction::Show => {
            let config = config::load();
            print!("{}", toml::to_string_pretty(&config)?);
            for warning in config::validate_keybindings(&config) {
                eprintln!("warning: {warning}");
            }
        }
        ConfigAction::Init { force } => {
            let path = config::config_path().context("No config directory on this platform")?;
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let path = config::save(&Config::default())?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}
