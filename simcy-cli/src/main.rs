//! Simcy CLI - keeps a local SimulationCraft nightly build current and launches it.
//!
//! Running `simcy` with no subcommand is the same as `simcy run`.

mod commands;
mod error;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use simcy::logging::init_logging;
use simcy::updater::{EXIT_FAILURE, EXIT_SUCCESS};
use tracing::error;

use commands::common::{resolve_config, Overrides};
use error::CliError;

#[derive(Debug, Parser)]
#[command(name = "simcy", version, about, long_about = None)]
struct Cli {
    /// Store root directory (overrides [storage] directory)
    #[arg(long, global = true, value_name = "DIR")]
    storage: Option<PathBuf>,

    /// Listing page to discover releases on (overrides [network] downloads_url)
    #[arg(long, global = true, value_name = "URL")]
    downloads_url: Option<String>,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Also write logs to this file
    #[arg(long, global = true, value_name = "FILE")]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Install the newest release if needed and launch it (default)
    Run {
        /// Arguments passed to the launched executable
        #[arg(last = true)]
        args: Vec<String>,
    },

    /// Report whether the newest release is installed
    Check,

    /// Write the configuration file with the effective settings
    Init,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            config: self.config.clone(),
            storage: self.storage.clone(),
            downloads_url: self.downloads_url.clone(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_logging(cli.verbose, cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_FAILURE);
        }
    };

    match dispatch(cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            error!("{}", e);
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn dispatch(cli: Cli) -> Result<u8, CliError> {
    let overrides = cli.overrides();
    let config = resolve_config(&overrides)?;

    match cli.command.unwrap_or(Commands::Run { args: Vec::new() }) {
        Commands::Run { args } => commands::run::run(&config, args),
        Commands::Check => commands::check::run(&config).map(|()| EXIT_SUCCESS),
        Commands::Init => {
            commands::init::run(&config, overrides.config.as_deref()).map(|_| EXIT_SUCCESS)
        }
    }
}
