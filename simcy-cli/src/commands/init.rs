//! Init command - write the configuration file.

use std::path::{Path, PathBuf};

use simcy::config::LauncherConfig;

use crate::error::CliError;

/// Write the effective configuration to `path`, or to the default location.
pub fn run(config: &LauncherConfig, path: Option<&Path>) -> Result<PathBuf, CliError> {
    let file = config.to_config_file();
    let path = match path {
        Some(path) => {
            file.save_to(path)?;
            path.to_path_buf()
        }
        None => file.save()?,
    };

    println!("Configuration file: {}", path.display());
    println!("  Storage directory: {}", config.storage_dir.display());
    println!("  Downloads URL:     {}", config.downloads_url);
    println!();
    println!("Edit this file to customize Simcy settings.");
    println!("CLI arguments override config file values when specified.");
    Ok(path)
}
