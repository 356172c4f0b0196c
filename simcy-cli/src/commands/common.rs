//! Configuration resolution shared across CLI commands.

use std::path::PathBuf;

use simcy::config::{ConfigFile, LauncherConfig};
use simcy::locator::ReqwestFetcher;

use crate::error::CliError;

/// Settings given on the command line. Anything set here wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub config: Option<PathBuf>,
    pub storage: Option<PathBuf>,
    pub downloads_url: Option<String>,
}

/// Load the configuration file and apply command-line overrides.
pub fn resolve_config(overrides: &Overrides) -> Result<LauncherConfig, CliError> {
    let file = match &overrides.config {
        Some(path) => ConfigFile::load_from(path)?,
        None => ConfigFile::load()?,
    };
    let mut config = LauncherConfig::from_config_file(&file)?;

    if let Some(dir) = &overrides.storage {
        config = config.with_storage_dir(dir.clone());
    }
    if let Some(url) = &overrides.downloads_url {
        config = config.with_downloads_url(url)?;
    }

    Ok(config)
}

/// Build the production HTTP fetcher for `config`.
pub fn fetcher(config: &LauncherConfig) -> Result<ReqwestFetcher, CliError> {
    Ok(ReqwestFetcher::with_timeout(config.timeout)?)
}
