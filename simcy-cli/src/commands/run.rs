//! Run command - bring the store up to date and launch the newest release.

use simcy::config::LauncherConfig;
use simcy::locator::ReleaseLocator;
use simcy::store::{prepare_root, CommandStarter, ReleaseStore, SevenZipExtractor};
use simcy::updater::{exit_code, Updater};
use tracing::warn;

use super::common::fetcher;
use crate::error::CliError;

/// Run the update-and-launch pipeline, returning the process exit status.
///
/// Errors are returned only for setup failures; pipeline failures are logged
/// by the updater and mapped to an exit status.
pub fn run(config: &LauncherConfig, args: Vec<String>) -> Result<u8, CliError> {
    prepare_root(&config.storage_dir)?;

    let locator = ReleaseLocator::new(fetcher(config)?, config.downloads_url.clone());

    let extractor = SevenZipExtractor::new();
    if let Err(e) = extractor.check_available() {
        warn!(error = %e, "Archive tool not available, installing a release will fail");
    }

    let launch_args = if args.is_empty() {
        config.launch_args.clone()
    } else {
        args
    };
    let store = ReleaseStore::new(config.storage_dir.clone(), extractor, CommandStarter::new())
        .with_launch_args(launch_args);

    let outcome = Updater::new(&locator, &store).run();
    Ok(exit_code(&outcome))
}
