//! Check command - report whether the local store holds the newest release.

use simcy::config::LauncherConfig;
use simcy::locator::{LocatorResult, ReleaseLocator};
use simcy::release::ReleaseId;
use simcy::store::{CommandStarter, ReleaseStore, SevenZipExtractor};
use simcy::traits::{ReleaseSource, ReleaseStorage};

use super::common::fetcher;
use crate::error::CliError;

/// Result of comparing the published and installed releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckStatus {
    pub latest: ReleaseId,
    pub installed: bool,
}

/// Look up the newest release and whether `storage` already has it.
pub fn check<S, T>(source: &S, storage: &T) -> LocatorResult<CheckStatus>
where
    S: ReleaseSource + ?Sized,
    T: ReleaseStorage + ?Sized,
{
    let latest = source.last_release()?;
    let installed = storage.has_release(&latest);
    Ok(CheckStatus { latest, installed })
}

/// Run the check command.
pub fn run(config: &LauncherConfig) -> Result<(), CliError> {
    let locator = ReleaseLocator::new(fetcher(config)?, config.downloads_url.clone());
    let store = ReleaseStore::new(
        config.storage_dir.clone(),
        SevenZipExtractor::new(),
        CommandStarter::new(),
    );

    let status = check(&locator, &store)?;

    println!("Listing page:      {}", locator.base_url());
    println!("Storage directory: {}", config.storage_dir.display());
    println!("Latest release:    {}", status.latest);
    if status.installed {
        println!("Up to date.");
    } else {
        println!("Not installed. Run `simcy run` to download it.");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::{Path, PathBuf};

    use simcy::locator::LocatorError;
    use tempfile::TempDir;

    struct FixedSource(Option<&'static str>);

    impl ReleaseSource for FixedSource {
        fn last_release(&self) -> LocatorResult<ReleaseId> {
            match self.0 {
                Some(name) => Ok(ReleaseId::parse(name).unwrap()),
                None => Err(LocatorError::NoReleaseFound {
                    url: "http://example.com/".to_string(),
                }),
            }
        }

        fn download_release(&self, _release: &ReleaseId, _dest: &Path) -> LocatorResult<PathBuf> {
            unreachable!("check never downloads")
        }
    }

    fn store(root: &Path) -> ReleaseStore<SevenZipExtractor, CommandStarter> {
        ReleaseStore::new(root, SevenZipExtractor::new(), CommandStarter::new())
    }

    #[test]
    fn test_check_installed() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sim-100-win64")).unwrap();

        let status = check(&FixedSource(Some("sim-100-win64")), &store(temp.path())).unwrap();

        assert_eq!(status.latest.as_str(), "sim-100-win64");
        assert!(status.installed);
    }

    #[test]
    fn test_check_outdated() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join("sim-099-win64")).unwrap();

        let status = check(&FixedSource(Some("sim-100-win64")), &store(temp.path())).unwrap();

        assert!(!status.installed);
    }

    #[test]
    fn test_check_discovery_failure() {
        let temp = TempDir::new().unwrap();

        let err = check(&FixedSource(None), &store(temp.path())).unwrap_err();

        assert!(matches!(err, LocatorError::NoReleaseFound { .. }));
    }
}
