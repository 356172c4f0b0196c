//! Launcher configuration.
//!
//! Settings come from an INI file in the user's config directory, overridden by
//! command-line flags:
//!
//! ```text
//! [storage]
//! directory = C:\\Users\\me\\AppData\\Local\\Simcy
//!
//! [network]
//! downloads_url = http://downloads.simulationcraft.org/nightly/
//! timeout = 300
//!
//! [launch]
//! args =
//! ```
//!
//! `timeout` bounds each whole HTTP exchange, archive body included, so on a
//! slow link it must cover the full download. `0` removes the bound; only the
//! connection attempt is then limited.
//!
//! `args` is split on whitespace and has no quoting, so a single argument
//! cannot contain a space. Pass such arguments on the command line instead
//! (`simcy run -- "C:\Program Files\profile.simc"`); they replace `args`.
//!
//! [`ConfigFile`] mirrors the file; [`LauncherConfig`] is the resolved,
//! validated value built once at startup and handed to the components.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use reqwest::Url;
use thiserror::Error;

use crate::locator::DEFAULT_TIMEOUT_SECS;

/// Default nightly downloads listing page.
pub const DEFAULT_DOWNLOADS_URL: &str = "http://downloads.simulationcraft.org/nightly/";

const STORAGE_SECTION: &str = "storage";
const NETWORK_SECTION: &str = "network";
const LAUNCH_SECTION: &str = "launch";

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read or parsed.
    #[error("failed to read config file {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The config file could not be written.
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A setting has a value of the wrong form.
    #[error("invalid value {value:?} for [{section}] {key}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },

    /// The downloads URL is not a usable absolute URL.
    #[error("invalid downloads URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Path of the configuration file.
///
/// `<config dir>/simcy/config.ini`, falling back to the working directory on
/// platforms without a config directory.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("simcy")
        .join("config.ini")
}

/// Default store root: `%LOCALAPPDATA%\Simcy`, else `<temp>/simcy`.
pub fn default_storage_dir() -> PathBuf {
    match env::var_os("LOCALAPPDATA") {
        Some(app_data) => PathBuf::from(app_data).join("Simcy"),
        None => env::temp_dir().join("simcy"),
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageSettings {
    /// Store root directory.
    pub directory: PathBuf,
}

/// `[network]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkSettings {
    /// Listing page URL.
    pub downloads_url: String,
    /// HTTP timeout in seconds.
    pub timeout: u64,
}

/// `[launch]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchSettings {
    /// Arguments passed to the launched executable.
    pub args: Vec<String>,
}

/// Contents of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    pub storage: StorageSettings,
    pub network: NetworkSettings,
    pub launch: LaunchSettings,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            storage: StorageSettings {
                directory: default_storage_dir(),
            },
            network: NetworkSettings {
                downloads_url: DEFAULT_DOWNLOADS_URL.to_string(),
                timeout: DEFAULT_TIMEOUT_SECS,
            },
            launch: LaunchSettings::default(),
        }
    }
}

impl ConfigFile {
    /// Load the configuration from [`config_file_path`].
    pub fn load() -> ConfigResult<Self> {
        Self::load_from(&config_file_path())
    }

    /// Load the configuration from `path`.
    ///
    /// A missing file yields the defaults. Keys that are absent keep their
    /// default value; unknown keys are ignored.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut config = Self::default();

        if let Some(dir) = non_empty(ini.get_from(Some(STORAGE_SECTION), "directory")) {
            config.storage.directory = PathBuf::from(dir);
        }

        if let Some(url) = non_empty(ini.get_from(Some(NETWORK_SECTION), "downloads_url")) {
            config.network.downloads_url = url.to_string();
        }

        if let Some(timeout) = non_empty(ini.get_from(Some(NETWORK_SECTION), "timeout")) {
            config.network.timeout =
                timeout
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        section: NETWORK_SECTION.to_string(),
                        key: "timeout".to_string(),
                        value: timeout.to_string(),
                    })?;
        }

        if let Some(args) = ini.get_from(Some(LAUNCH_SECTION), "args") {
            config.launch.args = args.split_whitespace().map(str::to_string).collect();
        }

        Ok(config)
    }

    /// Save the configuration to [`config_file_path`].
    pub fn save(&self) -> ConfigResult<PathBuf> {
        let path = config_file_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save the configuration to `path`, creating its directory.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        let write_err = |source: std::io::Error| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some(STORAGE_SECTION))
            .set("directory", self.storage.directory.to_string_lossy());
        ini.with_section(Some(NETWORK_SECTION))
            .set("downloads_url", self.network.downloads_url.as_str())
            .set("timeout", self.network.timeout.to_string());
        ini.with_section(Some(LAUNCH_SECTION))
            .set("args", self.launch.args.join(" "));

        ini.write_to_file(path).map_err(write_err)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Parse and validate a listing page URL.
pub fn parse_downloads_url(url: &str) -> ConfigResult<Url> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: "not a hierarchical URL".to_string(),
        });
    }

    Ok(parsed)
}

/// Resolved launcher configuration.
///
/// Built once at startup and passed by reference; nothing changes it during a
/// run.
#[derive(Debug, Clone)]
pub struct LauncherConfig {
    /// Store root directory.
    pub storage_dir: PathBuf,
    /// Listing page URL.
    pub downloads_url: Url,
    /// HTTP timeout.
    pub timeout: Duration,
    /// Arguments passed to the launched executable.
    pub launch_args: Vec<String>,
}

impl LauncherConfig {
    /// Validate the settings of a configuration file.
    pub fn from_config_file(file: &ConfigFile) -> ConfigResult<Self> {
        Ok(Self {
            storage_dir: file.storage.directory.clone(),
            downloads_url: parse_downloads_url(&file.network.downloads_url)?,
            timeout: Duration::from_secs(file.network.timeout),
            launch_args: file.launch.args.clone(),
        })
    }

    /// Override the store root.
    pub fn with_storage_dir(mut self, dir: PathBuf) -> Self {
        self.storage_dir = dir;
        self
    }

    /// Override the listing page URL.
    pub fn with_downloads_url(mut self, url: &str) -> ConfigResult<Self> {
        self.downloads_url = parse_downloads_url(url)?;
        Ok(self)
    }

    /// Override the launch arguments.
    pub fn with_launch_args(mut self, args: Vec<String>) -> Self {
        self.launch_args = args;
        self
    }

    /// Convert back into file form, e.g. to persist effective settings.
    pub fn to_config_file(&self) -> ConfigFile {
        ConfigFile {
            storage: StorageSettings {
                directory: self.storage_dir.clone(),
            },
            network: NetworkSettings {
                downloads_url: self.downloads_url.to_string(),
                timeout: self.timeout.as_secs(),
            },
            launch: LaunchSettings {
                args: self.launch_args.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.network.downloads_url, DEFAULT_DOWNLOADS_URL);
        assert_eq!(config.network.timeout, DEFAULT_TIMEOUT_SECS);
        assert!(config.launch.args.is_empty());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[storage]\ndirectory = /srv/simcy\n\n[network]\ntimeout = 60\nunknown = 1\n\n[launch]\nargs = --foo  bar\n",
        )
        .unwrap();

        let config = ConfigFile::load_from(&path).unwrap();

        assert_eq!(config.storage.directory, PathBuf::from("/srv/simcy"));
        assert_eq!(config.network.timeout, 60);
        assert_eq!(config.network.downloads_url, DEFAULT_DOWNLOADS_URL);
        assert_eq!(config.launch.args, vec!["--foo", "bar"]);
    }

    #[test]
    fn test_launch_args_split_on_whitespace_and_zero_timeout() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(
            &path,
            "[network]\ntimeout = 0\n\n[launch]\nargs = iterations=1000  html=report.html\n",
        )
        .unwrap();

        let file = ConfigFile::load_from(&path).unwrap();
        let config = LauncherConfig::from_config_file(&file).unwrap();

        assert!(config.timeout.is_zero());
        assert_eq!(
            config.launch_args,
            vec!["iterations=1000".to_string(), "html=report.html".to_string()]
        );
    }

    #[test]
    fn test_load_invalid_timeout() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.ini");
        fs::write(&path, "[network]\ntimeout = soon\n").unwrap();

        let err = ConfigFile::load_from(&path).unwrap_err();

        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_load_reads_default_path() {
        let expected = ConfigFile::load_from(&config_file_path()).unwrap_or_default();
        assert_eq!(ConfigFile::load().unwrap_or_default(), expected);
    }

    #[test]
    fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");
        let mut config = ConfigFile::default();
        config.storage.directory = PathBuf::from("/srv/simcy");
        config.network.downloads_url = "http://mirror.example.com/nightly/".to_string();
        config.launch.args = vec!["--foo".to_string()];

        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_parse_downloads_url() {
        assert!(parse_downloads_url(DEFAULT_DOWNLOADS_URL).is_ok());
        assert!(matches!(
            parse_downloads_url("downloads/nightly"),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            parse_downloads_url("mailto:builds@example.com"),
            Err(ConfigError::InvalidUrl { .. })
        ));
    }

    #[test]
    fn test_launcher_config_overrides() {
        let config = LauncherConfig::from_config_file(&ConfigFile::default())
            .unwrap()
            .with_storage_dir(PathBuf::from("/custom/store"))
            .with_downloads_url("http://mirror.example.com/nightly/")
            .unwrap()
            .with_launch_args(vec!["--foo".to_string()]);

        assert_eq!(config.storage_dir, PathBuf::from("/custom/store"));
        assert_eq!(
            config.downloads_url.as_str(),
            "http://mirror.example.com/nightly/"
        );
        assert_eq!(config.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(config.to_config_file().launch.args, vec!["--foo"]);
    }

    #[test]
    fn test_launcher_config_rejects_bad_url() {
        let mut file = ConfigFile::default();
        file.network.downloads_url = "not a url".to_string();

        assert!(LauncherConfig::from_config_file(&file).is_err());
    }
}
