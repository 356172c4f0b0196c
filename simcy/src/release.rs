//! Release naming conventions.
//!
//! This module is the single source of truth for how a published build is named:
//! - Listing filter (platform tag and archive extension)
//! - Archive filenames (e.g., `simc-905-01-win64-937b901.7z`)
//! - Local release directories and the executable path inside them
//!
//! The layout is a fixed, single-platform contract with the upstream nightly
//! builds and is deliberately not configurable.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Platform tag a listing link must contain to be a candidate.
pub const PLATFORM: &str = "win64";

/// Extension of published release archives, including the dot.
pub const ARCHIVE_EXT: &str = ".7z";

/// Name of the executable inside an extracted release.
pub const EXECUTABLE_NAME: &str = "SimulationCraft.exe";

/// Number of trailing characters the upstream scheme appends to an identifier
/// beyond the archive's inner directory name (e.g. the `-937b901` commit tag).
pub const INNER_DIR_SUFFIX_LEN: usize = 8;

/// Reasons a string cannot be used as a release identifier.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InvalidReleaseId {
    /// The identifier is empty.
    #[error("release identifier is empty")]
    Empty,

    /// The identifier contains a path separator.
    #[error("release identifier {0:?} contains a path separator")]
    PathSeparator(String),

    /// The identifier is a `.` or `..` traversal segment.
    #[error("release identifier {0:?} is a traversal segment")]
    Traversal(String),
}

/// Opaque name of a published release.
///
/// Derived from the archive filename with its extension stripped and reused as
/// the name of the local extraction directory, so it is always a single safe
/// path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReleaseId(String);

impl ReleaseId {
    /// Validate and wrap a release identifier.
    pub fn parse(name: impl Into<String>) -> Result<Self, InvalidReleaseId> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidReleaseId::Empty);
        }
        if name.contains('/') || name.contains('\\') {
            return Err(InvalidReleaseId::PathSeparator(name));
        }
        if name == "." || name == ".." {
            return Err(InvalidReleaseId::Traversal(name));
        }
        Ok(Self(name))
    }

    /// Derive the identifier from an archive link or filename.
    ///
    /// Returns `None` when the name does not end with [`ARCHIVE_EXT`] or the
    /// remaining stem is not a valid identifier.
    pub fn from_archive_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(ARCHIVE_EXT)?;
        Self::parse(stem).ok()
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Filename of the archive this release is published as.
    ///
    /// ```
    /// use simcy::release::ReleaseId;
    ///
    /// let id = ReleaseId::parse("sim-100-win64").unwrap();
    /// assert_eq!(id.archive_filename(), "sim-100-win64.7z");
    /// ```
    pub fn archive_filename(&self) -> String {
        format!("{}{}", self.0, ARCHIVE_EXT)
    }

    /// Name of the directory the archive unpacks its tree into.
    ///
    /// This is the identifier with its last [`INNER_DIR_SUFFIX_LEN`]
    /// characters removed. Returns `None` if nothing would remain.
    ///
    /// ```
    /// use simcy::release::ReleaseId;
    ///
    /// let id = ReleaseId::parse("simc-905-01-win64-937b901").unwrap();
    /// assert_eq!(id.inner_dir_name(), Some("simc-905-01-win64"));
    /// ```
    pub fn inner_dir_name(&self) -> Option<&str> {
        let count = self.0.chars().count();
        if count <= INNER_DIR_SUFFIX_LEN {
            return None;
        }
        let (cut, _) = self.0.char_indices().nth(count - INNER_DIR_SUFFIX_LEN)?;
        Some(&self.0[..cut])
    }

    /// Path of the launchable executable for this release under `root`.
    ///
    /// `<root>/<id>/<id minus suffix>/SimulationCraft.exe`
    pub fn executable_path(&self, root: &Path) -> Option<PathBuf> {
        let inner = self.inner_dir_name()?;
        Some(root.join(&self.0).join(inner).join(EXECUTABLE_NAME))
    }
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ReleaseId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Whether a listing link points at an archive for the supported platform.
pub fn is_candidate_link(href: &str) -> bool {
    href.contains(PLATFORM) && href.ends_with(ARCHIVE_EXT)
}
