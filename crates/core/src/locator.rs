//! Source locators, destinations, and acquisition results.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::AcquireError;

/// Identifier for an asset: a remote URL or a local filesystem path.
///
/// Classification is a pure string-prefix check; no resolution is ever
/// attempted to decide whether a locator is remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocator(String);

impl SourceLocator {
    /// Wrap a raw locator string.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Whether this locator names a remote source (http/https).
    pub fn is_remote(&self) -> bool {
        self.0.starts_with("http")
    }

    /// The raw locator string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The locator interpreted as a local filesystem path.
    pub fn local_path(&self) -> &Path {
        Path::new(&self.0)
    }

    /// Last path segment of the locator, with any query or fragment
    /// stripped. Fails when the locator carries no filename, e.g.
    /// `https://host/` or a bare origin.
    pub fn filename(&self) -> Result<&str, AcquireError> {
        let trimmed = self.0.split(['?', '#']).next().unwrap_or(&self.0);
        let path_part = trimmed
            .split_once("://")
            .map_or(trimmed, |(_, rest)| rest);

        let name = match path_part.rsplit_once('/') {
            Some((_, name)) => name,
            // A bare remote origin has no path; a bare local token is
            // itself the filename.
            None if self.is_remote() => "",
            None => path_part,
        };

        if name.is_empty() {
            Err(AcquireError::InvalidLocator(self.0.clone()))
        } else {
            Ok(name)
        }
    }
}

impl fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceLocator {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for SourceLocator {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Where a fetched asset should be stored.
///
/// Callers pass `Option<Destination>`; `None` selects the configured
/// scratch directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Store under this directory, keeping the locator's filename.
    Directory(PathBuf),
    /// Store at exactly this file path.
    File(PathBuf),
}

/// Whether an existing cached file may satisfy the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Skip the transfer when the resolved path already holds a file.
    #[default]
    Reuse,
    /// Remove any existing file, then fetch unconditionally.
    Refresh,
}

/// How a returned [`LocalAsset`] came to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// Bytes were transferred from the remote source during this call.
    Fetched,
    /// A previously cached file satisfied the request; no transfer ran.
    Reused,
    /// The locator was already a local path; nothing was copied or moved.
    AlreadyLocal,
}

/// A resolved, fully written local file handed back to the caller.
///
/// The file at `path` exists and is complete; partial writes are never
/// visible here. The caller owns its further lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAsset {
    /// Canonical local location of the asset.
    pub path: PathBuf,
    /// Whether the call fetched, reused, or merely verified the file.
    pub outcome: AcquireOutcome,
}
