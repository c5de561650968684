//! Transfers bytes to a temporary file, then publishes them atomically.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use super::transport::Transport;
use crate::error::AcquireError;
use crate::locator::SourceLocator;

/// Fetches a remote locator into its resolved path.
pub struct Fetcher {
    transport: Arc<dyn Transport>,
}

impl Fetcher {
    /// Build a fetcher around the given transport.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Verify a locator that is already a local path.
    ///
    /// Distinguishes "given a local path that happens to not exist"
    /// from a network failure.
    pub fn ensure_local_source(locator: &SourceLocator) -> Result<PathBuf, AcquireError> {
        let path = locator.local_path().to_path_buf();
        if path.exists() {
            Ok(path)
        } else {
            Err(AcquireError::LocalSourceMissing(path))
        }
    }

    /// Fetch `locator` and place the bytes at `resolved`.
    ///
    /// The transfer lands in a uniquely named temporary file inside the
    /// resolved path's own directory, then a single rename publishes
    /// it. The rename stays on one volume, so an observer of `resolved`
    /// sees either no file or the complete content, never a partial
    /// write. If the future is dropped mid-transfer the temp file guard
    /// removes the partial file on the way out.
    pub async fn fetch(
        &self,
        locator: &SourceLocator,
        resolved: &Path,
    ) -> Result<PathBuf, AcquireError> {
        if !locator.is_remote() {
            return Self::ensure_local_source(locator);
        }

        let parent = match resolved.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        tokio::fs::create_dir_all(&parent)
            .await
            .map_err(|source| AcquireError::Move {
                path: resolved.to_path_buf(),
                source,
            })?;

        let tmp = tempfile::Builder::new()
            .prefix(".fetch-")
            .tempfile_in(&parent)
            .map_err(|source| AcquireError::Move {
                path: resolved.to_path_buf(),
                source,
            })?;

        let transfer = self
            .transport
            .download(locator.as_str(), tmp.path())
            .await
            .map_err(|source| AcquireError::Download {
                url: locator.as_str().to_string(),
                source,
            })?;

        match tmp.persist(resolved) {
            Ok(_) => {
                info!(
                    "downloaded {} ({} bytes, {}) to {}",
                    locator,
                    transfer.bytes,
                    transfer.content_type,
                    resolved.display()
                );
                Ok(resolved.to_path_buf())
            }
            Err(err) => {
                // Keep the complete temp file for caller cleanup; the
                // resolved path stays absent.
                let error = err.error;
                match err.file.into_temp_path().keep() {
                    Ok(kept) => warn!(
                        "leaving downloaded bytes at {} after failed rename",
                        kept.display()
                    ),
                    Err(keep_err) => warn!("could not keep temp file: {keep_err}"),
                }
                Err(AcquireError::Move {
                    path: resolved.to_path_buf(),
                    source: error,
                })
            }
        }
    }
}
