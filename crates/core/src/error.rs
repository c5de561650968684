//! Error taxonomy for asset acquisition.

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by acquisition and loading.
///
/// Collaborator failures (transport, host conversion) are carried as
/// opaque sources; nothing in this crate retries on the caller's behalf.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The locator has no usable filename component.
    #[error("locator {0:?} has no filename component")]
    InvalidLocator(String),

    /// A local path was given instead of a remote one, and no file exists there.
    #[error("local source {} does not exist", .0.display())]
    LocalSourceMissing(PathBuf),

    /// An existing cached file could not be removed during a refresh.
    #[error("could not remove cached file {}", path.display())]
    CannotDelete {
        /// Path of the file that resisted deletion.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The transfer itself failed (timeout, DNS, non-2xx, reset).
    #[error("download failed for {url}")]
    Download {
        /// Remote locator that was being fetched.
        url: String,
        /// Underlying transport error.
        #[source]
        source: anyhow::Error,
    },

    /// The downloaded bytes could not be placed at the resolved path.
    #[error("could not move downloaded file into place at {}", path.display())]
    Move {
        /// Intended final path.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// The host scene serializer reported failure.
    #[error("scene export was refused by the host serializer")]
    SceneExportFailed,

    /// The injected conversion step failed; passed through unchanged.
    #[error("resource conversion failed")]
    Conversion(#[source] anyhow::Error),
}
