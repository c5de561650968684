//! Resolution of a locator plus destination hint to a local path.

use std::path::{Path, PathBuf};

use crate::error::AcquireError;
use crate::locator::{Destination, SourceLocator};

/// Compute the canonical local path for a locator.
///
/// No I/O is performed; this is pure path arithmetic. Fails only when
/// the locator has no filename component and one is needed.
pub fn resolve_destination(
    locator: &SourceLocator,
    destination: Option<&Destination>,
    scratch_dir: &Path,
) -> Result<PathBuf, AcquireError> {
    match destination {
        Some(Destination::File(path)) => Ok(path.clone()),
        Some(Destination::Directory(dir)) => Ok(dir.join(locator.filename()?)),
        None => Ok(scratch_dir.join(locator.filename()?)),
    }
}
