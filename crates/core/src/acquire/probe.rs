//! Decides whether an existing cached file may be reused.

use std::path::Path;

use tracing::debug;

use crate::error::AcquireError;
use crate::locator::CachePolicy;

/// Outcome of probing a resolved path against the cache policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// No file exists at the resolved path.
    Fresh,
    /// A usable file exists; skip the transfer.
    Reuse,
    /// A stale file existed and has been deleted; fetch unconditionally.
    Replace,
}

/// Probe the resolved path and apply the cache policy.
///
/// On `Replace` the existing file is deleted before returning, so the
/// delete-then-fetch ordering holds even when the transfer later fails.
/// A failed deletion aborts the whole operation with `CannotDelete`.
pub async fn decide(resolved: &Path, policy: CachePolicy) -> Result<CacheDecision, AcquireError> {
    if !resolved.exists() {
        return Ok(CacheDecision::Fresh);
    }

    match policy {
        CachePolicy::Reuse => Ok(CacheDecision::Reuse),
        CachePolicy::Refresh => {
            debug!("removing stale cached file {}", resolved.display());
            tokio::fs::remove_file(resolved)
                .await
                .map_err(|source| AcquireError::CannotDelete {
                    path: resolved.to_path_buf(),
                    source,
                })?;
            Ok(CacheDecision::Replace)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn absent_file_is_fresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.png");
        for policy in [CachePolicy::Reuse, CachePolicy::Refresh] {
            assert_eq!(decide(&path, policy).await.unwrap(), CacheDecision::Fresh);
        }
    }

    #[tokio::test]
    async fn existing_file_is_reused_under_reuse_policy() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.png");
        std::fs::write(&path, b"cached").unwrap();

        assert_eq!(
            decide(&path, CachePolicy::Reuse).await.unwrap(),
            CacheDecision::Reuse
        );
        assert_eq!(std::fs::read(&path).unwrap(), b"cached");
    }

    #[tokio::test]
    async fn refresh_deletes_before_returning_replace() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.png");
        std::fs::write(&path, b"stale").unwrap();

        assert_eq!(
            decide(&path, CachePolicy::Refresh).await.unwrap(),
            CacheDecision::Replace
        );
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn undeletable_file_aborts_with_cannot_delete() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        std::fs::create_dir(&locked).unwrap();
        let path = locked.join("x.png");
        std::fs::write(&path, b"stale").unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o555)).unwrap();

        let result = decide(&path, CachePolicy::Refresh).await;
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        assert!(matches!(result, Err(AcquireError::CannotDelete { .. })));
        assert!(path.exists());
    }
}
