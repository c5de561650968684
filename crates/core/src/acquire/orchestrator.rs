//! The single public "ensure local file" operation.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use super::fetcher::Fetcher;
use super::path::resolve_destination;
use super::probe::{self, CacheDecision};
use super::transport::{HttpTransport, Transport};
use crate::config::AppConfig;
use crate::error::AcquireError;
use crate::locator::{AcquireOutcome, CachePolicy, Destination, LocalAsset, SourceLocator};

/// Orchestrates path resolution, cache probing, and fetching.
///
/// Each call is a single attempt with no internal retries; layering a
/// retry policy around [`AssetAcquirer::ensure_local`] is the caller's
/// choice. Concurrent calls for the same locator are not deduplicated:
/// both may fetch, and the last atomic rename wins with identical
/// bytes, so the only cost is bandwidth.
pub struct AssetAcquirer {
    config: AppConfig,
    fetcher: Fetcher,
}

impl AssetAcquirer {
    /// Build an acquirer with the production HTTP transport.
    pub fn new(config: AppConfig) -> Result<Self> {
        let transport = HttpTransport::new(Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build an acquirer around an injected transport.
    pub fn with_transport(config: AppConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            fetcher: Fetcher::new(transport),
            config,
        }
    }

    /// Directory used for downloads without an explicit destination.
    pub fn scratch_dir(&self) -> &Path {
        &self.config.scratch_dir
    }

    /// Guarantee that the asset named by `locator` exists as a complete
    /// local file, fetching it if the cache policy requires.
    ///
    /// Local locators bypass the cache entirely: the path is verified
    /// and returned as-is, or `LocalSourceMissing` is raised, whatever
    /// the policy says.
    pub async fn ensure_local(
        &self,
        locator: impl Into<SourceLocator>,
        destination: Option<Destination>,
        policy: CachePolicy,
    ) -> Result<LocalAsset, AcquireError> {
        let locator = locator.into();

        if !locator.is_remote() {
            debug!("locator {} is already local", locator);
            let path = Fetcher::ensure_local_source(&locator)?;
            return Ok(LocalAsset {
                path,
                outcome: AcquireOutcome::AlreadyLocal,
            });
        }

        let resolved =
            resolve_destination(&locator, destination.as_ref(), &self.config.scratch_dir)?;

        match probe::decide(&resolved, policy).await? {
            CacheDecision::Reuse => {
                debug!("reusing cached file at {}", resolved.display());
                Ok(LocalAsset {
                    path: resolved,
                    outcome: AcquireOutcome::Reused,
                })
            }
            CacheDecision::Fresh | CacheDecision::Replace => {
                let path = self.fetcher.fetch(&locator, &resolved).await?;
                Ok(LocalAsset {
                    path,
                    outcome: AcquireOutcome::Fetched,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::tempdir;

    use crate::acquire::transport::TransferInfo;

    /// Scripted transport: counts calls, writes a payload or fails
    /// partway through the write.
    struct RecordingTransport {
        calls: AtomicUsize,
        payload: Vec<u8>,
        fail: bool,
    }

    impl RecordingTransport {
        fn serving(payload: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                payload: payload.to_vec(),
                fail: false,
            })
        }

        fn failing_midway(payload: &[u8]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                payload: payload.to_vec(),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn download(&self, _url: &str, into: &Path) -> Result<TransferInfo> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                let half = self.payload.len() / 2;
                tokio::fs::write(into, &self.payload[..half]).await?;
                anyhow::bail!("connection reset mid-transfer");
            }
            tokio::fs::write(into, &self.payload).await?;
            Ok(TransferInfo {
                bytes: self.payload.len() as u64,
                content_type: "application/octet-stream".to_string(),
            })
        }
    }

    fn acquirer(scratch: &Path, transport: Arc<RecordingTransport>) -> AssetAcquirer {
        let config = AppConfig {
            scratch_dir: scratch.to_path_buf(),
            request_timeout_secs: 5,
        };
        AssetAcquirer::with_transport(config, transport)
    }

    #[tokio::test]
    async fn local_locator_returns_existing_path_under_any_policy() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("local.usdz");
        std::fs::write(&file, b"bytes").unwrap();
        let transport = RecordingTransport::serving(b"unused");
        let acquirer = acquirer(dir.path(), transport.clone());

        for policy in [CachePolicy::Reuse, CachePolicy::Refresh] {
            let asset = acquirer
                .ensure_local(file.to_string_lossy().as_ref(), None, policy)
                .await
                .unwrap();
            assert_eq!(asset.path, file);
            assert_eq!(asset.outcome, AcquireOutcome::AlreadyLocal);
        }
        assert_eq!(transport.calls(), 0);
        assert_eq!(std::fs::read(&file).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn missing_local_locator_fails_without_transfer() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.usdz");
        let transport = RecordingTransport::serving(b"unused");
        let acquirer = acquirer(dir.path(), transport.clone());

        let result = acquirer
            .ensure_local(missing.to_string_lossy().as_ref(), None, CachePolicy::Reuse)
            .await;

        assert!(matches!(result, Err(AcquireError::LocalSourceMissing(_))));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn fresh_remote_fetches_into_scratch_dir() {
        let dir = tempdir().unwrap();
        let transport = RecordingTransport::serving(b"png bytes");
        let acquirer = acquirer(dir.path(), transport.clone());

        let asset = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Reuse)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(asset.path, dir.path().join("x.png"));
        assert_eq!(asset.outcome, AcquireOutcome::Fetched);
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn second_call_reuses_without_transfer() {
        let dir = tempdir().unwrap();
        let transport = RecordingTransport::serving(b"png bytes");
        let acquirer = acquirer(dir.path(), transport.clone());

        let first = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Reuse)
            .await
            .unwrap();
        let second = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Reuse)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(first.path, second.path);
        assert_eq!(second.outcome, AcquireOutcome::Reused);
    }

    #[tokio::test]
    async fn cache_hit_preserves_prior_content() {
        let dir = tempdir().unwrap();
        let cached = dir.path().join("x.png");
        std::fs::write(&cached, b"old content").unwrap();
        // The transport would serve different bytes, but must not run.
        let transport = RecordingTransport::serving(b"new content");
        let acquirer = acquirer(dir.path(), transport.clone());

        let asset = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Reuse)
            .await
            .unwrap();

        assert_eq!(transport.calls(), 0);
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"old content");
        assert_eq!(asset.outcome, AcquireOutcome::Reused);
    }

    #[tokio::test]
    async fn refresh_replaces_file_in_destination_directory() {
        let dir = tempdir().unwrap();
        let dest_dir = dir.path().join("models");
        std::fs::create_dir_all(&dest_dir).unwrap();
        let existing = dest_dir.join("x.usdz");
        std::fs::write(&existing, b"stale").unwrap();
        let transport = RecordingTransport::serving(b"fresh model");
        let acquirer = acquirer(dir.path(), transport.clone());

        let asset = acquirer
            .ensure_local(
                "https://host/x.usdz",
                Some(Destination::Directory(dest_dir.clone())),
                CachePolicy::Refresh,
            )
            .await
            .unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(asset.path, dest_dir.join("x.usdz"));
        assert_eq!(asset.outcome, AcquireOutcome::Fetched);
        assert_eq!(std::fs::read(&asset.path).unwrap(), b"fresh model");
    }

    #[tokio::test]
    async fn refresh_deletes_even_when_transfer_fails() {
        let dir = tempdir().unwrap();
        let cached = dir.path().join("x.png");
        std::fs::write(&cached, b"stale").unwrap();
        let transport = RecordingTransport::failing_midway(b"would-be content");
        let acquirer = acquirer(dir.path(), transport.clone());

        let result = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Refresh)
            .await;

        assert!(matches!(result, Err(AcquireError::Download { .. })));
        assert_eq!(transport.calls(), 1);
        // Delete-then-fetch ordering is unconditional.
        assert!(!cached.exists());
    }

    #[tokio::test]
    async fn interrupted_transfer_leaves_no_partial_file() {
        let dir = tempdir().unwrap();
        let transport = RecordingTransport::failing_midway(b"truncate me");
        let acquirer = acquirer(dir.path(), transport.clone());

        let result = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Reuse)
            .await;

        assert!(matches!(result, Err(AcquireError::Download { .. })));
        assert!(!dir.path().join("x.png").exists());
        // The temp file guard cleaned up behind itself as well.
        let leftovers: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn exact_file_destination_is_honoured() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("renamed.png");
        let transport = RecordingTransport::serving(b"payload");
        let acquirer = acquirer(dir.path(), transport.clone());

        let asset = acquirer
            .ensure_local(
                "https://host/x.png",
                Some(Destination::File(target.clone())),
                CachePolicy::Reuse,
            )
            .await
            .unwrap();

        assert_eq!(asset.path, target);
        assert!(target.exists());
    }

    #[tokio::test]
    async fn locator_without_filename_is_rejected_before_any_transfer() {
        let dir = tempdir().unwrap();
        let transport = RecordingTransport::serving(b"payload");
        let acquirer = acquirer(dir.path(), transport.clone());

        let result = acquirer
            .ensure_local("https://host/", None, CachePolicy::Reuse)
            .await;

        assert!(matches!(result, Err(AcquireError::InvalidLocator(_))));
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn scratch_dir_is_created_on_demand() {
        let dir = tempdir().unwrap();
        let scratch = dir.path().join("nested").join("scratch");
        let transport = RecordingTransport::serving(b"payload");
        let acquirer = acquirer(&scratch, transport);

        let asset = acquirer
            .ensure_local("https://host/x.png", None, CachePolicy::Reuse)
            .await
            .unwrap();

        assert_eq!(asset.path, scratch.join("x.png"));
        assert!(asset.path.exists());
    }
}
