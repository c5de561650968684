//! Sequencing of acquisition before injected conversion.
//!
//! The conversion from file bytes to an in-memory resource is supplied
//! by the host as a function-typed dependency; this adapter only
//! guarantees the file is local and complete before that function runs,
//! and passes conversion failures through untouched.

use std::future::Future;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::acquire::AssetAcquirer;
use crate::error::AcquireError;
use crate::locator::{CachePolicy, Destination, SourceLocator};

/// Loads renderable resources through host-supplied conversion steps.
pub struct ResourceLoader {
    acquirer: AssetAcquirer,
}

impl ResourceLoader {
    /// Wrap an acquirer.
    pub fn new(acquirer: AssetAcquirer) -> Self {
        Self { acquirer }
    }

    /// Access the underlying acquirer.
    pub fn acquirer(&self) -> &AssetAcquirer {
        &self.acquirer
    }

    /// Ensure the texture file named by `locator` is local, then decode
    /// it with the injected function.
    pub async fn load_texture<C, Fut, R>(
        &self,
        locator: impl Into<SourceLocator>,
        destination: Option<Destination>,
        policy: CachePolicy,
        decode: C,
    ) -> Result<R, AcquireError>
    where
        C: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = anyhow::Result<R>>,
    {
        let asset = self.acquirer.ensure_local(locator, destination, policy).await?;
        decode(asset.path).await.map_err(AcquireError::Conversion)
    }

    /// Ensure the model file named by `locator` is local, then decode it.
    ///
    /// `resource_name` is a caller-chosen name used to identify the
    /// resource across a network session; it is forwarded to the decode
    /// function untouched.
    pub async fn load_model<C, Fut, R>(
        &self,
        locator: impl Into<SourceLocator>,
        resource_name: Option<&str>,
        destination: Option<Destination>,
        policy: CachePolicy,
        decode: C,
    ) -> Result<R, AcquireError>
    where
        C: FnOnce(PathBuf, Option<String>) -> Fut,
        Fut: Future<Output = anyhow::Result<R>>,
    {
        let asset = self.acquirer.ensure_local(locator, destination, policy).await?;
        decode(asset.path, resource_name.map(str::to_string))
            .await
            .map_err(AcquireError::Conversion)
    }

    /// Export an in-memory scene graph to a uniquely named temporary
    /// file, then decode that file.
    ///
    /// The host `export` function serializes `scene` to the path it is
    /// given and reports success; a refusal fails with
    /// `SceneExportFailed` before `decode` is ever invoked. The
    /// exported file is removed once conversion finishes.
    pub async fn load_from_scene<S, E, C, Fut, R>(
        &self,
        scene: &S,
        export: E,
        decode: C,
    ) -> Result<R, AcquireError>
    where
        E: FnOnce(&S, &Path) -> bool,
        C: FnOnce(PathBuf) -> Fut,
        Fut: Future<Output = anyhow::Result<R>>,
    {
        let scratch = self.acquirer.scratch_dir();
        tokio::fs::create_dir_all(scratch)
            .await
            .map_err(|source| AcquireError::Move {
                path: scratch.to_path_buf(),
                source,
            })?;

        let exported = tempfile::Builder::new()
            .prefix("scene-")
            .suffix(".usdz")
            .tempfile_in(scratch)
            .map_err(|source| AcquireError::Move {
                path: scratch.to_path_buf(),
                source,
            })?
            .into_temp_path();

        if !export(scene, &exported) {
            return Err(AcquireError::SceneExportFailed);
        }

        let result = decode(exported.to_path_buf())
            .await
            .map_err(AcquireError::Conversion);

        if let Err(err) = exported.close() {
            warn!("could not remove exported scene file: {err}");
        }
        result
    }
}
