//! Byte-transfer collaborators.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Response metadata reported by a completed transfer.
#[derive(Debug, Clone)]
pub struct TransferInfo {
    /// Number of body bytes written to the destination file.
    pub bytes: u64,
    /// Content type advertised by the source.
    pub content_type: String,
}

/// A single-shot transfer of a remote resource into a local file.
///
/// Implementations stream the body of `url` into the file at `into`,
/// replacing its contents. Errors are opaque transport failures; the
/// caller classifies them.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Download `url` into the file at `into`.
    async fn download(&self, url: &str, into: &Path) -> Result<TransferInfo>;
}

/// Production transport backed by a reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Build a transport whose requests time out after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn download(&self, url: &str, into: &Path) -> Result<TransferInfo> {
        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        debug!("http fetch status={} url={}", status.as_u16(), url);
        if !status.is_success() {
            bail!("download failed: HTTP {}", status.as_u16());
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();

        let mut file = tokio::fs::File::create(into)
            .await
            .with_context(|| format!("failed to open {}", into.display()))?;

        let mut bytes = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;

        Ok(TransferInfo {
            bytes,
            content_type,
        })
    }
}
