//! Attachment transfer pipeline.
//!
//! Stages an attachment on local disk, hands it to the asset client,
//! and removes the staging file whichever way the attempt went. The
//! staging copy exists only because the upload needs a file-backed
//! source.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::io::AsyncWriteExt;
use tracing::{error, info, warn};

use crate::asset::{AssetClient, AssetError};

/// Status text reported to the user when any transfer step fails.
const INTERNAL_ERROR_STATUS: &str = "internal error";

/// Capability to move one attachment from a source URL into the asset service.
///
/// The returned string is a complete status line, `"<filename>: <status>\n"`,
/// ready for concatenation into the aggregated reply. Failures show up in
/// the line as an opaque internal error; full detail is logged here, and
/// callers never abort sibling transfers over one bad attachment.
#[async_trait]
pub trait Transferrer: Send + Sync {
    async fn transfer(
        &self,
        filename: &str,
        source_url: &str,
        message_time: DateTime<Utc>,
    ) -> String;
}

/// Download-then-upload pipeline backed by a local staging directory.
#[derive(Clone)]
pub struct TransferPipeline {
    staging_dir: PathBuf,
    http_client: reqwest::Client,
    asset_client: AssetClient,
}

/// Errors raised by individual transfer steps
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("Failed to create staging file: {0}")]
    CreateFile(#[source] std::io::Error),
    #[error("Failed to fetch attachment: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Failed to write attachment to disk: {0}")]
    WriteFile(#[source] std::io::Error),
    #[error("Failed to upload asset: {0}")]
    Upload(#[from] AssetError),
}

impl TransferPipeline {
    pub fn new(staging_dir: PathBuf, asset_client: AssetClient) -> Self {
        Self {
            staging_dir,
            http_client: reqwest::Client::new(),
            asset_client,
        }
    }

    /// The fallible part of one transfer; cleanup stays with the caller.
    async fn fetch_and_upload(
        &self,
        staging_path: &Path,
        source_url: &str,
        message_time: DateTime<Utc>,
    ) -> Result<String, TransferError> {
        let mut out = tokio::fs::File::create(staging_path)
            .await
            .map_err(TransferError::CreateFile)?;

        let mut response = self
            .http_client
            .get(source_url)
            .send()
            .await?
            .error_for_status()?;

        while let Some(chunk) = response.chunk().await? {
            out.write_all(&chunk)
                .await
                .map_err(TransferError::WriteFile)?;
        }
        out.flush().await.map_err(TransferError::WriteFile)?;
        drop(out);

        // The message timestamp stands in for both creation and
        // modification time; the platform tracks neither per attachment.
        let upload = self
            .asset_client
            .upload_asset(staging_path, message_time, message_time)
            .await?;

        Ok(upload.status)
    }
}

#[async_trait]
impl Transferrer for TransferPipeline {
    async fn transfer(
        &self,
        filename: &str,
        source_url: &str,
        message_time: DateTime<Utc>,
    ) -> String {
        let staging_path = self.staging_dir.join(filename);

        let result = self
            .fetch_and_upload(&staging_path, source_url, message_time)
            .await;

        // The staging file never outlives the attempt, success or not.
        // NotFound just means the create step never got that far.
        if let Err(err) = tokio::fs::remove_file(&staging_path).await {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(
                    "Failed to remove staging file {}: {}",
                    staging_path.display(),
                    err
                );
            }
        }

        match result {
            Ok(status) => {
                info!("Uploaded {}: {}", filename, status);
                format!("{}: {}\n", filename, status)
            }
            Err(err) => {
                error!("Transfer failed for {}: {}", filename, err);
                format!("{}: {}\n", filename, INTERNAL_ERROR_STATUS)
            }
        }
    }
}
