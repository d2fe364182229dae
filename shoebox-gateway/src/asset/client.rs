//! Asset service API client.
//!
//! Speaks the service's JSON-over-HTTP contract: every request is
//! authenticated with the `x-api-key` header, uploads go out as
//! multipart forms, and non-2xx responses carry a structured error
//! body shared by all endpoints.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart;
use serde::Deserialize;

/// Asset service API client
#[derive(Clone)]
pub struct AssetClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    device_id: String,
}

/// Response from the server ping endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PingResponse {
    pub res: String,
}

/// Account the API key belongs to
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub name: String,
}

/// Outcome of one asset upload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetUpload {
    pub id: String,
    /// Remote-assigned status, e.g. "created" or "duplicate"
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Error body the service returns for non-2xx statuses
#[derive(Debug, Deserialize)]
struct ServerMessage {
    message: Vec<String>,
}

/// Errors that can occur when calling the asset service
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error ({status}): {messages}")]
    Api { status: StatusCode, messages: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssetClient {
    /// Create a new asset service client.
    ///
    /// `endpoint` is the service root without the `/api` suffix;
    /// `device_id` is the stable per-process identifier sent with
    /// every upload.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        device_id: impl Into<String>,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http_client,
            api_key: api_key.into(),
            base_url: format!("{}/api", endpoint.into()),
            device_id: device_id.into(),
        }
    }

    /// Check that the service is reachable and the key is accepted.
    pub async fn ping(&self) -> Result<PingResponse, AssetError> {
        let url = format!("{}/server/ping", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        match read_envelope(response).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(PingResponse::default()),
        }
    }

    /// Fetch the account the configured API key belongs to.
    pub async fn current_user(&self) -> Result<CurrentUser, AssetError> {
        let url = format!("{}/users/me", self.base_url);

        let response = self
            .http_client
            .get(&url)
            .header("x-api-key", &self.api_key)
            .send()
            .await?;

        match read_envelope(response).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(CurrentUser::default()),
        }
    }

    /// Upload a staged file as a new asset.
    ///
    /// The form carries a `deviceAssetId` derived from the file name and
    /// byte size, so re-uploading identical content deduplicates
    /// server-side instead of erroring.
    pub async fn upload_asset(
        &self,
        path: &Path,
        created_at: DateTime<Utc>,
        modified_at: DateTime<Utc>,
    ) -> Result<AssetUpload, AssetError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let asset_id = device_asset_id(&file_name, bytes.len());

        let form = multipart::Form::new()
            .part("assetData", multipart::Part::bytes(bytes).file_name(file_name))
            .text("deviceAssetId", asset_id)
            .text("deviceId", self.device_id.clone())
            .text(
                "fileCreatedAt",
                created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            )
            .text(
                "fileModifiedAt",
                modified_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            );

        let url = format!("{}/assets", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await?;

        match read_envelope(response).await? {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(AssetUpload::default()),
        }
    }
}

/// Shared response-envelope inspection.
///
/// Status >= 400 carries the structured error body; 204 carries nothing
/// and is tolerated as a no-op; anything else hands the body back for
/// the endpoint to decode into its concrete response type.
async fn read_envelope(response: reqwest::Response) -> Result<Option<String>, AssetError> {
    let status = response.status();

    if status.is_client_error() || status.is_server_error() {
        let body = response.text().await?;
        return Err(server_error(status, &body));
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    Ok(Some(response.text().await?))
}

/// Decode the error body into a single error combining status and messages.
fn server_error(status: StatusCode, body: &str) -> AssetError {
    match serde_json::from_str::<ServerMessage>(body) {
        Ok(server) => AssetError::Api {
            status,
            messages: server.message.join(", "),
        },
        Err(err) => AssetError::Decode(err),
    }
}

/// Identifier the service deduplicates identical re-uploads on.
fn device_asset_id(file_name: &str, size: usize) -> String {
    format!("{}-{}", file_name, size)
}
