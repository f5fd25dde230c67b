//! Server-side recording listing and download.
//!
//! `GET /GetRecordings` returns the ordered list of uploaded recordings;
//! `GET /DownloadAudio/{name}` returns the raw byte stream of one of them,
//! which is handed to the platform audio player as-is — this module never
//! interprets the media format.

use std::path::Path;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::http_client::{classify_transport, ApiClient, ApiError, DATA_TIMEOUT};

/// Listing endpoint.
pub const RECORDINGS_PATH: &str = "/GetRecordings";
/// Download endpoint; the recording name is appended as a path segment.
pub const DOWNLOAD_PATH: &str = "/DownloadAudio";

/// A recording previously uploaded to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub id: i64,
    pub name: String,
    pub date: DateTime<Utc>,
}

/// Errors returned by [`download_to_file`].
#[derive(Debug, Clone)]
pub enum DownloadError {
    Api(ApiError),
    Io(String),
}

impl std::fmt::Display for DownloadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Api(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "failed to write file: {e}"),
        }
    }
}

impl std::error::Error for DownloadError {}

impl From<ApiError> for DownloadError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

/// Fetch the list of uploaded recordings, in server order.
pub async fn list_recordings(client: &ApiClient) -> Result<Vec<Recording>, ApiError> {
    client.get(RECORDINGS_PATH).await
}

/// Download a recording into memory by name.
pub async fn download_recording(client: &ApiClient, name: &str) -> Result<Bytes, ApiError> {
    let endpoint = download_endpoint(name)?;
    let response = client.get_raw(&endpoint, DATA_TIMEOUT).await?;
    response
        .bytes()
        .await
        .map_err(|e| classify_transport(&endpoint, e))
}

/// Stream a recording to a local file. Returns the number of bytes written.
pub async fn download_to_file(
    client: &ApiClient,
    name: &str,
    dest: &Path,
) -> Result<u64, DownloadError> {
    let endpoint = download_endpoint(name)?;
    let response = client.get_raw(&endpoint, DATA_TIMEOUT).await?;

    let mut file = tokio::fs::File::create(dest)
        .await
        .map_err(|e| DownloadError::Io(e.to_string()))?;

    let mut stream = response.bytes_stream();
    let mut written = 0u64;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| classify_transport(&endpoint, e))?;
        file.write_all(&chunk)
            .await
            .map_err(|e| DownloadError::Io(e.to_string()))?;
        written += chunk.len() as u64;
    }
    file.flush()
        .await
        .map_err(|e| DownloadError::Io(e.to_string()))?;

    tracing::info!(%name, dest = %dest.display(), written, "recording downloaded");
    Ok(written)
}

/// Build the download endpoint for a recording name. Names with path
/// separators are rejected — a name is a single path segment.
fn download_endpoint(name: &str) -> Result<String, ApiError> {
    if name.trim().is_empty() || name.contains('/') {
        return Err(ApiError::InvalidEndpoint);
    }
    Ok(format!("{DOWNLOAD_PATH}/{name}"))
}
