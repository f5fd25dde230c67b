//! Upload recordings to the Waveport server.
//!
//! A single multipart POST to `/UploadAudio` with one `file` part. The part
//! is named by a timestamp-derived filename (`recording_<ts>.<ext>`) so
//! uploads never collide on the server, regardless of the local file name.
//! Failures are surfaced to the caller — no retry at this layer.

use std::path::Path;

use reqwest::multipart::{Form, Part};

use crate::capture::generate_filename;
use crate::http_client::{ApiClient, ApiError, Body};

/// Upload endpoint.
pub const UPLOAD_PATH: &str = "/UploadAudio";

/// Errors returned by [`upload_recording`].
#[derive(Debug, Clone)]
pub enum UploadError {
    FileNotFound(String),
    UnsupportedFormat(String),
    Io(String),
    Api(ApiError),
}

impl std::fmt::Display for UploadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FileNotFound(path) => write!(f, "file not found: {path}"),
            Self::UnsupportedFormat(ext) => write!(f, "unsupported audio format: .{ext}"),
            Self::Io(e) => write!(f, "failed to read file: {e}"),
            Self::Api(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for UploadError {}

impl From<ApiError> for UploadError {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

/// Upload a local audio file to the Waveport server.
///
/// Detects the content type from the file extension, reads the file, and
/// POSTs it as a multipart form with a single `file` part. Returns the
/// server's response body as text.
pub async fn upload_recording(client: &ApiClient, file_path: &Path) -> Result<String, UploadError> {
    if !file_path.exists() {
        return Err(UploadError::FileNotFound(
            file_path.to_string_lossy().into_owned(),
        ));
    }

    let (content_type, extension) = detect_audio_format(file_path)?;

    let file_bytes = tokio::fs::read(file_path)
        .await
        .map_err(|e| UploadError::Io(e.to_string()))?;

    let filename = generate_filename(&extension);
    tracing::info!(file = %file_path.display(), %filename, size = file_bytes.len(), "uploading recording");

    let part = Part::bytes(file_bytes)
        .file_name(filename)
        .mime_str(&content_type)
        .map_err(|e| UploadError::Api(ApiError::Encode(e.to_string())))?;
    let form = Form::new().part("file", part);

    let body = client.post_multipart(UPLOAD_PATH, form).await?;
    Ok(match body {
        Body::Text(text) => text,
        Body::Json(value) => value.to_string(),
    })
}

/// Detect audio format from file extension.
/// Returns (content_type, format) e.g. ("audio/mp4", "m4a").
fn detect_audio_format(path: &Path) -> Result<(String, String), UploadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "mp3" => Ok(("audio/mpeg".to_string(), "mp3".to_string())),
        "wav" => Ok(("audio/wav".to_string(), "wav".to_string())),
        "m4a" => Ok(("audio/mp4".to_string(), "m4a".to_string())),
        "aac" => Ok(("audio/aac".to_string(), "aac".to_string())),
        "ogg" | "oga" => Ok(("audio/ogg".to_string(), "ogg".to_string())),
        "flac" => Ok(("audio/flac".to_string(), "flac".to_string())),
        "webm" => Ok(("audio/webm".to_string(), "webm".to_string())),
        _ => Err(UploadError::UnsupportedFormat(ext)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;

    #[test]
    fn test_detect_audio_format_m4a() {
        let (content_type, format) = detect_audio_format(Path::new("test.m4a")).unwrap();
        assert_eq!(content_type, "audio/mp4");
        assert_eq!(format, "m4a");
    }

    #[test]
    fn test_detect_audio_format_mp3() {
        let (content_type, format) = detect_audio_format(Path::new("test.mp3")).unwrap();
        assert_eq!(content_type, "audio/mpeg");
        assert_eq!(format, "mp3");
    }

    #[test]
    fn test_detect_audio_format_wav() {
        let (content_type, format) = detect_audio_format(Path::new("test.wav")).unwrap();
        assert_eq!(content_type, "audio/wav");
        assert_eq!(format, "wav");
    }

    #[test]
    fn test_detect_audio_format_is_case_insensitive() {
        let (content_type, format) = detect_audio_format(Path::new("TEST.M4A")).unwrap();
        assert_eq!(content_type, "audio/mp4");
        assert_eq!(format, "m4a");
    }

    #[test]
    fn test_detect_audio_format_unsupported() {
        let err = detect_audio_format(Path::new("test.xyz")).unwrap_err();
        match err {
            UploadError::UnsupportedFormat(ext) => assert_eq!(ext, "xyz"),
            other => panic!("expected UnsupportedFormat, got: {other}"),
        }
    }

    #[test]
    fn test_detect_audio_format_no_extension() {
        assert!(detect_audio_format(Path::new("noext")).is_err());
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let client = ApiClient::new(ApiConfig::default()).unwrap();
        let err = upload_recording(&client, Path::new("/nonexistent/recording.m4a"))
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::FileNotFound(_)));
    }

    #[tokio::test]
    async fn test_upload_unsupported_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("notes.txt");
        std::fs::write(&path, "not audio").unwrap();

        let client = ApiClient::new(ApiConfig::default()).unwrap();
        let err = upload_recording(&client, &path).await.unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedFormat(_)));
    }
}
