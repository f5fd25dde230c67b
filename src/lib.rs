//! Client library for the Waveport recording server: capture sessions,
//! uploads, recording listings and downloads, push registration, and the
//! timeout-bounded HTTP access layer underneath them all.

pub mod capture;
pub mod config;
pub mod http_client;
pub mod notifications;
pub mod recordings;
pub mod upload;

pub use capture::{generate_filename, CaptureBackend, CaptureError, Recorder, RecorderConfig, RecorderState};
pub use config::ApiConfig;
pub use http_client::{ApiClient, ApiError, Body, RequestBody, RequestOptions, DATA_TIMEOUT, LIVENESS_PATH, PROBE_TIMEOUT};
pub use notifications::{register_device, Platform, RegisterDeviceRequest, RegisterDeviceResponse};
pub use recordings::{download_recording, download_to_file, list_recordings, DownloadError, Recording};
pub use upload::{upload_recording, UploadError, UPLOAD_PATH};
