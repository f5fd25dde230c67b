//! Recording capture session.
//!
//! The actual audio backend (device access, encoding) lives behind the
//! [`CaptureBackend`] trait — this module owns the session rules: capture is
//! exclusive (one active recording at a time), `start` picks a
//! timestamp-named output file, and `stop` yields the locator of the
//! captured file for the upload flow.

use std::fs;
use std::path::{Path, PathBuf};

/// Capture state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Recording,
}

/// Errors that can occur during a capture session.
#[derive(Debug, Clone)]
pub enum CaptureError {
    AlreadyRecording,
    NotRecording,
    Backend(String),
    Io(String),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyRecording => write!(f, "a recording is already in progress"),
            Self::NotRecording => write!(f, "no recording in progress"),
            Self::Backend(e) => write!(f, "capture backend error: {e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CaptureError {}

/// Platform capture backend: writes audio to the file the session names.
///
/// Implementations do the device and codec work; the session never
/// interprets the media format.
pub trait CaptureBackend {
    /// Begin writing captured audio to `output`.
    fn begin(&mut self, output: &Path) -> Result<(), CaptureError>;
    /// Stop capturing and finalize the output file.
    fn finish(&mut self) -> Result<(), CaptureError>;
}

/// Configuration for the recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Directory where recordings are saved.
    pub output_dir: PathBuf,
    /// File extension for new recordings (no leading dot).
    pub extension: String,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        let output_dir = dirs::audio_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join("Music")))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("Waveport Recordings");
        Self {
            output_dir,
            extension: "m4a".to_string(),
        }
    }
}

/// Exclusive capture session over a pluggable backend.
pub struct Recorder<B: CaptureBackend> {
    pub config: RecorderConfig,
    backend: B,
    state: RecorderState,
    /// Path of the file currently being recorded.
    current_file: Option<PathBuf>,
}

impl<B: CaptureBackend> Recorder<B> {
    pub fn new(config: RecorderConfig, backend: B) -> Self {
        Self {
            config,
            backend,
            state: RecorderState::Idle,
            current_file: None,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    /// Start recording. Returns the output file path on success.
    pub fn start(&mut self) -> Result<PathBuf, CaptureError> {
        if self.state == RecorderState::Recording {
            return Err(CaptureError::AlreadyRecording);
        }

        fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| CaptureError::Io(e.to_string()))?;

        let filename = generate_filename(&self.config.extension);
        let output_path = self.config.output_dir.join(filename);

        self.backend.begin(&output_path)?;

        self.current_file = Some(output_path.clone());
        self.state = RecorderState::Recording;

        Ok(output_path)
    }

    /// Stop recording. Returns the locator of the captured file.
    pub fn stop(&mut self) -> Result<PathBuf, CaptureError> {
        if self.state != RecorderState::Recording {
            return Err(CaptureError::NotRecording);
        }

        self.backend.finish()?;
        self.state = RecorderState::Idle;

        self.current_file
            .take()
            .ok_or(CaptureError::Io("no current file".into()))
    }

    /// Update the output directory.
    pub fn set_output_dir(&mut self, dir: PathBuf) {
        self.config.output_dir = dir;
    }
}

/// Timestamp-derived filename: `recording_<UTC %Y%m%d_%H%M%S>.<ext>`.
pub fn generate_filename(extension: &str) -> String {
    let now = chrono::Utc::now();
    format!("recording_{}.{}", now.format("%Y%m%d_%H%M%S"), extension)
}
