// SPDX-License-Identifier: MPL-2.0

//! Error types for the camera application

use std::fmt;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Capture device errors
    Device(DeviceError),
    /// Recording-related errors
    Recording(RecordingError),
    /// Configuration errors
    Config(String),
    /// Generic error with message
    Other(String),
}

/// Capture device errors
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// No capture device available
    NoDeviceFound,
    /// Requested device id does not exist
    UnknownDevice(String),
    /// Device reported bounds that violate `min <= neutral <= max`
    InvalidZoomBounds { min: f64, neutral: f64, max: f64 },
}

/// Recording-specific errors
#[derive(Debug, Clone, PartialEq)]
pub enum RecordingError {
    /// Failed to start recording
    StartFailed(String),
    /// Failed to stop recording
    StopFailed(String),
    /// Recording already in progress
    AlreadyRecording,
    /// Stop requested while nothing is recording
    NotRecording,
    /// Not enough storage left for the recording
    NoStorage,
    /// The device dropped the recording before reporting an outcome
    Interrupted,
    /// The capture device itself cannot record
    Device(DeviceError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Device(e) => write!(f, "Device error: {}", e),
            AppError::Recording(e) => write!(f, "Recording error: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NoDeviceFound => write!(f, "No capture device found"),
            DeviceError::UnknownDevice(id) => write!(f, "Unknown device: {}", id),
            DeviceError::InvalidZoomBounds { min, neutral, max } => write!(
                f,
                "Invalid zoom bounds: min={} neutral={} max={}",
                min, neutral, max
            ),
        }
    }
}

impl fmt::Display for RecordingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordingError::StartFailed(msg) => write!(f, "Failed to start recording: {}", msg),
            RecordingError::StopFailed(msg) => write!(f, "Failed to stop recording: {}", msg),
            RecordingError::AlreadyRecording => write!(f, "Recording already in progress"),
            RecordingError::NotRecording => write!(f, "No recording in progress"),
            RecordingError::NoStorage => write!(f, "Not enough storage"),
            RecordingError::Interrupted => write!(f, "Recording interrupted"),
            RecordingError::Device(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for AppError {}
impl std::error::Error for DeviceError {}
impl std::error::Error for RecordingError {}

impl From<DeviceError> for AppError {
    fn from(err: DeviceError) -> Self {
        AppError::Device(err)
    }
}

impl From<RecordingError> for AppError {
    fn from(err: RecordingError) -> Self {
        AppError::Recording(err)
    }
}

impl From<DeviceError> for RecordingError {
    fn from(err: DeviceError) -> Self {
        RecordingError::Device(err)
    }
}

impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Other(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Config(err.to_string())
    }
}
