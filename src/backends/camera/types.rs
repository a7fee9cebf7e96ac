// SPDX-License-Identifier: GPL-3.0-only
// Shared types for the capture device abstraction

//! Shared types for capture devices

use crate::errors::{DeviceError, RecordingError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Which permission is being asked about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionKind {
    Camera,
    Microphone,
}

impl PermissionKind {
    pub const ALL: [PermissionKind; 2] = [PermissionKind::Camera, PermissionKind::Microphone];

    pub fn display_name(&self) -> &'static str {
        match self {
            PermissionKind::Camera => "Camera",
            PermissionKind::Microphone => "Microphone",
        }
    }
}

/// Permission state as reported by the host platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PermissionStatus {
    Authorized,
    Denied,
    #[default]
    NotDetermined,
    Restricted,
}

impl PermissionStatus {
    pub fn is_authorized(&self) -> bool {
        matches!(self, PermissionStatus::Authorized)
    }
}

impl std::fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            PermissionStatus::Authorized => "authorized",
            PermissionStatus::Denied => "denied",
            PermissionStatus::NotDetermined => "not-determined",
            PermissionStatus::Restricted => "restricted",
        };
        write!(f, "{}", name)
    }
}

/// Physical placement of a camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DevicePosition {
    #[default]
    Back,
    Front,
}

impl DevicePosition {
    /// The other side
    pub fn flipped(self) -> Self {
        match self {
            DevicePosition::Back => DevicePosition::Front,
            DevicePosition::Front => DevicePosition::Back,
        }
    }
}

/// Flash setting forwarded to the recording call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    #[default]
    Off,
    On,
}

impl FlashMode {
    pub fn toggled(self) -> Self {
        match self {
            FlashMode::Off => FlashMode::On,
            FlashMode::On => FlashMode::Off,
        }
    }
}

/// Device metadata reported by the capture device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Stable identifier passed back in recording options
    pub id: String,
    /// Human-readable name
    pub name: String,
    pub position: DevicePosition,
    pub min_zoom: f64,
    pub neutral_zoom: f64,
    pub max_zoom: f64,
    pub has_flash: bool,
}

impl DeviceInfo {
    /// Check the reported zoom bounds are usable
    pub fn validate(&self) -> Result<(), DeviceError> {
        let ordered = self.min_zoom <= self.neutral_zoom && self.neutral_zoom <= self.max_zoom;
        if !ordered || !self.min_zoom.is_finite() || !self.max_zoom.is_finite() {
            return Err(DeviceError::InvalidZoomBounds {
                min: self.min_zoom,
                neutral: self.neutral_zoom,
                max: self.max_zoom,
            });
        }
        Ok(())
    }
}

/// Options for a single recording
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingOptions {
    /// Device to record from
    pub device_id: String,
    pub flash: FlashMode,
}

/// Kind of media handed to the capture listener
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
        }
    }
}

/// A finished recording as reported by the device
#[derive(Debug, Clone, PartialEq)]
pub struct VideoFile {
    pub path: PathBuf,
    pub duration: Duration,
}

/// Resolves exactly once with the final result of a recording:
/// the finished file, or the error the device hit while recording.
pub type RecordingOutcome = tokio::sync::oneshot::Receiver<Result<VideoFile, RecordingError>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn device(min: f64, neutral: f64, max: f64) -> DeviceInfo {
        DeviceInfo {
            id: "test".to_string(),
            name: "Test".to_string(),
            position: DevicePosition::Back,
            min_zoom: min,
            neutral_zoom: neutral,
            max_zoom: max,
            has_flash: false,
        }
    }

    #[test]
    fn test_validate_accepts_ordered_bounds() {
        assert!(device(1.0, 2.0, 128.0).validate().is_ok());
        assert!(device(1.0, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_neutral_outside_bounds() {
        assert!(device(1.0, 0.5, 4.0).validate().is_err());
        assert!(device(2.0, 3.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_permission_status_serializes_kebab_case() {
        let json = serde_json::to_string(&PermissionStatus::NotDetermined).unwrap();
        assert_eq!(json, "\"not-determined\"");
    }
}
