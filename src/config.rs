// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::types::{DevicePosition, FlashMode, PermissionStatus};
use crate::constants;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Directory name used under the platform config/cache/video dirs
pub const APP_DIR_NAME: &str = "holdcam";

/// Config file name inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Behaviour of the simulated capture device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualDeviceSettings {
    /// Camera permission status before any request
    pub camera_permission: PermissionStatus,
    /// Microphone permission status before any request
    pub microphone_permission: PermissionStatus,
    /// Answer given when the camera permission is requested
    pub camera_request_answer: PermissionStatus,
    /// Answer given when the microphone permission is requested
    pub microphone_request_answer: PermissionStatus,
    /// Make every start-recording call fail
    pub fail_start: bool,
    /// Make every stop-recording call fail
    pub fail_stop: bool,
}

impl Default for VirtualDeviceSettings {
    fn default() -> Self {
        Self {
            camera_permission: PermissionStatus::NotDetermined,
            microphone_permission: PermissionStatus::NotDetermined,
            camera_request_answer: PermissionStatus::Authorized,
            microphone_request_answer: PermissionStatus::Authorized,
            fail_start: false,
            fail_stop: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pinch scale that maps to full zoom
    pub scale_full_zoom: f64,
    /// Upper cap applied on top of the device max zoom
    pub max_zoom_factor: f64,
    /// Hold time before a press starts recording (milliseconds)
    pub start_recording_delay_ms: u64,
    /// Linger time of the pressed look after release (milliseconds)
    pub release_animation_ms: u64,
    /// Share of the starting finger height that reaches full zoom on pan
    pub pan_full_zoom_factor: f64,
    /// Flash mode selected at startup
    pub default_flash: FlashMode,
    /// Camera selected at startup
    pub default_position: DevicePosition,
    /// Directory reported for recorded videos (None = platform video dir)
    pub video_dir: Option<PathBuf>,
    /// Simulated device behaviour
    pub virtual_device: VirtualDeviceSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scale_full_zoom: constants::SCALE_FULL_ZOOM,
            max_zoom_factor: constants::MAX_ZOOM_FACTOR,
            start_recording_delay_ms: constants::START_RECORDING_DELAY.as_millis() as u64,
            release_animation_ms: constants::RELEASE_ANIMATION_DELAY.as_millis() as u64,
            pan_full_zoom_factor: constants::PAN_FULL_ZOOM_FACTOR,
            default_flash: FlashMode::Off,
            default_position: DevicePosition::Back,
            video_dir: None,
            virtual_device: VirtualDeviceSettings::default(),
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load the config from the default location, falling back to defaults
    /// when there is no config directory or no file yet.
    pub fn load() -> AppResult<Self> {
        match Self::default_path() {
            Some(path) => Self::load_from(&path),
            None => {
                warn!("No config directory available, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load the config from a specific file. A missing file yields defaults.
    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&contents)?;
        config.validate()?;
        info!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Write the config to a specific file, creating parent directories
    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        info!(path = %path.display(), "Saved config");
        Ok(())
    }

    /// Reject values the gesture math cannot work with
    pub fn validate(&self) -> AppResult<()> {
        if !(self.scale_full_zoom > 1.0) {
            return Err(AppError::Config(format!(
                "scale_full_zoom must be greater than 1, got {}",
                self.scale_full_zoom
            )));
        }
        if !(self.max_zoom_factor >= 1.0) {
            return Err(AppError::Config(format!(
                "max_zoom_factor must be at least 1, got {}",
                self.max_zoom_factor
            )));
        }
        if !(self.pan_full_zoom_factor > 0.0 && self.pan_full_zoom_factor < 1.0) {
            return Err(AppError::Config(format!(
                "pan_full_zoom_factor must be between 0 and 1, got {}",
                self.pan_full_zoom_factor
            )));
        }
        Ok(())
    }

    pub fn start_recording_delay(&self) -> Duration {
        Duration::from_millis(self.start_recording_delay_ms)
    }

    pub fn release_animation_delay(&self) -> Duration {
        Duration::from_millis(self.release_animation_ms)
    }

    /// Directory recorded videos are reported under
    pub fn video_directory(&self) -> PathBuf {
        self.video_dir.clone().unwrap_or_else(|| {
            dirs::video_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR_NAME)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"scale_full_zoom": 4.0}"#).unwrap();
        assert_eq!(config.scale_full_zoom, 4.0);
        assert_eq!(config.max_zoom_factor, constants::MAX_ZOOM_FACTOR);
        assert_eq!(config.virtual_device, VirtualDeviceSettings::default());
    }

    #[test]
    fn test_validate_rejects_degenerate_pinch_scale() {
        let config = Config {
            scale_full_zoom: 1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_pan_factor_out_of_range() {
        let config = Config {
            pan_full_zoom_factor: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
