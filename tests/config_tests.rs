// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use holdcam::Config;
use holdcam::backends::camera::{DevicePosition, FlashMode, PermissionStatus};
use holdcam::constants;

fn temp_config_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir()
        .join(format!("holdcam-config-{}-{}", name, std::process::id()))
        .join("config.json")
}

#[test]
fn test_config_default() {
    let config = Config::default();

    assert_eq!(config.scale_full_zoom, constants::SCALE_FULL_ZOOM);
    assert_eq!(config.max_zoom_factor, constants::MAX_ZOOM_FACTOR);
    assert_eq!(
        config.start_recording_delay(),
        constants::START_RECORDING_DELAY
    );
    assert_eq!(config.default_flash, FlashMode::Off);
    assert_eq!(config.default_position, DevicePosition::Back);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_file_yields_defaults() {
    let path = temp_config_path("missing");
    let config = Config::load_from(&path).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_save_then_load() {
    let path = temp_config_path("save");
    let mut config = Config::default();
    config.start_recording_delay_ms = 350;
    config.default_position = DevicePosition::Front;
    config.virtual_device.camera_request_answer = PermissionStatus::Denied;

    config.save_to(&path).unwrap();
    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn test_invalid_file_is_rejected() {
    let path = temp_config_path("invalid");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{ "pan_full_zoom_factor": 1.5 }"#).unwrap();

    assert!(Config::load_from(&path).is_err());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}
