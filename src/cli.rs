// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands
//!
//! This module provides command-line functionality for:
//! - Listing capture devices
//! - Replaying gesture scripts headless
//! - Showing the active configuration

use holdcam::backends::camera::{CaptureDevice, PermissionStatus, VirtualCaptureDevice};
use holdcam::config::Config;
use holdcam::controls::zoom::ZoomRange;
use holdcam::simulation::{self, Script};
use holdcam::AppModel;
use std::path::Path;
use std::sync::Arc;

/// List all capture devices and the zoom range the app would use
pub fn list_devices(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let device = VirtualCaptureDevice::new(config.virtual_device.clone(), config.video_directory());
    let devices = device.devices();

    if devices.is_empty() {
        println!("No capture devices found.");
        return Ok(());
    }

    println!("Available capture devices:");
    println!();
    for (index, info) in devices.iter().enumerate() {
        println!("  [{}] {} ({:?})", index, info.name, info.position);
        println!("      Id: {}", info.id);
        match ZoomRange::for_device(info, config.max_zoom_factor) {
            Ok(range) => println!(
                "      Zoom: {:.1}x - {:.1}x, neutral {:.1}x (device max {:.1}x)",
                range.min, range.max, range.neutral, info.max_zoom
            ),
            Err(e) => println!("      Unusable: {}", e),
        }
        println!("      Flash: {}", if info.has_flash { "yes" } else { "no" });
        println!();
    }

    Ok(())
}

/// Replay a gesture script and print what happened
pub fn simulate(
    mut config: Config,
    script_path: &Path,
    authorized: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let script = Script::load(script_path)?;

    if authorized {
        config.virtual_device.camera_permission = PermissionStatus::Authorized;
        config.virtual_device.microphone_permission = PermissionStatus::Authorized;
    }

    let device = Arc::new(VirtualCaptureDevice::new(
        config.virtual_device.clone(),
        config.video_directory(),
    ));
    let model = AppModel::new(config, device.as_ref());

    println!(
        "Replaying {} events from {}",
        script.steps().len(),
        script_path.display()
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(simulation::run(&script, model, device.clone()));
    let stats = device.stats();

    println!();
    println!("Screen: {:?}", report.screen);
    println!(
        "Device: {}",
        report.device.as_deref().unwrap_or("none")
    );
    println!("Zoom: {:.2}x", report.zoom);
    println!("Recording: {:?}", report.recording);
    println!(
        "Device calls: {} start, {} stop, {} settings opened",
        stats.start_calls, stats.stop_calls, stats.settings_opened
    );
    println!();

    if report.captured.is_empty() {
        println!("No videos captured.");
    } else {
        println!("Captured {} video(s):", report.captured.len());
        for media in &report.captured {
            println!(
                "  {} ({:.1}s)",
                media.file.path.display(),
                media.file.duration.as_secs_f64()
            );
        }
    }

    Ok(())
}

/// Print the active configuration as JSON
pub fn show_config(config: &Config, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path.map(Path::to_path_buf).or_else(Config::default_path) {
        Some(path) if path.exists() => println!("Config file: {}", path.display()),
        Some(path) => println!("Config file: {} (not created, using defaults)", path.display()),
        None => println!("Config file: none (no config directory)"),
    }
    println!("Videos: {}", config.video_directory().display());
    println!();
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
