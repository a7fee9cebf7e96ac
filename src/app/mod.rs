// SPDX-License-Identifier: MPL-2.0

//! Main application module
//!
//! Holds the application state and the message handling for both screens.
//! The model never performs I/O itself: `update` returns a [`Task`] that the
//! [`runtime::Runtime`] carries out against the capture device, feeding the
//! results back in as further messages.
//!
//! # Architecture
//!
//! - `state`: Messages, tasks and plain state types
//! - `handlers`: Message handlers grouped by screen
//! - `update`: Message dispatch
//! - `runtime`: Executes tasks on a single-threaded event loop

pub mod handlers;
pub mod runtime;
pub mod state;
mod update;

use crate::backends::camera::{
    CaptureDevice, DeviceInfo, DevicePosition, FlashMode, PermissionKind, select_device,
};
use crate::config::Config;
use crate::controls::capture_button::CaptureButton;
use crate::controls::gesture::GestureArbiter;
use crate::controls::zoom::{ZoomRange, ZoomState};
pub use runtime::Runtime;
pub use state::{CapturedMedia, Message, PermissionsState, Screen, Task};
use tracing::{info, warn};

/// Camera screen state
#[derive(Debug, Clone)]
pub struct CameraState {
    pub devices: Vec<DeviceInfo>,
    pub position: DevicePosition,
    pub active_device: Option<DeviceInfo>,
    pub zoom: ZoomState,
    pub gestures: GestureArbiter,
    pub button: CaptureButton,
    pub flash: FlashMode,
    pub is_foreground: bool,
    /// Scale of the running pinch, if any
    pub pinch_scale: Option<f64>,
    pub captured: Vec<CapturedMedia>,
}

impl CameraState {
    /// Active device supports flash
    pub fn supports_flash(&self) -> bool {
        self.active_device.as_ref().is_some_and(|d| d.has_flash)
    }

    /// Flash actually sent with recordings
    pub fn effective_flash(&self) -> FlashMode {
        if self.supports_flash() {
            self.flash
        } else {
            FlashMode::Off
        }
    }

    pub fn last_captured(&self) -> Option<&CapturedMedia> {
        self.captured.last()
    }
}

pub struct AppModel {
    pub(crate) config: Config,
    pub(crate) screen: Screen,
    pub(crate) permissions: PermissionsState,
    pub(crate) camera: CameraState,
}

impl AppModel {
    /// Build the model from what the device reports right now.
    ///
    /// Starts on the camera screen when both permissions are already
    /// granted, on the permissions screen otherwise.
    pub fn new(config: Config, device: &dyn CaptureDevice) -> Self {
        let permissions = PermissionsState {
            camera: device.permission_status(PermissionKind::Camera),
            microphone: device.permission_status(PermissionKind::Microphone),
        };
        let screen = if permissions.all_authorized() {
            Screen::Camera
        } else {
            Screen::Permissions
        };
        info!(
            camera = %permissions.camera,
            microphone = %permissions.microphone,
            ?screen,
            "Starting"
        );

        let camera = CameraState {
            devices: Vec::new(),
            position: config.default_position,
            active_device: None,
            zoom: ZoomState::default(),
            gestures: GestureArbiter::default(),
            button: CaptureButton::new(
                config.start_recording_delay(),
                config.release_animation_delay(),
                config.pan_full_zoom_factor,
            ),
            flash: config.default_flash,
            is_foreground: true,
            pinch_scale: None,
            captured: Vec::new(),
        };

        let mut model = Self {
            config,
            screen,
            permissions,
            camera,
        };
        // Startup selection never has a press to cancel, so the task is empty
        let _ = model.apply_devices(device.devices());
        model
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn permissions(&self) -> &PermissionsState {
        &self.permissions
    }

    pub fn camera(&self) -> &CameraState {
        &self.camera
    }

    /// Camera is on screen and the app is in the foreground
    pub fn is_camera_active(&self) -> bool {
        self.screen == Screen::Camera && self.camera.is_foreground
    }

    /// Store a new device list and reselect the active device
    pub(crate) fn apply_devices(&mut self, devices: Vec<DeviceInfo>) -> Task {
        self.camera.devices = devices;
        let selected = select_device(&self.camera.devices, self.camera.position).cloned();
        self.activate_device(selected)
    }

    /// Make `device` the active one: new zoom bounds, zoom back to neutral,
    /// gestures dropped
    pub(crate) fn activate_device(&mut self, device: Option<DeviceInfo>) -> Task {
        let unchanged = match (&self.camera.active_device, &device) {
            (Some(current), Some(next)) => current == next,
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return Task::none();
        }

        let device = device.and_then(|device| {
            match ZoomRange::for_device(&device, self.config.max_zoom_factor) {
                Ok(range) => Some((device, range)),
                Err(e) => {
                    warn!(device = %device.name, error = %e, "Ignoring device");
                    None
                }
            }
        });

        self.camera.gestures.cancel();
        self.camera.pinch_scale = None;
        match device {
            Some((device, range)) => {
                info!(
                    device = %device.name,
                    min_zoom = range.min,
                    neutral_zoom = range.neutral,
                    max_zoom = range.max,
                    "Active device changed"
                );
                self.camera.position = device.position;
                self.camera.zoom.reset_to(range);
                self.camera.button.set_device(Some(device.id.clone()));
                self.camera.active_device = Some(device);
            }
            None => {
                warn!("No capture device available");
                self.camera.zoom.reset_to(ZoomRange::default());
                self.camera.button.set_device(None);
                self.camera.active_device = None;
            }
        }
        self.camera.button.set_flash(self.camera.effective_flash());
        self.sync_button_enabled()
    }

    /// Enable the capture button only when it can actually record
    pub(crate) fn sync_button_enabled(&mut self) -> Task {
        let enabled = self.is_camera_active() && self.camera.active_device.is_some();
        self.camera
            .button
            .set_enabled(enabled, &mut self.camera.gestures, tokio::time::Instant::now())
    }
}
