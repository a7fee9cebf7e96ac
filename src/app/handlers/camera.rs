// SPDX-License-Identifier: GPL-3.0-only

//! Camera screen handlers
//!
//! Handles flipping between cameras, hotplug, flash, focus and pinch zoom.

use crate::app::AppModel;
use crate::app::state::{CapturedMedia, Task};
use crate::backends::camera::{DeviceInfo, MediaKind, VideoFile, select_device};
use tracing::{debug, info, warn};

impl AppModel {
    pub(crate) fn handle_flip_camera(&mut self) -> Task {
        if !self.camera.button.recording().is_idle() {
            warn!("Cannot flip camera while recording");
            return Task::none();
        }

        let target = self.camera.position.flipped();
        let Some(device) = self
            .camera
            .devices
            .iter()
            .find(|d| d.position == target)
            .cloned()
        else {
            info!(?target, "No camera on the other side, cannot flip");
            return Task::none();
        };

        info!(camera = %device.name, "Flipping camera");
        self.camera.position = target;
        self.activate_device(Some(device))
    }

    pub(crate) fn handle_devices_changed(&mut self, devices: Vec<DeviceInfo>) -> Task {
        info!(count = devices.len(), "Device list changed");
        let still_present = self
            .camera
            .active_device
            .as_ref()
            .is_some_and(|active| devices.contains(active));
        if still_present {
            self.camera.devices = devices;
            return Task::none();
        }

        // Active device vanished mid-recording: the press is cancelled so
        // the device is asked to stop
        let cancel = self.camera.button.cancel(
            &mut self.camera.gestures,
            tokio::time::Instant::now(),
        );
        self.camera.devices = devices;
        let selected = select_device(&self.camera.devices, self.camera.position).cloned();
        Task::batch([cancel, self.activate_device(selected)])
    }

    pub(crate) fn handle_toggle_flash(&mut self) -> Task {
        if !self.camera.supports_flash() {
            debug!("Active camera has no flash");
            return Task::none();
        }
        self.camera.flash = self.camera.flash.toggled();
        self.camera.button.set_flash(self.camera.effective_flash());
        info!(flash = ?self.camera.flash, "Flash toggled");
        Task::none()
    }

    pub(crate) fn handle_focus_changed(&mut self, is_foreground: bool) -> Task {
        if self.camera.is_foreground == is_foreground {
            return Task::none();
        }
        self.camera.is_foreground = is_foreground;
        info!(is_foreground, "App focus changed");
        if !is_foreground {
            self.camera.gestures.cancel();
            self.camera.pinch_scale = None;
        }
        self.sync_button_enabled()
    }

    // =========================================================================
    // Pinch to zoom
    // =========================================================================

    pub(crate) fn handle_pinch_started(&mut self) -> Task {
        if !self.is_camera_active() || self.camera.active_device.is_none() {
            return Task::none();
        }
        if self
            .camera
            .gestures
            .begin_pinch(&self.camera.zoom, self.config.scale_full_zoom)
        {
            self.camera.pinch_scale = Some(1.0);
        }
        Task::none()
    }

    pub(crate) fn handle_pinch_changed(&mut self, scale: f64) -> Task {
        if self
            .camera
            .gestures
            .update_pinch(scale, &mut self.camera.zoom)
        {
            self.camera.pinch_scale = Some(scale);
        }
        Task::none()
    }

    pub(crate) fn handle_pinch_ended(&mut self) -> Task {
        self.camera.gestures.end_pinch();
        self.camera.pinch_scale = None;
        debug!(zoom = self.camera.zoom.value(), "Pinch finished");
        Task::none()
    }

    pub(crate) fn handle_media_captured(&mut self, file: VideoFile, kind: MediaKind) -> Task {
        info!(
            path = %file.path.display(),
            kind = kind.as_str(),
            duration_ms = file.duration.as_millis() as u64,
            "Media captured"
        );
        self.camera.captured.push(CapturedMedia { file, kind });
        Task::none()
    }
}
