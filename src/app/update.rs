// SPDX-License-Identifier: GPL-3.0-only

//! Message update handling
//!
//! The main `update()` function acts as a dispatcher, while specific handlers
//! are implemented in the `handlers` submodules organized by screen.
//!
//! # Handler Modules
//!
//! - `handlers::permissions`: Permission requests and navigation to the camera
//! - `handlers::camera`: Device selection, flash, focus, pinch zoom
//! - `handlers::capture`: Capture button presses and recording completions

use crate::app::AppModel;
use crate::app::state::{Message, Task};
use tracing::trace;

impl AppModel {
    /// Main message handler - routes messages to appropriate handler methods.
    pub fn update(&mut self, message: Message) -> Task {
        trace!(?message, "update");
        match message {
            // ===== Permissions =====
            Message::RequestPermission(kind) => self.handle_request_permission(kind),
            Message::PermissionResolved(kind, status) => {
                self.handle_permission_resolved(kind, status)
            }

            // ===== Camera screen =====
            Message::FlipCamera => self.handle_flip_camera(),
            Message::ToggleFlash => self.handle_toggle_flash(),
            Message::FocusChanged(is_foreground) => self.handle_focus_changed(is_foreground),
            Message::DevicesChanged(devices) => self.handle_devices_changed(devices),
            Message::PinchStarted => self.handle_pinch_started(),
            Message::PinchChanged(scale) => self.handle_pinch_changed(scale),
            Message::PinchEnded => self.handle_pinch_ended(),

            // ===== Capture button =====
            Message::CapturePressed { y } => self.handle_capture_pressed(y),
            Message::CaptureDragged { y } => self.handle_capture_dragged(y),
            Message::CaptureReleased => self.handle_capture_released(),
            Message::CaptureCancelled => self.handle_capture_cancelled(),
            Message::HoldCheck(session) => self.handle_hold_check(session),
            Message::ReleaseSettled(session) => self.handle_release_settled(session),

            // ===== Recording =====
            Message::RecordingStarted(recording) => self.handle_recording_started(recording),
            Message::RecordingStartFailed(recording, error) => {
                self.handle_recording_start_failed(recording, error)
            }
            Message::RecordingFinished(recording, result) => {
                self.handle_recording_finished(recording, result)
            }
            Message::StopResolved(recording, result) => {
                self.handle_stop_resolved(recording, result)
            }
            Message::MediaCaptured(file, kind) => self.handle_media_captured(file, kind),

            Message::Noop => Task::none(),
        }
    }
}
