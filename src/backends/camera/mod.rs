// SPDX-License-Identifier: MPL-2.0

//! Capture device abstraction
//!
//! The control layer never talks to camera hardware directly. Everything it
//! needs from the platform goes through [`CaptureDevice`]:
//!
//! ```text
//! ┌─────────────────────┐
//! │  App / Runtime      │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CaptureDevice Trait │  ← permissions, device metadata, recording
//! └──────────┬──────────┘
//!            │
//!            ▼
//!   ┌─────────────────┐
//!   │ VirtualCapture  │  ← in-memory implementation
//!   └─────────────────┘
//! ```

pub mod types;
pub mod virtual_device;

pub use types::*;
pub use virtual_device::{DeviceCall, DeviceStats, VirtualCaptureDevice, default_devices};

use crate::errors::RecordingError;
use futures::future::BoxFuture;

/// Camera and microphone access as provided by the host platform
pub trait CaptureDevice: Send + Sync {
    // ===== Permissions =====

    /// Current status of a permission, without prompting
    fn permission_status(&self, kind: PermissionKind) -> PermissionStatus;

    /// Prompt for a permission and resolve with the user's answer
    fn request_permission(&self, kind: PermissionKind) -> BoxFuture<'static, PermissionStatus>;

    /// Send the user to the system settings page for this app
    fn open_settings(&self);

    // ===== Devices =====

    /// All capture devices, in platform order
    fn devices(&self) -> Vec<DeviceInfo>;

    // ===== Recording =====

    /// Begin recording
    ///
    /// Returns immediately. The returned receiver resolves once, either with
    /// the finished file after [`CaptureDevice::stop_recording`] or with the
    /// error that ended the recording early.
    fn start_recording(&self, options: RecordingOptions)
    -> Result<RecordingOutcome, RecordingError>;

    /// Stop the current recording
    fn stop_recording(&self) -> BoxFuture<'static, Result<(), RecordingError>>;
}

/// Pick the device at `position`, or the first one if there is none there
pub fn select_device(devices: &[DeviceInfo], position: DevicePosition) -> Option<&DeviceInfo> {
    devices
        .iter()
        .find(|d| d.position == position)
        .or_else(|| devices.first())
}
