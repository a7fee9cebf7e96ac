// SPDX-License-Identifier: GPL-3.0-only

//! In-memory capture device
//!
//! Stands in for camera hardware: answers permission prompts from config,
//! reports a back and a front camera, and "records" by tracking start and
//! stop times. No file is written; the reported path is where a real device
//! would have put the video.

use super::types::*;
use super::CaptureDevice;
use crate::config::VirtualDeviceSettings;
use crate::constants::{VIDEO_FILE_EXTENSION, VIDEO_FILE_PREFIX};
use crate::errors::{DeviceError, RecordingError};
use futures::future::{self, BoxFuture, FutureExt};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Call counters, mostly useful in tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub start_calls: usize,
    pub stop_calls: usize,
    pub settings_opened: usize,
    pub recordings_finished: usize,
}

/// Recording call received by the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCall {
    StartRecording,
    StopRecording,
}

struct ActiveRecording {
    started: Instant,
    options: RecordingOptions,
    outcome: oneshot::Sender<Result<VideoFile, RecordingError>>,
}

struct Inner {
    settings: VirtualDeviceSettings,
    camera_permission: PermissionStatus,
    microphone_permission: PermissionStatus,
    devices: Vec<DeviceInfo>,
    video_dir: PathBuf,
    active: Option<ActiveRecording>,
    stats: DeviceStats,
    calls: Vec<DeviceCall>,
}

/// Cloneable handle; clones share the same simulated hardware
#[derive(Clone)]
pub struct VirtualCaptureDevice {
    inner: Arc<Mutex<Inner>>,
}

impl VirtualCaptureDevice {
    pub fn new(settings: VirtualDeviceSettings, video_dir: PathBuf) -> Self {
        Self::with_devices(settings, video_dir, default_devices())
    }

    pub fn with_devices(
        settings: VirtualDeviceSettings,
        video_dir: PathBuf,
        devices: Vec<DeviceInfo>,
    ) -> Self {
        let inner = Inner {
            camera_permission: settings.camera_permission,
            microphone_permission: settings.microphone_permission,
            settings,
            devices,
            video_dir,
            active: None,
            stats: DeviceStats::default(),
            calls: Vec::new(),
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn stats(&self) -> DeviceStats {
        self.lock().stats
    }

    /// Every start and stop call so far, oldest first
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.lock().calls.clone()
    }

    pub fn is_recording(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Make the ongoing recording fail, as a device does when it runs out of
    /// storage mid-recording. Returns false when nothing is recording.
    pub fn report_error(&self, error: RecordingError) -> bool {
        let Some(active) = self.lock().active.take() else {
            return false;
        };
        warn!(device = %active.options.device_id, %error, "Recording failed on device");
        let _ = active.outcome.send(Err(error));
        true
    }

    /// Swap the reported device list, as happens when a camera is plugged
    /// in or removed
    pub fn set_devices(&self, devices: Vec<DeviceInfo>) {
        self.lock().devices = devices;
    }

    pub fn set_fail_start(&self, fail: bool) {
        self.lock().settings.fail_start = fail;
    }

    pub fn set_fail_stop(&self, fail: bool) {
        self.lock().settings.fail_stop = fail;
    }
}

impl CaptureDevice for VirtualCaptureDevice {
    fn permission_status(&self, kind: PermissionKind) -> PermissionStatus {
        let inner = self.lock();
        match kind {
            PermissionKind::Camera => inner.camera_permission,
            PermissionKind::Microphone => inner.microphone_permission,
        }
    }

    fn request_permission(&self, kind: PermissionKind) -> BoxFuture<'static, PermissionStatus> {
        let mut inner = self.lock();
        let answer = match kind {
            PermissionKind::Camera => {
                inner.camera_permission = inner.settings.camera_request_answer;
                inner.camera_permission
            }
            PermissionKind::Microphone => {
                inner.microphone_permission = inner.settings.microphone_request_answer;
                inner.microphone_permission
            }
        };
        debug!(permission = kind.display_name(), %answer, "Permission requested");
        future::ready(answer).boxed()
    }

    fn open_settings(&self) {
        self.lock().stats.settings_opened += 1;
        info!("Opening system settings");
    }

    fn devices(&self) -> Vec<DeviceInfo> {
        self.lock().devices.clone()
    }

    fn start_recording(
        &self,
        options: RecordingOptions,
    ) -> Result<RecordingOutcome, RecordingError> {
        let mut inner = self.lock();
        inner.stats.start_calls += 1;
        inner.calls.push(DeviceCall::StartRecording);

        if inner.settings.fail_start {
            return Err(RecordingError::StartFailed("encoder unavailable".to_string()));
        }
        if inner.active.is_some() {
            return Err(RecordingError::AlreadyRecording);
        }
        if !inner.devices.iter().any(|d| d.id == options.device_id) {
            return Err(DeviceError::UnknownDevice(options.device_id).into());
        }

        let (sender, receiver) = oneshot::channel();
        info!(device = %options.device_id, flash = ?options.flash, "Recording started");
        inner.active = Some(ActiveRecording {
            started: Instant::now(),
            options,
            outcome: sender,
        });
        Ok(receiver)
    }

    fn stop_recording(&self) -> BoxFuture<'static, Result<(), RecordingError>> {
        let mut inner = self.lock();
        inner.stats.stop_calls += 1;
        inner.calls.push(DeviceCall::StopRecording);

        let Some(active) = inner.active.take() else {
            return future::ready(Err(RecordingError::NotRecording)).boxed();
        };

        if inner.settings.fail_stop {
            let error = RecordingError::StopFailed("encoder did not flush".to_string());
            let _ = active.outcome.send(Err(error.clone()));
            return future::ready(Err(error)).boxed();
        }

        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let filename = format!(
            "{}_{}_{}.{}",
            VIDEO_FILE_PREFIX,
            timestamp,
            inner.stats.recordings_finished + 1,
            VIDEO_FILE_EXTENSION
        );
        let file = VideoFile {
            path: inner.video_dir.join(filename),
            duration: active.started.elapsed(),
        };
        inner.stats.recordings_finished += 1;
        info!(path = %file.path.display(), "Recording stopped");
        let _ = active.outcome.send(Ok(file));
        future::ready(Ok(())).boxed()
    }
}

/// A phone-like pair: wide-range back camera with flash and a front camera
pub fn default_devices() -> Vec<DeviceInfo> {
    vec![
        DeviceInfo {
            id: "virtual-back".to_string(),
            name: "Back Camera".to_string(),
            position: DevicePosition::Back,
            min_zoom: 1.0,
            neutral_zoom: 2.0,
            max_zoom: 128.0,
            has_flash: true,
        },
        DeviceInfo {
            id: "virtual-front".to_string(),
            name: "Front Camera".to_string(),
            position: DevicePosition::Front,
            min_zoom: 1.0,
            neutral_zoom: 1.0,
            max_zoom: 4.0,
            has_flash: false,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> VirtualCaptureDevice {
        VirtualCaptureDevice::new(VirtualDeviceSettings::default(), PathBuf::from("/tmp/videos"))
    }

    fn options() -> RecordingOptions {
        RecordingOptions {
            device_id: "virtual-back".to_string(),
            flash: FlashMode::Off,
        }
    }

    #[tokio::test]
    async fn test_stop_delivers_file_once() {
        let device = device();
        let outcome = device.start_recording(options()).unwrap();
        device.stop_recording().await.unwrap();

        let file = outcome.await.unwrap().unwrap();
        assert!(file.path.starts_with("/tmp/videos"));
        assert_eq!(device.stats().recordings_finished, 1);
    }

    #[tokio::test]
    async fn test_calls_are_logged_in_order() {
        let device = device();
        let _outcome = device.start_recording(options()).unwrap();
        device.stop_recording().await.unwrap();
        assert_eq!(
            device.calls(),
            vec![DeviceCall::StartRecording, DeviceCall::StopRecording]
        );
    }

    #[test]
    fn test_unknown_device_is_rejected() {
        let device = device();
        let options = RecordingOptions {
            device_id: "usb-cam".to_string(),
            flash: FlashMode::Off,
        };
        assert_eq!(
            device.start_recording(options).unwrap_err(),
            RecordingError::Device(DeviceError::UnknownDevice("usb-cam".to_string()))
        );
        assert!(!device.is_recording());
    }

    #[test]
    fn test_second_start_is_rejected() {
        let device = device();
        let _outcome = device.start_recording(options()).unwrap();
        assert_eq!(
            device.start_recording(options()).unwrap_err(),
            RecordingError::AlreadyRecording
        );
    }

    #[tokio::test]
    async fn test_stop_without_recording_fails() {
        let device = device();
        assert_eq!(
            device.stop_recording().await.unwrap_err(),
            RecordingError::NotRecording
        );
    }

    #[tokio::test]
    async fn test_report_error_resolves_outcome() {
        let device = device();
        let outcome = device.start_recording(options()).unwrap();
        assert!(device.report_error(RecordingError::NoStorage));
        assert_eq!(outcome.await.unwrap(), Err(RecordingError::NoStorage));
        assert!(!device.is_recording());
    }

    #[tokio::test]
    async fn test_request_permission_uses_configured_answer() {
        let settings = VirtualDeviceSettings {
            microphone_request_answer: PermissionStatus::Denied,
            ..Default::default()
        };
        let device = VirtualCaptureDevice::new(settings, PathBuf::from("/tmp"));
        assert_eq!(
            device.request_permission(PermissionKind::Camera).await,
            PermissionStatus::Authorized
        );
        assert_eq!(
            device.request_permission(PermissionKind::Microphone).await,
            PermissionStatus::Denied
        );
        assert_eq!(
            device.permission_status(PermissionKind::Microphone),
            PermissionStatus::Denied
        );
    }
}
