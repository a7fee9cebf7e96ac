// SPDX-License-Identifier: GPL-3.0-only

//! Application state management

use crate::backends::camera::{
    DeviceInfo, MediaKind, PermissionKind, PermissionStatus, RecordingOptions, VideoFile,
};
use crate::controls::press::{RecordingId, SessionId};
use crate::errors::RecordingError;
use std::time::Duration;

/// Screens of the navigation stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Asks for camera and microphone access
    Permissions,
    /// Preview, zoom and capture button
    Camera,
}

/// Permission answers known so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionsState {
    pub camera: PermissionStatus,
    pub microphone: PermissionStatus,
}

impl PermissionsState {
    pub fn get(&self, kind: PermissionKind) -> PermissionStatus {
        match kind {
            PermissionKind::Camera => self.camera,
            PermissionKind::Microphone => self.microphone,
        }
    }

    pub fn set(&mut self, kind: PermissionKind, status: PermissionStatus) {
        match kind {
            PermissionKind::Camera => self.camera = status,
            PermissionKind::Microphone => self.microphone = status,
        }
    }

    pub fn all_authorized(&self) -> bool {
        self.camera.is_authorized() && self.microphone.is_authorized()
    }

    /// First permission that still needs asking for
    pub fn next_missing(&self) -> Option<PermissionKind> {
        PermissionKind::ALL
            .into_iter()
            .find(|kind| !self.get(*kind).is_authorized())
    }
}

/// A video handed back by the capture button
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedMedia {
    pub file: VideoFile,
    pub kind: MediaKind,
}

/// Everything that can happen to the app
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Permissions =====
    /// User asked to grant a permission
    RequestPermission(PermissionKind),
    /// Platform answered a permission request
    PermissionResolved(PermissionKind, PermissionStatus),

    // ===== Camera screen =====
    /// Switch between front and back camera
    FlipCamera,
    /// Toggle flash between off and on
    ToggleFlash,
    /// App moved to the foreground (true) or background (false)
    FocusChanged(bool),
    /// Device list changed (camera plugged in or removed)
    DevicesChanged(Vec<DeviceInfo>),
    PinchStarted,
    /// Pinch scale relative to the start of the gesture
    PinchChanged(f64),
    PinchEnded,

    // ===== Capture button =====
    CapturePressed { y: f64 },
    CaptureDragged { y: f64 },
    CaptureReleased,
    CaptureCancelled,
    /// Hold delay elapsed for a press
    HoldCheck(SessionId),
    /// Release animation finished for a press
    ReleaseSettled(SessionId),

    // ===== Recording =====
    RecordingStarted(RecordingId),
    RecordingStartFailed(RecordingId, RecordingError),
    RecordingFinished(RecordingId, Result<VideoFile, RecordingError>),
    StopResolved(RecordingId, Result<(), RecordingError>),
    /// A recording produced a file
    MediaCaptured(VideoFile, MediaKind),

    /// No-op message for completions that need no handling
    Noop,
}

/// Work requested by `update`, carried out by the runtime
///
/// Every piece of asynchronous work ends by feeding a [`Message`] back in.
#[derive(Debug)]
pub enum Task {
    None,
    /// Dispatch a message right away
    Done(Message),
    /// Dispatch a message after a delay
    Delay { after: Duration, message: Message },
    RequestPermission(PermissionKind),
    OpenSettings,
    StartRecording {
        recording: RecordingId,
        options: RecordingOptions,
    },
    StopRecording { recording: RecordingId },
    Batch(Vec<Task>),
}

impl Task {
    pub fn none() -> Self {
        Task::None
    }

    pub fn done(message: Message) -> Self {
        Task::Done(message)
    }

    pub fn delay(after: Duration, message: Message) -> Self {
        Task::Delay { after, message }
    }

    /// Combine tasks, dropping empty ones
    pub fn batch(tasks: impl IntoIterator<Item = Task>) -> Self {
        let mut tasks: Vec<Task> = tasks.into_iter().filter(|t| !t.is_none()).collect();
        match tasks.len() {
            0 => Task::None,
            1 => tasks.remove(0),
            _ => Task::Batch(tasks),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Task::None)
    }

    /// Messages scheduled with a delay, in order
    pub fn delayed_messages(&self) -> Vec<Message> {
        match self {
            Task::Delay { message, .. } => vec![message.clone()],
            Task::Batch(tasks) => tasks.iter().flat_map(Task::delayed_messages).collect(),
            _ => Vec::new(),
        }
    }
}
