// SPDX-License-Identifier: MPL-2.0

//! Capture button
//!
//! Press and hold to record; drag up or down while holding to zoom.
//! The look of the button is derived from state on every frame:
//! - Disabled: shrunk and faded, ignores all input
//! - Idle: slightly smaller than full size
//! - Pressed: full size, pulsing while a recording runs

use super::gesture::{ActiveGesture, GestureArbiter};
use super::press::{PressEffect, PressMachine, RecordingId, RecordingState, SessionId};
use super::zoom::ZoomState;
use crate::app::state::{Message, Task};
use crate::backends::camera::{FlashMode, MediaKind, RecordingOptions, VideoFile};
use crate::constants::{PAN_ACTIVE_OFFSET_Y, button};
use crate::errors::{DeviceError, RecordingError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info};

/// Which of the three looks the button has
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonVisualState {
    Disabled,
    Idle,
    PressedHolding,
}

/// Target values for the button animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ButtonVisual {
    pub state: ButtonVisualState,
    pub scale: f64,
    pub opacity: f64,
    /// Repeat the press animation while recording
    pub pulsing: bool,
}

#[derive(Debug, Clone)]
pub struct CaptureButton {
    press: PressMachine,
    enabled: bool,
    flash: FlashMode,
    device_id: Option<String>,
    pan_full_zoom_factor: f64,
    /// Finger height at press-down, for pan activation
    press_y: Option<f64>,
}

impl CaptureButton {
    pub fn new(hold_delay: Duration, release_delay: Duration, pan_full_zoom_factor: f64) -> Self {
        Self {
            press: PressMachine::new(hold_delay, release_delay),
            enabled: false,
            flash: FlashMode::Off,
            device_id: None,
            pan_full_zoom_factor,
            press_y: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn flash(&self) -> FlashMode {
        self.flash
    }

    pub fn recording(&self) -> RecordingState {
        self.press.recording()
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_pressed()
    }

    pub fn press_machine(&self) -> &PressMachine {
        &self.press
    }

    /// Enable or disable the button. Disabling mid-press cancels the press,
    /// which stops a running recording.
    pub fn set_enabled(
        &mut self,
        enabled: bool,
        gestures: &mut GestureArbiter,
        now: Instant,
    ) -> Task {
        if self.enabled == enabled {
            return Task::none();
        }
        self.enabled = enabled;
        debug!(enabled, "Capture button enabled state changed");
        if enabled {
            Task::none()
        } else {
            self.cancel(gestures, now)
        }
    }

    /// Flash forwarded verbatim to the next recording
    pub fn set_flash(&mut self, flash: FlashMode) {
        self.flash = flash;
    }

    /// Device that recordings are started on
    pub fn set_device(&mut self, device_id: Option<String>) {
        self.device_id = device_id;
    }

    pub fn press_down(&mut self, y: f64, now: Instant) -> Task {
        if !self.enabled {
            return Task::none();
        }
        self.press_y = Some(y);
        let effects = self.press.press_down(now);
        self.run_effects(effects)
    }

    /// Finger moved while down. Activates pan-to-zoom once the finger has
    /// travelled far enough vertically, then drives the zoom.
    pub fn drag(&mut self, y: f64, gestures: &mut GestureArbiter, zoom: &mut ZoomState) -> bool {
        if !self.enabled || self.press.session().is_none() {
            return false;
        }

        let panning = matches!(gestures.active(), Some(ActiveGesture::Pan(_)));
        if !panning {
            let Some(press_y) = self.press_y else {
                return false;
            };
            if (y - press_y).abs() <= PAN_ACTIVE_OFFSET_Y {
                return false;
            }
            if !gestures.begin_pan(y, zoom, self.pan_full_zoom_factor) {
                return false;
            }
        }
        gestures.update_pan(y, zoom)
    }

    pub fn release(&mut self, gestures: &mut GestureArbiter, now: Instant) -> Task {
        gestures.end_pan();
        self.press_y = None;
        let effects = self.press.release(now);
        self.run_effects(effects)
    }

    pub fn cancel(&mut self, gestures: &mut GestureArbiter, now: Instant) -> Task {
        gestures.end_pan();
        self.press_y = None;
        let effects = self.press.cancel(now);
        self.run_effects(effects)
    }

    pub fn hold_check(&mut self, session: SessionId) -> Task {
        let effects = self.press.hold_check(session);
        self.run_effects(effects)
    }

    pub fn release_settled(&mut self, session: SessionId) -> Task {
        self.press.release_settled(session);
        Task::none()
    }

    pub fn recording_started(&mut self, recording: RecordingId, now: Instant) -> Task {
        let effects = self.press.recording_started(recording, now);
        self.run_effects(effects)
    }

    pub fn recording_start_failed(&mut self, recording: RecordingId, error: &RecordingError) -> Task {
        let effects = self.press.recording_start_failed(recording, error);
        self.run_effects(effects)
    }

    /// Final result of a recording. A finished file is handed on as
    /// captured media; the device resolves each recording only once.
    pub fn recording_finished(
        &mut self,
        recording: RecordingId,
        result: Result<VideoFile, RecordingError>,
    ) -> Task {
        match result {
            Ok(file) => {
                let effects = self.press.recording_ended(recording, None);
                info!(recording = %recording, path = %file.path.display(), "Video captured");
                Task::batch([
                    Task::done(Message::MediaCaptured(file, MediaKind::Video)),
                    self.run_effects(effects),
                ])
            }
            Err(error) => {
                let effects = self.press.recording_ended(recording, Some(&error));
                self.run_effects(effects)
            }
        }
    }

    pub fn stop_resolved(
        &mut self,
        recording: RecordingId,
        result: Result<(), RecordingError>,
    ) -> Task {
        let effects = self.press.stop_resolved(recording, result.as_ref().map(|_| ()));
        self.run_effects(effects)
    }

    /// Animation targets for the current state
    pub fn visual(&self) -> ButtonVisual {
        if !self.enabled {
            return ButtonVisual {
                state: ButtonVisualState::Disabled,
                scale: button::DISABLED_SCALE,
                opacity: button::DISABLED_OPACITY,
                pulsing: false,
            };
        }
        if self.press.is_pressed() {
            return ButtonVisual {
                state: ButtonVisualState::PressedHolding,
                scale: button::PRESSED_SCALE,
                opacity: 1.0,
                pulsing: self.press.recording().is_recording(),
            };
        }
        ButtonVisual {
            state: ButtonVisualState::Idle,
            scale: button::IDLE_SCALE,
            opacity: 1.0,
            pulsing: false,
        }
    }

    fn run_effects(&mut self, effects: Vec<PressEffect>) -> Task {
        Task::batch(effects.into_iter().map(|effect| match effect {
            PressEffect::ScheduleHoldCheck { session, after } => {
                Task::delay(after, Message::HoldCheck(session))
            }
            PressEffect::ScheduleReleaseSettle { session, after } => {
                Task::delay(after, Message::ReleaseSettled(session))
            }
            PressEffect::StartRecording { recording } => match &self.device_id {
                Some(device_id) => Task::StartRecording {
                    recording,
                    options: RecordingOptions {
                        device_id: device_id.clone(),
                        flash: self.flash,
                    },
                },
                None => Task::done(Message::RecordingStartFailed(
                    recording,
                    DeviceError::NoDeviceFound.into(),
                )),
            },
            PressEffect::StopRecording { recording } => Task::StopRecording { recording },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::zoom::ZoomRange;

    fn enabled_button() -> CaptureButton {
        let mut button = CaptureButton::new(
            Duration::from_millis(200),
            Duration::from_millis(500),
            0.7,
        );
        button.set_device(Some("back".to_string()));
        button.set_enabled(true, &mut GestureArbiter::default(), Instant::now());
        button
    }

    fn zoom() -> ZoomState {
        ZoomState::new(ZoomRange {
            min: 1.0,
            max: 30.0,
            neutral: 2.0,
        })
    }

    #[test]
    fn test_disabled_button_ignores_press() {
        let mut button = enabled_button();
        button.set_enabled(false, &mut GestureArbiter::default(), Instant::now());
        assert!(button.press_down(600.0, Instant::now()).is_none());
        assert_eq!(button.visual().state, ButtonVisualState::Disabled);
        assert_eq!(button.visual().opacity, button::DISABLED_OPACITY);
    }

    #[test]
    fn test_visual_follows_press() {
        let mut button = enabled_button();
        assert_eq!(button.visual().state, ButtonVisualState::Idle);
        button.press_down(600.0, Instant::now());
        let visual = button.visual();
        assert_eq!(visual.state, ButtonVisualState::PressedHolding);
        assert_eq!(visual.scale, button::PRESSED_SCALE);
        assert!(!visual.pulsing);
    }

    #[test]
    fn test_hold_forwards_flash_and_device() {
        let mut button = enabled_button();
        button.set_flash(FlashMode::On);
        let task = button.press_down(600.0, Instant::now());
        let Some(Message::HoldCheck(session)) = task.delayed_messages().first().cloned() else {
            panic!("expected hold check, got {:?}", task);
        };

        match button.hold_check(session) {
            Task::StartRecording { options, .. } => {
                assert_eq!(options.flash, FlashMode::On);
                assert_eq!(options.device_id, "back");
            }
            other => panic!("expected start, got {:?}", other),
        }
    }

    #[test]
    fn test_hold_without_device_fails_the_start() {
        let mut button = enabled_button();
        button.set_device(None);
        let task = button.press_down(600.0, Instant::now());
        let Some(Message::HoldCheck(session)) = task.delayed_messages().first().cloned() else {
            panic!("expected hold check, got {:?}", task);
        };

        let task = button.hold_check(session);
        assert!(
            matches!(
                task,
                Task::Done(Message::RecordingStartFailed(
                    _,
                    RecordingError::Device(DeviceError::NoDeviceFound)
                ))
            ),
            "got {:?}",
            task
        );
    }

    #[test]
    fn test_small_drag_does_not_start_pan() {
        let mut button = enabled_button();
        let mut gestures = GestureArbiter::default();
        let mut zoom = zoom();
        button.press_down(600.0, Instant::now());

        assert!(!button.drag(601.5, &mut gestures, &mut zoom));
        assert!(gestures.is_idle());
        assert!(button.drag(560.0, &mut gestures, &mut zoom));
        assert_eq!(zoom.value(), 2.0);
        assert!(button.drag(500.0, &mut gestures, &mut zoom));
        assert!(zoom.value() > 2.0);
    }

    #[test]
    fn test_drag_without_press_is_ignored() {
        let mut button = enabled_button();
        let mut gestures = GestureArbiter::default();
        let mut zoom = zoom();
        assert!(!button.drag(100.0, &mut gestures, &mut zoom));
        assert_eq!(zoom.value(), 2.0);
    }

    #[test]
    fn test_release_ends_pan() {
        let mut button = enabled_button();
        let mut gestures = GestureArbiter::default();
        let mut zoom = zoom();
        button.press_down(600.0, Instant::now());
        button.drag(500.0, &mut gestures, &mut zoom);
        assert!(!gestures.is_idle());

        button.release(&mut gestures, Instant::now());
        assert!(gestures.is_idle());
    }
}
