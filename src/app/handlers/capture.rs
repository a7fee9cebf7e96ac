// SPDX-License-Identifier: GPL-3.0-only

//! Capture handlers
//!
//! Routes press, drag and recording completion messages to the capture
//! button.

use crate::app::AppModel;
use crate::app::state::Task;
use crate::backends::camera::VideoFile;
use crate::controls::press::{RecordingId, SessionId};
use crate::errors::RecordingError;
use tokio::time::Instant;

impl AppModel {
    pub(crate) fn handle_capture_pressed(&mut self, y: f64) -> Task {
        self.camera.button.press_down(y, Instant::now())
    }

    pub(crate) fn handle_capture_dragged(&mut self, y: f64) -> Task {
        self.camera
            .button
            .drag(y, &mut self.camera.gestures, &mut self.camera.zoom);
        Task::none()
    }

    pub(crate) fn handle_capture_released(&mut self) -> Task {
        self.camera
            .button
            .release(&mut self.camera.gestures, Instant::now())
    }

    pub(crate) fn handle_capture_cancelled(&mut self) -> Task {
        self.camera
            .button
            .cancel(&mut self.camera.gestures, Instant::now())
    }

    pub(crate) fn handle_hold_check(&mut self, session: SessionId) -> Task {
        self.camera.button.hold_check(session)
    }

    pub(crate) fn handle_release_settled(&mut self, session: SessionId) -> Task {
        self.camera.button.release_settled(session)
    }

    pub(crate) fn handle_recording_started(&mut self, recording: RecordingId) -> Task {
        self.camera
            .button
            .recording_started(recording, Instant::now())
    }

    pub(crate) fn handle_recording_start_failed(
        &mut self,
        recording: RecordingId,
        error: RecordingError,
    ) -> Task {
        self.camera.button.recording_start_failed(recording, &error)
    }

    pub(crate) fn handle_recording_finished(
        &mut self,
        recording: RecordingId,
        result: Result<VideoFile, RecordingError>,
    ) -> Task {
        self.camera.button.recording_finished(recording, result)
    }

    pub(crate) fn handle_stop_resolved(
        &mut self,
        recording: RecordingId,
        result: Result<(), RecordingError>,
    ) -> Task {
        self.camera.button.stop_resolved(recording, result)
    }
}
