// SPDX-License-Identifier: GPL-3.0-only

//! Scripted gesture playback
//!
//! Replays a timed list of input events against the app without a terminal.
//! Scripts are JSON:
//!
//! ```json
//! [
//!   { "at_ms": 0,    "event": { "type": "press", "y": 600 } },
//!   { "at_ms": 400,  "event": { "type": "drag", "y": 480 } },
//!   { "at_ms": 1500, "event": { "type": "release" } }
//! ]
//! ```

use crate::app::state::{CapturedMedia, Message, Screen};
use crate::app::{AppModel, Runtime};
use crate::backends::camera::{CaptureDevice, PermissionKind};
use crate::controls::press::RecordingState;
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One input event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Ask for every permission that is still missing
    RequestPermissions,
    Press { y: f64 },
    Drag { y: f64 },
    Release,
    Cancel,
    PinchStart,
    Pinch { scale: f64 },
    PinchEnd,
    Flip,
    ToggleFlash,
    Focus { foreground: bool },
}

impl ScriptEvent {
    fn into_messages(self, model: &AppModel) -> Vec<Message> {
        match self {
            ScriptEvent::RequestPermissions => PermissionKind::ALL
                .into_iter()
                .filter(|kind| !model.permissions().get(*kind).is_authorized())
                .map(Message::RequestPermission)
                .collect(),
            ScriptEvent::Press { y } => vec![Message::CapturePressed { y }],
            ScriptEvent::Drag { y } => vec![Message::CaptureDragged { y }],
            ScriptEvent::Release => vec![Message::CaptureReleased],
            ScriptEvent::Cancel => vec![Message::CaptureCancelled],
            ScriptEvent::PinchStart => vec![Message::PinchStarted],
            ScriptEvent::Pinch { scale } => vec![Message::PinchChanged(scale)],
            ScriptEvent::PinchEnd => vec![Message::PinchEnded],
            ScriptEvent::Flip => vec![Message::FlipCamera],
            ScriptEvent::ToggleFlash => vec![Message::ToggleFlash],
            ScriptEvent::Focus { foreground } => vec![Message::FocusChanged(foreground)],
        }
    }
}

/// Event with its offset from the start of the script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    pub at_ms: u64,
    pub event: ScriptEvent,
}

/// A timed event list, sorted by time
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Script {
    steps: Vec<ScriptStep>,
}

impl Script {
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by_key(|s| s.at_ms);
        Self { steps }
    }

    pub fn parse(json: &str) -> AppResult<Self> {
        let steps: Vec<ScriptStep> = serde_json::from_str(json)?;
        Ok(Self::new(steps))
    }

    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| AppError::Other(format!("{}: {}", path.display(), e)))?;
        Self::parse(&json)
    }

    pub fn steps(&self) -> &[ScriptStep] {
        &self.steps
    }
}

/// What the app looked like after the script ran
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub screen: Screen,
    pub zoom: f64,
    pub device: Option<String>,
    pub recording: RecordingState,
    pub captured: Vec<CapturedMedia>,
}

/// Play `script` against a fresh app on `device`, then let pending timers
/// and device calls settle. A press left down by the script is cancelled
/// first.
pub async fn run(
    script: &Script,
    model: AppModel,
    device: Arc<dyn CaptureDevice>,
) -> SimulationReport {
    let mut runtime = Runtime::new(model, device);
    let mut elapsed = 0u64;

    for step in script.steps() {
        if step.at_ms > elapsed {
            runtime
                .run_for(Duration::from_millis(step.at_ms - elapsed))
                .await;
            elapsed = step.at_ms;
        }
        debug!(at_ms = step.at_ms, event = ?step.event, "Script event");
        for message in step.event.clone().into_messages(runtime.model()) {
            runtime.dispatch(message);
        }
    }

    // A press still down when the script ends would record forever
    if runtime.model().camera().button.press_machine().session().is_some() {
        info!(at_ms = elapsed, "Script ended mid-press, lifting the finger");
        runtime.dispatch(Message::CaptureCancelled);
    }
    runtime.run_until_idle().await;

    let model = runtime.model();
    let report = SimulationReport {
        screen: model.screen(),
        zoom: model.camera().zoom.value(),
        device: model.camera().active_device.as_ref().map(|d| d.name.clone()),
        recording: model.camera().button.recording(),
        captured: model.camera().captured.clone(),
    };
    info!(
        captured = report.captured.len(),
        zoom = report.zoom,
        "Simulation finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sorts_steps() {
        let script = Script::parse(
            r#"[
                {"at_ms": 500, "event": {"type": "release"}},
                {"at_ms": 0, "event": {"type": "press", "y": 600}},
                {"at_ms": 250, "event": {"type": "pinch", "scale": 1.5}}
            ]"#,
        )
        .unwrap();
        let times: Vec<u64> = script.steps().iter().map(|s| s.at_ms).collect();
        assert_eq!(times, vec![0, 250, 500]);
        assert_eq!(script.steps()[0].event, ScriptEvent::Press { y: 600.0 });
    }

    #[test]
    fn test_parse_rejects_unknown_event() {
        let result = Script::parse(r#"[{"at_ms": 0, "event": {"type": "wave"}}]"#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
