// SPDX-License-Identifier: MPL-2.0

//! Tap versus hold on the capture button
//!
//! A press only turns into a recording once it has been held for the hold
//! delay. The delayed check carries the id of the press that scheduled it
//! and does nothing unless that press is still the live one, so a quick tap
//! (or two) can never start a recording from a stale timer.
//!
//! The machine is pure: every input returns the [`PressEffect`]s the caller
//! has to carry out (timers and device calls), and every completion comes
//! back in as another input.
//!
//! Times are `tokio::time::Instant`, the clock the hold and release timers
//! run on.

use crate::errors::RecordingError;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Identity of one press, increasing with every press-down
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SessionId(u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "press#{}", self.0)
    }
}

/// Identity of one recording attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordingId(u64);

impl fmt::Display for RecordingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rec#{}", self.0)
    }
}

/// The live press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressSession {
    pub id: SessionId,
    pub started_at: Instant,
    /// Set once the hold check passed for this press
    pub is_holding: bool,
}

/// Recording lifecycle as seen by the button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    /// Start requested, waiting for the device to confirm
    PendingStart {
        recording: RecordingId,
        session: SessionId,
    },
    Recording {
        recording: RecordingId,
        session: SessionId,
        started_at: Instant,
    },
    /// Stop requested, waiting for the device to confirm
    Stopping { recording: RecordingId },
}

impl RecordingState {
    pub fn is_idle(&self) -> bool {
        matches!(self, RecordingState::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, RecordingState::Recording { .. })
    }

    pub fn recording_id(&self) -> Option<RecordingId> {
        match self {
            RecordingState::Idle => None,
            RecordingState::PendingStart { recording, .. }
            | RecordingState::Recording { recording, .. }
            | RecordingState::Stopping { recording } => Some(*recording),
        }
    }

    /// Seconds since the device confirmed the recording
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match self {
            RecordingState::Recording { started_at, .. } => {
                Some(now.saturating_duration_since(*started_at))
            }
            _ => None,
        }
    }
}

/// Coarse phase of the press itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressPhase {
    Idle,
    PressedWaiting,
    Recording,
}

/// Work the caller has to perform for the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressEffect {
    /// Call [`PressMachine::hold_check`] with `session` after `after`
    ScheduleHoldCheck { session: SessionId, after: Duration },
    /// Call [`PressMachine::release_settled`] with `session` after `after`
    ScheduleReleaseSettle { session: SessionId, after: Duration },
    /// Ask the device to start recording
    StartRecording { recording: RecordingId },
    /// Ask the device to stop recording
    StopRecording { recording: RecordingId },
}

#[derive(Debug, Clone)]
pub struct PressMachine {
    hold_delay: Duration,
    release_delay: Duration,
    next_session: u64,
    next_recording: u64,
    latest_session: Option<SessionId>,
    session: Option<PressSession>,
    recording: RecordingState,
    /// Press ended while the start was still pending
    stop_requested: bool,
    /// Press that passed its hold check while the previous recording was
    /// still finishing
    deferred_hold: Option<SessionId>,
    pressed: bool,
}

impl PressMachine {
    pub fn new(hold_delay: Duration, release_delay: Duration) -> Self {
        Self {
            hold_delay,
            release_delay,
            next_session: 1,
            next_recording: 1,
            latest_session: None,
            session: None,
            recording: RecordingState::Idle,
            stop_requested: false,
            deferred_hold: None,
            pressed: false,
        }
    }

    pub fn session(&self) -> Option<&PressSession> {
        self.session.as_ref()
    }

    pub fn recording(&self) -> RecordingState {
        self.recording
    }

    /// Pressed look: on at press-down, off a moment after release
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    pub fn phase(&self) -> PressPhase {
        match &self.session {
            None => PressPhase::Idle,
            Some(session) if session.is_holding => PressPhase::Recording,
            Some(_) => PressPhase::PressedWaiting,
        }
    }

    pub fn press_down(&mut self, now: Instant) -> Vec<PressEffect> {
        let mut effects = Vec::new();
        if self.session.is_some() {
            // Lost the release event; close the old press first
            effects.extend(self.release(now));
        }

        let id = SessionId(self.next_session);
        self.next_session += 1;
        self.latest_session = Some(id);
        self.session = Some(PressSession {
            id,
            started_at: now,
            is_holding: false,
        });
        self.pressed = true;
        debug!(session = %id, "Capture button pressed");

        effects.push(PressEffect::ScheduleHoldCheck {
            session: id,
            after: self.hold_delay,
        });
        effects
    }

    /// Hold delay elapsed for `session`
    pub fn hold_check(&mut self, session: SessionId) -> Vec<PressEffect> {
        if !self.is_live(session) {
            trace!(session = %session, "Hold check for a finished press, ignoring");
            return Vec::new();
        }

        if !self.recording.is_idle() {
            debug!(
                session = %session,
                state = ?self.recording,
                "Hold detected while the previous recording finishes, starting after it"
            );
            self.deferred_hold = Some(session);
            return Vec::new();
        }

        info!(session = %session, "Hold detected, starting recording");
        self.start_for(session)
    }

    /// Finger lifted
    pub fn release(&mut self, now: Instant) -> Vec<PressEffect> {
        let Some(session) = self.session.take() else {
            return Vec::new();
        };
        let held = now.saturating_duration_since(session.started_at);
        let mut effects = vec![PressEffect::ScheduleReleaseSettle {
            session: session.id,
            after: self.release_delay,
        }];

        match self.recording {
            RecordingState::PendingStart {
                recording,
                session: owner,
            } if owner == session.id => {
                debug!(recording = %recording, "Released before start confirmed, stop deferred");
                self.stop_requested = true;
            }
            RecordingState::Recording {
                recording,
                session: owner,
                ..
            } if owner == session.id => {
                info!(recording = %recording, held_ms = held.as_millis() as u64, "Released, stopping recording");
                self.recording = RecordingState::Stopping { recording };
                effects.push(PressEffect::StopRecording { recording });
            }
            _ => {
                debug!(
                    session = %session.id,
                    held_ms = held.as_millis() as u64,
                    "Short tap, no recording"
                );
            }
        }
        effects
    }

    /// Gesture cancelled by the system; same outcome as a release
    pub fn cancel(&mut self, now: Instant) -> Vec<PressEffect> {
        self.release(now)
    }

    /// Device accepted the start request
    pub fn recording_started(&mut self, recording: RecordingId, now: Instant) -> Vec<PressEffect> {
        let RecordingState::PendingStart {
            recording: pending,
            session,
        } = self.recording
        else {
            trace!(recording = %recording, "Start confirmation without pending start");
            return Vec::new();
        };
        if pending != recording {
            return Vec::new();
        }

        if self.stop_requested {
            self.stop_requested = false;
            self.recording = RecordingState::Stopping { recording };
            debug!(recording = %recording, "Start confirmed after release, stopping");
            return vec![PressEffect::StopRecording { recording }];
        }

        self.recording = RecordingState::Recording {
            recording,
            session,
            started_at: now,
        };
        Vec::new()
    }

    /// Device refused to start
    pub fn recording_start_failed(
        &mut self,
        recording: RecordingId,
        error: &RecordingError,
    ) -> Vec<PressEffect> {
        if self.recording.recording_id() != Some(recording) {
            return Vec::new();
        }
        warn!(recording = %recording, %error, "Failed to start recording");
        self.recording = RecordingState::Idle;
        self.stop_requested = false;
        self.clear_holding();
        self.resume_deferred_hold()
    }

    /// Device reported the final result of a recording. An error while
    /// recording ends it on the spot; no stop call follows.
    pub fn recording_ended(
        &mut self,
        recording: RecordingId,
        error: Option<&RecordingError>,
    ) -> Vec<PressEffect> {
        if self.recording.recording_id() != Some(recording) {
            return Vec::new();
        }
        match self.recording {
            RecordingState::PendingStart { .. } | RecordingState::Recording { .. } => {
                match error {
                    Some(error) => warn!(recording = %recording, %error, "Recording failed"),
                    None => info!(recording = %recording, "Recording ended by device"),
                }
                self.recording = RecordingState::Idle;
                self.stop_requested = false;
                self.clear_holding();
                self.resume_deferred_hold()
            }
            // Finished as part of the stop; Idle once the stop call resolves
            RecordingState::Stopping { .. } | RecordingState::Idle => Vec::new(),
        }
    }

    /// Stop call resolved, successfully or not. A press that was held
    /// meanwhile starts its own recording now.
    pub fn stop_resolved(
        &mut self,
        recording: RecordingId,
        result: Result<(), &RecordingError>,
    ) -> Vec<PressEffect> {
        if self.recording != (RecordingState::Stopping { recording }) {
            return Vec::new();
        }
        if let Err(error) = result {
            warn!(recording = %recording, %error, "Failed to stop recording");
        }
        self.recording = RecordingState::Idle;
        self.resume_deferred_hold()
    }

    /// Release linger elapsed for `session`. Returns true if the pressed
    /// look was cleared.
    pub fn release_settled(&mut self, session: SessionId) -> bool {
        if self.session.is_some() || self.latest_session != Some(session) {
            return false;
        }
        self.pressed = false;
        true
    }

    fn is_live(&self, session: SessionId) -> bool {
        self.session.as_ref().is_some_and(|s| s.id == session)
    }

    fn start_for(&mut self, session: SessionId) -> Vec<PressEffect> {
        let Some(live) = self.session.as_mut().filter(|s| s.id == session) else {
            return Vec::new();
        };
        live.is_holding = true;
        let recording = RecordingId(self.next_recording);
        self.next_recording += 1;
        self.recording = RecordingState::PendingStart { recording, session };
        self.stop_requested = false;
        debug!(session = %session, recording = %recording, "Requesting recording start");
        vec![PressEffect::StartRecording { recording }]
    }

    fn resume_deferred_hold(&mut self) -> Vec<PressEffect> {
        match self.deferred_hold.take() {
            Some(session) if self.is_live(session) => {
                info!(session = %session, "Previous recording finished, starting held press");
                self.start_for(session)
            }
            _ => Vec::new(),
        }
    }

    fn clear_holding(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.is_holding = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: Duration = Duration::from_millis(200);
    const RELEASE: Duration = Duration::from_millis(500);

    fn machine() -> PressMachine {
        PressMachine::new(HOLD, RELEASE)
    }

    fn hold_session(effects: &[PressEffect]) -> SessionId {
        effects
            .iter()
            .find_map(|e| match e {
                PressEffect::ScheduleHoldCheck { session, .. } => Some(*session),
                _ => None,
            })
            .expect("hold check scheduled")
    }

    fn started(effects: &[PressEffect]) -> Option<RecordingId> {
        effects.iter().find_map(|e| match e {
            PressEffect::StartRecording { recording } => Some(*recording),
            _ => None,
        })
    }

    #[test]
    fn test_tap_never_starts_recording() {
        let mut m = machine();
        let t0 = Instant::now();
        let session = hold_session(&m.press_down(t0));
        assert_eq!(m.phase(), PressPhase::PressedWaiting);

        let effects = m.release(t0 + Duration::from_millis(80));
        assert!(!effects.iter().any(|e| matches!(e, PressEffect::StopRecording { .. })));
        assert_eq!(m.phase(), PressPhase::Idle);

        // Timer fires late anyway
        assert!(m.hold_check(session).is_empty());
        assert!(m.recording().is_idle());
    }

    #[test]
    fn test_hold_starts_and_release_stops() {
        let mut m = machine();
        let t0 = Instant::now();
        let session = hold_session(&m.press_down(t0));

        let recording = started(&m.hold_check(session)).unwrap();
        assert_eq!(m.phase(), PressPhase::Recording);
        assert!(m.recording_started(recording, t0 + HOLD).is_empty());
        assert!(m.recording().is_recording());

        let effects = m.release(t0 + Duration::from_secs(2));
        assert!(effects.contains(&PressEffect::StopRecording { recording }));
        assert_eq!(m.recording(), RecordingState::Stopping { recording });

        m.stop_resolved(recording, Ok(()));
        assert!(m.recording().is_idle());
    }

    #[test]
    fn test_stale_timer_from_first_tap_is_ignored() {
        let mut m = machine();
        let t0 = Instant::now();
        let first = hold_session(&m.press_down(t0));
        m.release(t0 + Duration::from_millis(40));
        let second = hold_session(&m.press_down(t0 + Duration::from_millis(90)));
        assert_ne!(first, second);

        // First tap's timer fires while the second press is still down
        assert!(m.hold_check(first).is_empty());
        assert!(m.recording().is_idle());

        m.release(t0 + Duration::from_millis(150));
        assert!(m.hold_check(second).is_empty());
        assert!(m.recording().is_idle());
    }

    #[test]
    fn test_release_while_start_pending_stops_after_confirmation() {
        let mut m = machine();
        let t0 = Instant::now();
        let session = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(session)).unwrap();

        let effects = m.release(t0 + HOLD);
        assert!(!effects.iter().any(|e| matches!(e, PressEffect::StopRecording { .. })));

        let effects = m.recording_started(recording, t0 + HOLD);
        assert_eq!(effects, vec![PressEffect::StopRecording { recording }]);
        m.stop_resolved(recording, Ok(()));
        assert!(m.recording().is_idle());
    }

    #[test]
    fn test_start_failure_returns_to_idle() {
        let mut m = machine();
        let t0 = Instant::now();
        let session = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(session)).unwrap();

        m.recording_start_failed(recording, &RecordingError::AlreadyRecording);
        assert!(m.recording().is_idle());
        assert_eq!(m.phase(), PressPhase::PressedWaiting);

        // Releasing now is just a release
        let effects = m.release(t0 + Duration::from_secs(1));
        assert!(!effects.iter().any(|e| matches!(e, PressEffect::StopRecording { .. })));
    }

    #[test]
    fn test_device_error_while_recording_skips_stop() {
        let mut m = machine();
        let t0 = Instant::now();
        let session = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(session)).unwrap();
        m.recording_started(recording, t0 + HOLD);

        m.recording_ended(recording, Some(&RecordingError::NoStorage));
        assert!(m.recording().is_idle());

        let effects = m.release(t0 + Duration::from_secs(1));
        assert!(!effects.iter().any(|e| matches!(e, PressEffect::StopRecording { .. })));
    }

    #[test]
    fn test_stop_failure_still_returns_to_idle() {
        let mut m = machine();
        let t0 = Instant::now();
        let session = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(session)).unwrap();
        m.recording_started(recording, t0 + HOLD);
        m.release(t0 + Duration::from_secs(1));

        m.stop_resolved(recording, Err(&RecordingError::StopFailed("x".into())));
        assert!(m.recording().is_idle());
    }

    #[test]
    fn test_hold_while_previous_recording_stops_starts_after_stop() {
        let mut m = machine();
        let t0 = Instant::now();
        let first = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(first)).unwrap();
        m.recording_started(recording, t0 + HOLD);
        m.release(t0 + Duration::from_secs(1));

        let second = hold_session(&m.press_down(t0 + Duration::from_millis(1100)));
        assert!(m.hold_check(second).is_empty());
        assert_eq!(m.recording(), RecordingState::Stopping { recording });

        let next = started(&m.stop_resolved(recording, Ok(()))).unwrap();
        assert_ne!(next, recording);
        assert_eq!(
            m.recording(),
            RecordingState::PendingStart {
                recording: next,
                session: second
            }
        );
        assert_eq!(m.phase(), PressPhase::Recording);
    }

    #[test]
    fn test_deferred_hold_starts_after_device_error_on_pending_start() {
        let mut m = machine();
        let t0 = Instant::now();
        let first = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(first)).unwrap();
        m.release(t0 + Duration::from_millis(250));

        let second = hold_session(&m.press_down(t0 + Duration::from_millis(300)));
        assert!(m.hold_check(second).is_empty());

        let effects = m.recording_ended(recording, Some(&RecordingError::NoStorage));
        let next = started(&effects).unwrap();
        assert_eq!(
            m.recording(),
            RecordingState::PendingStart {
                recording: next,
                session: second
            }
        );
    }

    #[test]
    fn test_deferred_hold_dropped_when_released_before_stop() {
        let mut m = machine();
        let t0 = Instant::now();
        let first = hold_session(&m.press_down(t0));
        let recording = started(&m.hold_check(first)).unwrap();
        m.recording_started(recording, t0 + HOLD);
        m.release(t0 + Duration::from_secs(1));

        let second = hold_session(&m.press_down(t0 + Duration::from_millis(1100)));
        m.hold_check(second);
        m.release(t0 + Duration::from_millis(1400));

        assert!(m.stop_resolved(recording, Ok(())).is_empty());
        assert!(m.recording().is_idle());
    }

    #[test]
    fn test_pressed_flag_clears_only_for_latest_release() {
        let mut m = machine();
        let t0 = Instant::now();
        let first = hold_session(&m.press_down(t0));
        m.release(t0 + Duration::from_millis(50));
        assert!(m.is_pressed());

        let second = hold_session(&m.press_down(t0 + Duration::from_millis(100)));
        // First release linger ends while the second press is down
        assert!(!m.release_settled(first));
        assert!(m.is_pressed());

        m.release(t0 + Duration::from_millis(150));
        assert!(!m.release_settled(first));
        assert!(m.release_settled(second));
        assert!(!m.is_pressed());
    }

    #[test]
    fn test_session_ids_increase() {
        let mut m = machine();
        let t0 = Instant::now();
        let a = hold_session(&m.press_down(t0));
        let b = hold_session(&m.press_down(t0));
        assert!(b > a);
        assert_eq!(m.session().map(|s| s.id), Some(b));
    }
}
