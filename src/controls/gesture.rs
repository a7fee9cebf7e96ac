// SPDX-License-Identifier: MPL-2.0

//! Gesture to zoom translation
//!
//! Zoom is perceived logarithmically, so equal finger movement near the
//! start of a pinch should change the zoom less than the same movement near
//! the extremes. Two chained linear interpolations give that curve without
//! an explicit exponential:
//!
//! ```text
//! pinch scale  [1 - 1/S,  1,  S]  ->  [-1, 0, 1]
//! normalized   [-1,       0,  1]  ->  [min, start_zoom, max]
//! ```
//!
//! Both gestures capture their starting point, so repeated gestures never
//! drift and a gesture never makes the zoom jump when it begins.

use super::zoom::ZoomState;
use tracing::{debug, trace};

/// Piecewise-linear interpolation of `value` over `input -> output`,
/// clamped to the end outputs outside the domain.
///
/// `input` must be strictly increasing and the same length as `output`
/// (at least two points). `output` may decrease.
pub fn interpolate(value: f64, input: &[f64], output: &[f64]) -> f64 {
    debug_assert!(input.len() >= 2 && input.len() == output.len());

    let last = input.len() - 1;
    if value <= input[0] {
        return output[0];
    }
    if value >= input[last] {
        return output[last];
    }

    // Segment containing value
    let segment = input[1..last]
        .iter()
        .position(|&edge| value < edge)
        .unwrap_or(last - 1);

    let (x0, x1) = (input[segment], input[segment + 1]);
    let (y0, y1) = (output[segment], output[segment + 1]);
    if x1 == x0 {
        return y0;
    }
    y0 + (value - x0) / (x1 - x0) * (y1 - y0)
}

/// Pinch gesture in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchGesture {
    start_zoom: f64,
    scale_full_zoom: f64,
}

impl PinchGesture {
    pub fn begin(zoom: &ZoomState, scale_full_zoom: f64) -> Self {
        Self {
            start_zoom: zoom.value(),
            scale_full_zoom,
        }
    }

    pub fn start_zoom(&self) -> f64 {
        self.start_zoom
    }

    /// Zoom for a pinch `scale` reported relative to the gesture start
    pub fn zoom_for_scale(&self, scale: f64, zoom: &ZoomState) -> f64 {
        let s = self.scale_full_zoom;
        let range = zoom.range();
        let normalized = interpolate(
            scale,
            &[1.0 - 1.0 / s, 1.0, s],
            &[-1.0, 0.0, 1.0],
        );
        interpolate(
            normalized,
            &[-1.0, 0.0, 1.0],
            &[range.min, self.start_zoom, range.max],
        )
    }
}

/// Vertical drag on the held capture button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    start_y: f64,
    offset_y: f64,
    full_zoom_factor: f64,
}

impl PanGesture {
    /// Anchor the pan so the finger's current height maps to the current
    /// zoom. `full_zoom_factor` (0.7 by default) sets the height, as a share
    /// of `start_y`, at which the zoom reaches its maximum.
    pub fn begin(start_y: f64, zoom: &ZoomState, full_zoom_factor: f64) -> Self {
        let range = zoom.range();
        let y_for_full_zoom = start_y * full_zoom_factor;
        let offset_y = interpolate(
            zoom.value(),
            &[range.min, range.max],
            &[0.0, start_y - y_for_full_zoom],
        );
        Self {
            start_y,
            offset_y,
            full_zoom_factor,
        }
    }

    pub fn offset_y(&self) -> f64 {
        self.offset_y
    }

    /// Zoom for the finger at absolute height `y`. Up (smaller y) zooms in.
    pub fn zoom_for_y(&self, y: f64, zoom: &ZoomState) -> f64 {
        let range = zoom.range();
        let y_for_full_zoom = self.start_y * self.full_zoom_factor;
        if y_for_full_zoom >= self.start_y {
            // start_y at the very top: nowhere left to drag
            return zoom.value();
        }
        interpolate(
            y - self.offset_y,
            &[y_for_full_zoom, self.start_y],
            &[range.max, range.min],
        )
    }
}

/// Gesture currently allowed to write the zoom
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActiveGesture {
    Pinch(PinchGesture),
    Pan(PanGesture),
}

/// Lets at most one recognizer drive the zoom at a time
///
/// A recognizer has to `begin_*` successfully before its updates are
/// applied. While one gesture is active, the other cannot begin and its
/// updates are dropped.
#[derive(Debug, Clone, Default)]
pub struct GestureArbiter {
    active: Option<ActiveGesture>,
}

impl GestureArbiter {
    pub fn active(&self) -> Option<&ActiveGesture> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    pub fn begin_pinch(&mut self, zoom: &ZoomState, scale_full_zoom: f64) -> bool {
        if self.active.is_some() {
            trace!("Pinch rejected, another gesture is active");
            return false;
        }
        let pinch = PinchGesture::begin(zoom, scale_full_zoom);
        debug!(start_zoom = pinch.start_zoom(), "Pinch started");
        self.active = Some(ActiveGesture::Pinch(pinch));
        true
    }

    /// Apply a pinch update. Returns false when no pinch is active.
    pub fn update_pinch(&mut self, scale: f64, zoom: &mut ZoomState) -> bool {
        let Some(ActiveGesture::Pinch(pinch)) = &self.active else {
            return false;
        };
        let value = pinch.zoom_for_scale(scale, zoom);
        zoom.set(value);
        trace!(scale, zoom = zoom.value(), "Pinch update");
        true
    }

    pub fn end_pinch(&mut self) {
        if matches!(self.active, Some(ActiveGesture::Pinch(_))) {
            debug!("Pinch ended");
            self.active = None;
        }
    }

    pub fn begin_pan(&mut self, start_y: f64, zoom: &ZoomState, full_zoom_factor: f64) -> bool {
        if self.active.is_some() {
            trace!("Pan rejected, another gesture is active");
            return false;
        }
        let pan = PanGesture::begin(start_y, zoom, full_zoom_factor);
        debug!(start_y, offset_y = pan.offset_y(), "Pan started");
        self.active = Some(ActiveGesture::Pan(pan));
        true
    }

    /// Apply a pan update. Returns false when no pan is active.
    pub fn update_pan(&mut self, y: f64, zoom: &mut ZoomState) -> bool {
        let Some(ActiveGesture::Pan(pan)) = &self.active else {
            return false;
        };
        let value = pan.zoom_for_y(y, zoom);
        zoom.set(value);
        trace!(y, zoom = zoom.value(), "Pan update");
        true
    }

    pub fn end_pan(&mut self) {
        if matches!(self.active, Some(ActiveGesture::Pan(_))) {
            debug!("Pan ended");
            self.active = None;
        }
    }

    /// Drop whatever gesture is active (device change, focus loss)
    pub fn cancel(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::zoom::ZoomRange;

    fn zoom(min: f64, neutral: f64, max: f64) -> ZoomState {
        ZoomState::new(ZoomRange { min, max, neutral })
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_interpolate_clamps_outside_domain() {
        let input = [0.0, 1.0, 2.0];
        let output = [10.0, 20.0, 40.0];
        assert_eq!(interpolate(-5.0, &input, &output), 10.0);
        assert_eq!(interpolate(5.0, &input, &output), 40.0);
        assert!(approx(interpolate(0.5, &input, &output), 15.0));
        assert!(approx(interpolate(1.5, &input, &output), 30.0));
    }

    #[test]
    fn test_interpolate_decreasing_output() {
        let value = interpolate(75.0, &[70.0, 100.0], &[30.0, 1.0]);
        assert!(value < 30.0 && value > 1.0);
    }

    #[test]
    fn test_pinch_identity_at_scale_one() {
        let state = zoom(1.0, 2.0, 30.0);
        let pinch = PinchGesture::begin(&state, 3.0);
        assert_eq!(pinch.zoom_for_scale(1.0, &state), 2.0);
    }

    #[test]
    fn test_pinch_reaches_bounds() {
        let state = zoom(1.0, 2.0, 30.0);
        let pinch = PinchGesture::begin(&state, 3.0);
        assert_eq!(pinch.zoom_for_scale(1.0 - 1.0 / 3.0, &state), 1.0);
        assert_eq!(pinch.zoom_for_scale(0.1, &state), 1.0);
        assert_eq!(pinch.zoom_for_scale(3.0, &state), 30.0);
        assert_eq!(pinch.zoom_for_scale(10.0, &state), 30.0);
    }

    #[test]
    fn test_pinch_is_monotonic() {
        let state = zoom(1.0, 5.0, 30.0);
        let pinch = PinchGesture::begin(&state, 3.0);
        let mut previous = f64::MIN;
        for step in 0..=60 {
            let scale = 0.5 + step as f64 * 0.05;
            let value = pinch.zoom_for_scale(scale, &state);
            assert!(value >= previous);
            previous = value;
        }
    }

    #[test]
    fn test_pinch_uses_zoom_at_gesture_start() {
        let mut state = zoom(1.0, 2.0, 30.0);
        state.set(10.0);
        let pinch = PinchGesture::begin(&state, 3.0);
        state.set(20.0);
        assert_eq!(pinch.zoom_for_scale(1.0, &state), 10.0);
    }

    #[test]
    fn test_pan_does_not_jump_at_start() {
        for current in [1.0, 4.0, 17.5, 30.0] {
            let mut state = zoom(1.0, 2.0, 30.0);
            state.set(current);
            let pan = PanGesture::begin(600.0, &state, 0.7);
            assert!(approx(pan.zoom_for_y(600.0, &state), current), "{current}");
        }
    }

    #[test]
    fn test_pan_up_zooms_in() {
        let state = zoom(1.0, 1.0, 30.0);
        let pan = PanGesture::begin(600.0, &state, 0.7);
        let lower = pan.zoom_for_y(580.0, &state);
        let higher = pan.zoom_for_y(500.0, &state);
        assert!(higher > lower);
        assert_eq!(pan.zoom_for_y(420.0, &state), 30.0);
        assert_eq!(pan.zoom_for_y(900.0, &state), 1.0);
    }

    #[test]
    fn test_arbiter_allows_one_gesture() {
        let mut state = zoom(1.0, 2.0, 30.0);
        let mut arbiter = GestureArbiter::default();

        assert!(arbiter.begin_pan(600.0, &state, 0.7));
        assert!(!arbiter.begin_pinch(&state, 3.0));
        assert!(!arbiter.update_pinch(3.0, &mut state));
        assert_eq!(state.value(), 2.0);

        // Ending the wrong gesture is a no-op
        arbiter.end_pinch();
        assert!(!arbiter.is_idle());

        arbiter.end_pan();
        assert!(arbiter.begin_pinch(&state, 3.0));
        assert!(arbiter.update_pinch(3.0, &mut state));
        assert_eq!(state.value(), 30.0);
    }
}
