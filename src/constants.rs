// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// The highest zoom factor the app will ever request, regardless of what the
/// device reports.
pub const MAX_ZOOM_FACTOR: f64 = 30.0;

/// Pinch scale at which the zoom reaches the device maximum.
///
/// The opposite end of the curve is `1 - 1 / SCALE_FULL_ZOOM`.
pub const SCALE_FULL_ZOOM: f64 = 3.0;

/// Share of the starting finger height at which a pan reaches full zoom.
///
/// With the default of 0.7 the finger has to travel 30% of the way to the
/// top of the screen to go from minimum to maximum zoom.
pub const PAN_FULL_ZOOM_FACTOR: f64 = 0.7;

/// Vertical travel (in pixels) before a drag on the capture button
/// activates the pan-to-zoom gesture.
pub const PAN_ACTIVE_OFFSET_Y: f64 = 2.0;

/// Delay before a press is committed to a hold (and recording starts)
pub const START_RECORDING_DELAY: Duration = Duration::from_millis(200);

/// How long the pressed look lingers after the finger is lifted
pub const RELEASE_ANIMATION_DELAY: Duration = Duration::from_millis(500);

/// Idle gap that ends a scroll-driven pinch session in the terminal
pub const PINCH_IDLE_TIMEOUT: Duration = Duration::from_millis(300);

/// Pinch scale applied per scroll wheel notch in the terminal
pub const PINCH_SCROLL_STEP: f64 = 1.08;

/// File name prefix for recorded videos
pub const VIDEO_FILE_PREFIX: &str = "VID";

/// File extension for recorded videos
pub const VIDEO_FILE_EXTENSION: &str = "mp4";

/// Capture button appearance per visual state
pub mod button {
    /// Scale when the button is disabled
    pub const DISABLED_SCALE: f64 = 0.6;

    /// Opacity when the button is disabled
    pub const DISABLED_OPACITY: f64 = 0.3;

    /// Scale at rest
    pub const IDLE_SCALE: f64 = 0.9;

    /// Scale while pressed or holding
    pub const PRESSED_SCALE: f64 = 1.0;
}

/// UI Constants
pub mod ui {
    /// Two preview clicks closer than this flip the camera
    pub const DOUBLE_CLICK_INTERVAL_MS: u64 = 300;

    /// Spacing between overlay controls and the screen edges
    pub const CONTENT_SPACING: u16 = 1;

    /// Height of one terminal row in pseudo pixels, used to feed
    /// row-based mouse positions into the pixel-based pan gesture
    pub const CELL_HEIGHT_PX: f64 = 16.0;

    /// Width of the capture button in terminal cells
    pub const CAPTURE_BUTTON_CELLS_WIDE: u16 = 12;

    /// Height of the capture button in terminal cells
    pub const CAPTURE_BUTTON_CELLS_HIGH: u16 = 5;

    /// Redraw interval for the terminal front end
    pub const FRAME_INTERVAL_MS: u64 = 33;
}
