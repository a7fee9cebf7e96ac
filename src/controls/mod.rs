// SPDX-License-Identifier: GPL-3.0-only

//! Capture controls
//!
//! Pure state for the camera screen's interactive parts. Nothing here talks
//! to a device or waits on a timer; the press machine describes the work it
//! needs as effects and the app turns them into tasks.
//!
//! - [`zoom`]: Zoom range derived from the device and the current factor
//! - [`gesture`]: Pinch and pan mappings plus the one-gesture-at-a-time arbiter
//! - [`press`]: Press sessions and the recording lifecycle
//! - [`capture_button`]: The hold-to-record button tying the above together

pub mod capture_button;
pub mod gesture;
pub mod press;
pub mod zoom;
