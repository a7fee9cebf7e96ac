// SPDX-License-Identifier: MPL-2.0

//! Zoom bounds and the current zoom factor

use crate::backends::camera::DeviceInfo;
use crate::errors::DeviceError;
use tracing::debug;

/// Zoom bounds of the active device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomRange {
    pub min: f64,
    pub max: f64,
    pub neutral: f64,
}

impl Default for ZoomRange {
    fn default() -> Self {
        Self {
            min: 1.0,
            max: 1.0,
            neutral: 1.0,
        }
    }
}

impl ZoomRange {
    /// Bounds for a device, with the max capped at `max_zoom_factor`.
    ///
    /// The cap takes the smaller of the two so the app never asks a device
    /// for more than it supports. Neutral is pulled inside the capped range.
    pub fn for_device(device: &DeviceInfo, max_zoom_factor: f64) -> Result<Self, DeviceError> {
        device.validate()?;
        let max = device.max_zoom.min(max_zoom_factor).max(device.min_zoom);
        let min = device.min_zoom;
        Ok(Self {
            min,
            max,
            neutral: device.neutral_zoom.clamp(min, max),
        })
    }

    /// `max(min, min(value, max))`
    pub fn clamp(&self, value: f64) -> f64 {
        self.min.max(value.min(self.max))
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Current zoom factor, always inside its range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomState {
    range: ZoomRange,
    value: f64,
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(ZoomRange::default())
    }
}

impl ZoomState {
    /// Start at the neutral zoom of `range`
    pub fn new(range: ZoomRange) -> Self {
        Self {
            range,
            value: range.neutral,
        }
    }

    pub fn range(&self) -> ZoomRange {
        self.range
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Write a new zoom, clamped to the range. NaN is ignored.
    pub fn set(&mut self, value: f64) {
        if value.is_nan() {
            return;
        }
        self.value = self.range.clamp(value);
    }

    /// Active device changed: adopt the new bounds and go back to neutral
    pub fn reset_to(&mut self, range: ZoomRange) {
        debug!(
            min = range.min,
            neutral = range.neutral,
            max = range.max,
            "Zoom range changed"
        );
        self.range = range;
        self.value = range.neutral;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::DevicePosition;

    fn device(min: f64, neutral: f64, max: f64) -> DeviceInfo {
        DeviceInfo {
            id: "d".to_string(),
            name: "D".to_string(),
            position: DevicePosition::Back,
            min_zoom: min,
            neutral_zoom: neutral,
            max_zoom: max,
            has_flash: false,
        }
    }

    #[test]
    fn test_range_caps_max_zoom() {
        let range = ZoomRange::for_device(&device(1.0, 2.0, 128.0), 30.0).unwrap();
        assert_eq!(range.max, 30.0);
        assert_eq!(range.min, 1.0);
        assert_eq!(range.neutral, 2.0);

        let range = ZoomRange::for_device(&device(1.0, 1.0, 4.0), 30.0).unwrap();
        assert_eq!(range.max, 4.0);
    }

    #[test]
    fn test_zoom_initializes_to_neutral() {
        let range = ZoomRange::for_device(&device(1.0, 2.0, 128.0), 30.0).unwrap();
        assert_eq!(ZoomState::new(range).value(), 2.0);
    }

    #[test]
    fn test_set_clamps_into_range() {
        let range = ZoomRange::for_device(&device(1.0, 2.0, 8.0), 30.0).unwrap();
        let mut zoom = ZoomState::new(range);
        for input in [-100.0, 0.0, 0.99, 1.0, 3.3, 8.0, 8.01, 1e9, f64::INFINITY] {
            zoom.set(input);
            assert!(zoom.value() >= 1.0 && zoom.value() <= 8.0, "{input}");
        }
        zoom.set(f64::NAN);
        assert_eq!(zoom.value(), 8.0);
    }

    #[test]
    fn test_reset_to_goes_back_to_neutral() {
        let back = ZoomRange::for_device(&device(1.0, 2.0, 128.0), 30.0).unwrap();
        let front = ZoomRange::for_device(&device(1.0, 1.0, 4.0), 30.0).unwrap();
        let mut zoom = ZoomState::new(back);
        zoom.set(20.0);
        zoom.reset_to(front);
        assert_eq!(zoom.value(), 1.0);
        assert_eq!(zoom.range(), front);
    }
}
