// SPDX-License-Identifier: GPL-3.0-only

//! holdcam - hold-to-record camera screen
//!
//! Press and hold the capture button to record video; release to stop.
//! While holding, sliding up or down zooms, and a pinch zooms at any time.
//!
//! # Architecture
//!
//! - [`controls`]: Pure zoom, gesture, and press/recording state machines
//! - [`app`]: Screens, messages, handlers, and the task runtime
//! - [`backends`]: The capture device trait and the virtual device
//! - [`config`]: User configuration handling
//! - [`simulation`]: Scripted gesture playback
//! - [`terminal`]: Terminal front end
//!
//! # Example
//!
//! ```ignore
//! // Run the terminal app:
//! // holdcam
//! // Replay a gesture script:
//! // holdcam simulate script.json --authorized
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod controls;
pub mod errors;
pub mod simulation;
pub mod terminal;

// Re-export commonly used types
pub use app::{AppModel, Message, Runtime, Screen, Task};
pub use config::Config;
pub use errors::{AppError, AppResult};
