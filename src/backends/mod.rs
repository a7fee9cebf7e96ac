// SPDX-License-Identifier: MPL-2.0

//! Backend abstraction layer
//!
//! The app only ever talks to a capture device through the
//! [`camera::CaptureDevice`] trait. The bundled implementation is a virtual
//! device driven by configuration, which is what the terminal front end and
//! the scripted simulations run against.

pub mod camera;
