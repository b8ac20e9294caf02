//! Camera capture module for webcam access and frame delivery.
//!
//! This module provides a high-level API for camera capture operations:
//! - Device enumeration via [`list_devices`]
//! - Frame capture and observer delivery via [`FrameSource`]
//! - Configuration via [`CameraSettings`] and [`Resolution`]

mod capture_loop;
mod device;
mod frame_utils;
mod source;
mod types;

pub use device::list_devices;
pub use frame_utils::{convert_to_rgb, crop, mirror_horizontal};
pub use source::{FrameObserver, FrameSource};
pub use types::{
    CameraError, CameraInfo, CameraSettings, DeviceOrientation, Frame, FrameFormat, Resolution,
};
