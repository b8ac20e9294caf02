//! thng-scan library crate.
//!
//! Two independent components: a webcam [`camera::FrameSource`] that pushes
//! captured frames to an observer, and an [`evrythng::ThngReader`] that
//! resolves a single Thng over the platform REST API.

pub mod camera;
pub mod config;
pub mod evrythng;
