//! ipresent-hw: camera capture for the attendance client.
//!
//! Provides V4L2 device access, conversion of raw device buffers into
//! RGB bitmaps, and a scoped capture adapter that owns the device handle
//! only while camera mode is active.

pub mod adapter;
pub mod camera;
pub mod frame;

pub use adapter::{CaptureDevice, CaptureError, DeviceOpener, MediaCaptureAdapter, V4l2Opener};
pub use camera::{Camera, CameraError, DeviceInfo, PixelFormat};
pub use frame::{Frame, FrameError};
