//! Scoped ownership of the camera device while camera mode is active.
//!
//! [`MediaCaptureAdapter`] is either inactive (no device handle) or active
//! (exactly one open device). The handle is released on every path out of
//! the active state: [`MediaCaptureAdapter::deactivate`], dropping the
//! adapter, or dropping an activation future before it completes.

use crate::camera::{Camera, CameraError};
use crate::frame::Frame;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("camera unavailable: {0}")]
    DeviceAccess(#[source] CameraError),
    #[error("camera activation aborted: {0}")]
    ActivationAborted(String),
    /// `capture_frame` was called without a prior successful `activate`.
    /// Callers are expected to check [`MediaCaptureAdapter::is_active`].
    #[error("capture requested while the camera is inactive")]
    Inactive,
    #[error("frame capture failed: {0}")]
    Frame(#[source] CameraError),
}

/// An open capture device that can produce frames on demand.
pub trait CaptureDevice: Send + 'static {
    fn capture(&mut self) -> Result<Frame, CameraError>;
}

/// Strategy for acquiring a capture device. Opening may block.
pub trait DeviceOpener: Send + Sync + 'static {
    type Device: CaptureDevice;

    fn open(&self) -> Result<Self::Device, CameraError>;
}

impl CaptureDevice for Camera {
    fn capture(&mut self) -> Result<Frame, CameraError> {
        self.capture_frame()
    }
}

/// Opens a V4L2 device by path and discards warmup frames so that
/// auto-exposure has settled before the first user capture.
#[derive(Debug, Clone)]
pub struct V4l2Opener {
    pub device_path: String,
    pub warmup_frames: usize,
}

impl V4l2Opener {
    pub fn new(device_path: impl Into<String>, warmup_frames: usize) -> Self {
        Self {
            device_path: device_path.into(),
            warmup_frames,
        }
    }
}

impl DeviceOpener for V4l2Opener {
    type Device = Camera;

    fn open(&self) -> Result<Camera, CameraError> {
        let camera = Camera::open(&self.device_path)?;
        if self.warmup_frames > 0 {
            tracing::debug!(count = self.warmup_frames, "discarding warmup frames");
            for _ in 0..self.warmup_frames {
                let _ = camera.capture_frame();
            }
        }
        Ok(camera)
    }
}

/// Owns the camera device handle while active.
pub struct MediaCaptureAdapter<O: DeviceOpener> {
    opener: Arc<O>,
    device: Option<O::Device>,
}

impl<O: DeviceOpener> MediaCaptureAdapter<O> {
    pub fn new(opener: O) -> Self {
        Self {
            opener: Arc::new(opener),
            device: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.device.is_some()
    }

    /// Request device access. Opening runs on the blocking pool so the
    /// caller's event loop is suspended rather than stalled.
    ///
    /// On failure the adapter stays inactive. Activating an already active
    /// adapter is a no-op.
    pub async fn activate(&mut self) -> Result<(), CaptureError> {
        if self.device.is_some() {
            return Ok(());
        }

        let opener = Arc::clone(&self.opener);
        let device = tokio::task::spawn_blocking(move || opener.open())
            .await
            .map_err(|e| CaptureError::ActivationAborted(e.to_string()))?
            .map_err(|e| {
                tracing::warn!(error = %e, "camera activation failed");
                CaptureError::DeviceAccess(e)
            })?;

        tracing::info!("camera active");
        self.device = Some(device);
        Ok(())
    }

    /// Release the device. Safe to call when already inactive.
    pub fn deactivate(&mut self) {
        if let Some(device) = self.device.take() {
            drop(device);
            tracing::info!("camera released");
        }
    }

    /// Grab one frame from the active device.
    pub fn capture_frame(&mut self) -> Result<Frame, CaptureError> {
        let device = self.device.as_mut().ok_or(CaptureError::Inactive)?;
        device.capture().map_err(CaptureError::Frame)
    }
}

impl<O: DeviceOpener> Drop for MediaCaptureAdapter<O> {
    fn drop(&mut self) {
        self.deactivate();
    }
}
