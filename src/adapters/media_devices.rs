use crate::models::media::{CaptureFailure, VideoConstraints};
use async_trait::async_trait;

/// A failed capture request, as named by the device layer
/// (`NotAllowedError`, `NotFoundError`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceError {
    pub name: String,
    pub message: String,
}

impl MediaDeviceError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn classify(&self) -> CaptureFailure {
        match self.name.as_str() {
            "NotAllowedError" => CaptureFailure::PermissionDenied,
            _ if self.message.contains("Permission dismissed") => CaptureFailure::PermissionDenied,
            "NotFoundError" => CaptureFailure::DeviceNotFound,
            "NotReadableError" => CaptureFailure::DeviceBusy,
            _ => CaptureFailure::Unknown,
        }
    }
}

impl std::fmt::Display for MediaDeviceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

/// An acquired capture. Holding one holds the camera.
pub trait MediaStream: Send {
    fn track_count(&self) -> usize;
    fn stop_tracks(&mut self);
}

#[async_trait]
pub trait MediaDevices: Send + Sync {
    async fn request_video(
        &self,
        constraints: &VideoConstraints,
    ) -> Result<Box<dyn MediaStream>, MediaDeviceError>;
}

/// Where a live stream is displayed.
pub trait VideoSurface: Send {
    fn attach(&mut self, stream: &dyn MediaStream);
    fn detach(&mut self);
}
