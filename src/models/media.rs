use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    User,
    /// Rear camera on phones, which is what films the table.
    #[default]
    Environment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Default for Resolution {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// A video-only capture request. Facing and resolution are hints.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct VideoConstraints {
    pub facing: FacingMode,
    pub ideal_resolution: Resolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureFailure {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    Unknown,
}

const PERMISSION_REMEDIATION: &[&str] = &[
    "Click the camera icon in your browser's address bar",
    "Select \"Allow\" when prompted",
    "Or go to browser settings and enable camera for this site",
    "Refresh the page after granting permission",
];

impl CaptureFailure {
    pub const fn code(&self) -> &'static str {
        match self {
            CaptureFailure::PermissionDenied => "camera.permission_denied",
            CaptureFailure::DeviceNotFound => "camera.device_not_found",
            CaptureFailure::DeviceBusy => "camera.device_busy",
            CaptureFailure::Unknown => "camera.unknown",
        }
    }

    pub const fn message(&self) -> &'static str {
        match self {
            CaptureFailure::PermissionDenied => {
                "Camera access was denied. Please allow camera access to continue."
            }
            CaptureFailure::DeviceNotFound => "No camera found on this device.",
            CaptureFailure::DeviceBusy => "Camera is already in use by another application.",
            CaptureFailure::Unknown => {
                "Camera access unavailable. Please check your device settings."
            }
        }
    }

    /// Steps shown to the user alongside the message, if any.
    pub const fn remediation(&self) -> Option<&'static [&'static str]> {
        match self {
            CaptureFailure::PermissionDenied => Some(PERMISSION_REMEDIATION),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CameraStatus {
    Idle,
    Starting,
    Live,
    Failed { failure: CaptureFailure },
}
