use crate::adapters::media_devices::{MediaDevices, MediaStream, VideoSurface};
use crate::models::media::{CameraStatus, CaptureFailure, FacingMode, Resolution, VideoConstraints};
use async_trait::async_trait;
use tracing::{info, warn};

/// Object-safe face of a [`CameraFeed`], so an overlay can own one without
/// knowing its device types.
#[async_trait]
pub trait Camera: Send {
    fn status(&self) -> CameraStatus;
    async fn acquire(
        &mut self,
        facing: FacingMode,
        ideal_resolution: Resolution,
    ) -> Result<(), CaptureFailure>;
    async fn retry(&mut self) -> Result<(), CaptureFailure>;
    fn teardown(&mut self);
}

/// Camera acquisition for the overlay background. Independent of match state.
///
/// Tracks are stopped on [`CameraFeed::teardown`] and on drop.
pub struct CameraFeed<D: MediaDevices, S: VideoSurface> {
    devices: D,
    surface: S,
    constraints: Option<VideoConstraints>,
    stream: Option<Box<dyn MediaStream>>,
    status: CameraStatus,
}

impl<D: MediaDevices, S: VideoSurface> CameraFeed<D, S> {
    pub fn new(devices: D, surface: S) -> Self {
        Self {
            devices,
            surface,
            constraints: None,
            stream: None,
            status: CameraStatus::Idle,
        }
    }

    pub fn status(&self) -> CameraStatus {
        self.status
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub async fn acquire(
        &mut self,
        facing: FacingMode,
        ideal_resolution: Resolution,
    ) -> Result<(), CaptureFailure> {
        let constraints = VideoConstraints {
            facing,
            ideal_resolution,
        };
        self.constraints = Some(constraints);
        self.start(constraints).await
    }

    /// Runs the last acquisition again with the same parameters.
    pub async fn retry(&mut self) -> Result<(), CaptureFailure> {
        let constraints = self.constraints.unwrap_or_default();
        self.constraints = Some(constraints);
        self.start(constraints).await
    }

    pub fn teardown(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            self.surface.detach();
            stream.stop_tracks();
            info!(tracks = stream.track_count(), "Stopped camera tracks");
        }
        self.status = CameraStatus::Idle;
    }

    async fn start(&mut self, constraints: VideoConstraints) -> Result<(), CaptureFailure> {
        self.teardown();
        self.status = CameraStatus::Starting;
        match self.devices.request_video(&constraints).await {
            Ok(stream) => {
                self.surface.attach(stream.as_ref());
                self.stream = Some(stream);
                self.status = CameraStatus::Live;
                info!(?constraints, "Camera stream ready");
                Ok(())
            }
            Err(e) => {
                let failure = e.classify();
                warn!(code = failure.code(), "Camera error: {e}");
                self.status = CameraStatus::Failed { failure };
                Err(failure)
            }
        }
    }
}

#[async_trait]
impl<D: MediaDevices, S: VideoSurface> Camera for CameraFeed<D, S> {
    fn status(&self) -> CameraStatus {
        CameraFeed::status(self)
    }

    async fn acquire(
        &mut self,
        facing: FacingMode,
        ideal_resolution: Resolution,
    ) -> Result<(), CaptureFailure> {
        CameraFeed::acquire(self, facing, ideal_resolution).await
    }

    async fn retry(&mut self) -> Result<(), CaptureFailure> {
        CameraFeed::retry(self).await
    }

    fn teardown(&mut self) {
        CameraFeed::teardown(self);
    }
}

impl<D: MediaDevices, S: VideoSurface> Drop for CameraFeed<D, S> {
    fn drop(&mut self) {
        self.teardown();
    }
}
