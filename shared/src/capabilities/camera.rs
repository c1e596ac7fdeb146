use async_trait::async_trait;
use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::permissions::CapabilityKind;
use crate::gate::{CapabilityFailure, GatedCapability, Interruption};

pub struct Camera<E> {
    context: CapabilityContext<CameraOperation, E>,
}

impl<E> Clone for Camera<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Camera<Ev> {
    type Operation = CameraOperation;
    type MappedSelf<MappedEv> = Camera<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Camera::new(self.context.map_event(f))
    }
}

impl<E> Camera<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<CameraOperation, E>) -> Self {
        Self { context }
    }

    /// Opens the platform capture UI. Waits for the user without a timeout.
    pub async fn capture_still_async(&self, config: CaptureConfig) -> CameraResult {
        self.context
            .request_from_shell(CameraOperation::CaptureStill { config })
            .await
    }
}

#[async_trait]
impl<E> GatedCapability for Camera<E>
where
    E: Send + 'static,
{
    type Options = CaptureConfig;
    type Output = ImageHandle;

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Camera
    }

    async fn invoke(&self, config: CaptureConfig) -> Result<ImageHandle, Interruption> {
        match self.capture_still_async(config).await {
            Ok(CameraOutput::Photo(handle)) => {
                handle.validated().map_err(|e| Interruption::Failed(e.into_failure()))
            }
            Ok(CameraOutput::Cancelled) | Err(CameraError::Cancelled) => {
                Err(Interruption::Cancelled)
            }
            Err(e) => Err(Interruption::Failed(e.into_failure())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOperation {
    CaptureStill { config: CaptureConfig },
}

impl Operation for CameraOperation {
    type Output = CameraResult;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CameraFacing {
    Front,
    #[default]
    Back,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CaptureConfig {
    pub facing: CameraFacing,
    pub save_to_library: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            facing: CameraFacing::Back,
            save_to_library: true,
        }
    }
}

impl CaptureConfig {
    #[must_use]
    pub fn with_facing(mut self, facing: CameraFacing) -> Self {
        self.facing = facing;
        self
    }

    #[must_use]
    pub fn with_save_to_library(mut self, save: bool) -> Self {
        self.save_to_library = save;
        self
    }
}

/// Reference to a photo owned by the platform. The core never holds the bytes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImageHandle {
    pub uri: String,
    pub mime_type: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size_bytes: Option<u64>,
}

impl ImageHandle {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            mime_type: None,
            width: None,
            height: None,
            size_bytes: None,
        }
    }

    #[must_use]
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn validated(self) -> Result<Self, CameraError> {
        if self.uri.trim().is_empty() {
            return Err(CameraError::InvalidImage {
                reason: "capture returned no image uri".into(),
            });
        }
        Ok(self)
    }

}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOutput {
    Photo(ImageHandle),
    Cancelled,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("capture cancelled by user")]
    Cancelled,

    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },
}

impl CameraError {
    #[must_use]
    pub fn into_failure(self) -> CapabilityFailure {
        match self {
            Self::Unavailable { .. } => CapabilityFailure::Unavailable,
            other => CapabilityFailure::Failed {
                message: other.to_string(),
            },
        }
    }
}

pub type CameraResult = Result<CameraOutput, CameraError>;
