mod camera;
mod dialog;
mod linking;
mod location;
mod permissions;

pub use self::camera::{
    CameraError, CameraFacing, CameraOperation, CameraOutput, CameraResult, CaptureConfig,
    ImageHandle,
};
pub use self::dialog::{DialogChoice, DialogOperation};
pub use self::linking::{LinkingError, LinkingOperation, LinkingResult};
pub use self::location::{
    FixOptions, LocationError, LocationFix, LocationOperation, LocationResult,
    DEFAULT_FIX_TIMEOUT_MS, MAX_FIX_TIMEOUT_MS, MIN_FIX_TIMEOUT_MS,
};
pub use self::permissions::{
    CapabilityKind, PermissionState, PermissionsOperation, PermissionsOutput, RationalePrompt,
};

// Render and Compose are used straight from Crux.
pub use crux_core::compose::Compose;
pub use crux_core::render::Render;

pub use self::camera::Camera;
pub use self::dialog::Dialog;
pub use self::linking::Linking;
pub use self::location::Location;
pub use self::permissions::Permissions;

use crate::app::App;
use crate::event::Event;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub render: Render<Event>,
    pub permissions: Permissions<Event>,
    pub dialog: Dialog<Event>,
    pub location: Location<Event>,
    pub camera: Camera<Event>,
    pub linking: Linking<Event>,

    #[effect(skip)]
    pub compose: Compose<Event>,
}
