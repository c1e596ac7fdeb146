#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod app;
pub mod auth;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod gate;
pub mod model;
pub mod view;

pub use app::App;
pub use auth::{Authenticator, Credentials, Password, StaticCredentials};
pub use capabilities::{Capabilities, CapabilityKind, Effect};
pub use config::{AppConfig, ConfigError};
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AppError, ErrorKind, ErrorSeverity, NoticeAction};
pub use event::Event;
pub use gate::{AttemptId, CapabilityFailure, CapabilityGate, GateStage, GatedCapability, Outcome};
pub use model::{ChatEntry, Coordinate, EntryId, EntryKind, EntryPayload, MessageLog, Model};
pub use view::{ChatView, EntryView, NoticeView, ScreenView, ViewModel};
