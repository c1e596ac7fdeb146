use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A device capability that sits behind an OS permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityKind {
    Location,
    Camera,
}

impl CapabilityKind {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::Camera => "Camera",
        }
    }

    #[must_use]
    pub fn rationale(self) -> RationalePrompt {
        let message = match self {
            Self::Location => "Please allow location access so your current position can be shared in the chat.",
            Self::Camera => "Please allow camera access so you can take a photo and send it to the chat.",
        };
        RationalePrompt {
            capability: self,
            title: "Permission Required".into(),
            message: message.into(),
            proceed_label: "Allow".into(),
            cancel_label: "Cancel".into(),
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Content of the dialog shown before the OS permission prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RationalePrompt {
    pub capability: CapabilityKind,
    pub title: String,
    pub message: String,
    pub proceed_label: String,
    pub cancel_label: String,
}

/// Authorization state as reported by the platform. Observed, never stored
/// across attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    Undetermined,
    Granted,
    Denied,
    PermanentlyBlocked,
    Unavailable,
}

impl PermissionState {
    /// Whether the OS will still show its own prompt.
    #[must_use]
    pub const fn can_request(self) -> bool {
        matches!(self, Self::Undetermined | Self::Denied)
    }
}

pub struct Permissions<E> {
    context: CapabilityContext<PermissionsOperation, E>,
}

impl<E> Clone for Permissions<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Permissions<Ev> {
    type Operation = PermissionsOperation;
    type MappedSelf<MappedEv> = Permissions<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Permissions::new(self.context.map_event(f))
    }
}

impl<E> Permissions<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<PermissionsOperation, E>) -> Self {
        Self { context }
    }

    pub async fn check_async(&self, kind: CapabilityKind) -> PermissionState {
        let output = self
            .context
            .request_from_shell(PermissionsOperation::Check(kind))
            .await;
        output.into_state()
    }

    pub async fn request_async(&self, kind: CapabilityKind) -> PermissionState {
        let output = self
            .context
            .request_from_shell(PermissionsOperation::Request(kind))
            .await;
        output.into_state()
    }

    pub fn open_settings<F>(&self, callback: F)
    where
        F: FnOnce(bool) -> E + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(PermissionsOperation::OpenSettings)
                .await;
            let opened = matches!(output, PermissionsOutput::SettingsOpened(true));
            context.update_app(callback(opened));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionsOperation {
    Check(CapabilityKind),
    Request(CapabilityKind),
    OpenSettings,
}

impl Operation for PermissionsOperation {
    type Output = PermissionsOutput;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum PermissionsOutput {
    State(PermissionState),
    SettingsOpened(bool),
}

impl PermissionsOutput {
    /// A shell answering a state query with anything but a state is treated
    /// as not granted.
    #[must_use]
    pub fn into_state(self) -> PermissionState {
        match self {
            Self::State(state) => state,
            Self::SettingsOpened(_) => {
                tracing::warn!("permission query answered with a settings result");
                PermissionState::Denied
            }
        }
    }
}
