use serde::{Deserialize, Serialize};

use crate::capabilities::{CapabilityKind, LinkingError};
use crate::gate::{CapabilityFailure, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Info,
    Transient,
    Permanent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Authentication,
    Cancelled,
    PermissionDenied,
    PermissionBlocked,
    CapabilityUnavailable,
    Timeout,
    Capability,
    Linking,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Authentication => "AUTH_ERROR",
            Self::Cancelled => "CANCELLED",
            Self::PermissionDenied => "PERMISSION_DENIED",
            Self::PermissionBlocked => "PERMISSION_BLOCKED",
            Self::CapabilityUnavailable => "CAPABILITY_UNAVAILABLE",
            Self::Timeout => "TIMEOUT",
            Self::Capability => "CAPABILITY_ERROR",
            Self::Linking => "LINKING_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Cancelled => ErrorSeverity::Info,
            Self::Timeout | Self::Capability | Self::Linking => ErrorSeverity::Transient,
            Self::Authentication
            | Self::PermissionDenied
            | Self::PermissionBlocked
            | Self::CapabilityUnavailable => ErrorSeverity::Permanent,
        }
    }

    /// Whether starting a fresh attempt can reasonably succeed.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::PermissionDenied | Self::Timeout | Self::Capability | Self::Linking
        )
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Authentication => "Wrong!",
            Self::Cancelled => "Cancelled",
            Self::PermissionDenied => "Permission Required",
            Self::PermissionBlocked => "Permission Blocked",
            Self::CapabilityUnavailable => "Not Available",
            Self::Timeout | Self::Capability | Self::Linking => "Error",
        }
    }
}

/// Action a notice can offer besides dismissal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeAction {
    OpenSettings,
}

impl NoticeAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::OpenSettings => "Open Settings",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub capability: Option<CapabilityKind>,
    pub message: String,
    pub internal_message: Option<String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            capability: None,
            message: message.into(),
            internal_message: None,
        }
    }

    #[must_use]
    pub fn with_capability(mut self, capability: CapabilityKind) -> Self {
        self.capability = Some(capability);
        self
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    /// One error per non-success outcome; `None` for `Success`.
    #[must_use]
    pub fn from_outcome<T>(capability: CapabilityKind, outcome: &Outcome<T>) -> Option<Self> {
        let error = match outcome {
            Outcome::Success(_) => return None,
            Outcome::UserCancelled => Self::new(ErrorKind::Cancelled, "cancelled by user"),
            Outcome::PermissionDenied => {
                Self::new(ErrorKind::PermissionDenied, "permission denied")
            }
            Outcome::PermissionBlocked => {
                Self::new(ErrorKind::PermissionBlocked, "permission blocked")
            }
            Outcome::CapabilityError(failure) => match failure {
                CapabilityFailure::Unavailable => {
                    Self::new(ErrorKind::CapabilityUnavailable, failure.to_string())
                }
                CapabilityFailure::Timeout { .. } => {
                    Self::new(ErrorKind::Timeout, failure.to_string())
                }
                CapabilityFailure::Failed { message } => {
                    Self::new(ErrorKind::Capability, message.clone())
                }
            },
        };
        Some(error.with_capability(capability))
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    /// Location failures keep their own heading; everything else uses the kind's.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match (self.kind, self.capability) {
            (
                ErrorKind::Timeout | ErrorKind::Capability | ErrorKind::CapabilityUnavailable,
                Some(CapabilityKind::Location),
            ) => "Location Error",
            (kind, _) => kind.title(),
        }
    }

    #[must_use]
    pub const fn action(&self) -> Option<NoticeAction> {
        match self.kind {
            ErrorKind::PermissionBlocked => Some(NoticeAction::OpenSettings),
            _ => None,
        }
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        let subject = self.capability.map_or("This feature", CapabilityKind::label);
        let lower = subject.to_lowercase();
        match self.kind {
            ErrorKind::Authentication => "Incorrect username or password".into(),
            ErrorKind::Cancelled => format!("{subject} request was cancelled."),
            ErrorKind::PermissionDenied => {
                format!("{subject} access is required. Please allow it and try again.")
            }
            ErrorKind::PermissionBlocked => {
                format!("{subject} access is blocked. Enable {lower} from Settings.")
            }
            ErrorKind::CapabilityUnavailable => {
                format!("{subject} is not available on this device.")
            }
            ErrorKind::Timeout => {
                format!("Unable to get a {lower} result in time. Please try again.")
            }
            ErrorKind::Capability => self.message.clone(),
            ErrorKind::Linking => "Cannot open Google Maps.".into(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

impl From<LinkingError> for AppError {
    fn from(e: LinkingError) -> Self {
        Self::new(ErrorKind::Linking, "could not open map").with_internal(e.to_string())
    }
}
