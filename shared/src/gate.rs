//! Permission-gated capability invocation.
//!
//! [`CapabilityGate::invoke`] walks one attempt through the rationale dialog,
//! a fresh permission check, an OS request when the permission is still
//! requestable, and finally the capability itself. Every path ends in exactly
//! one [`Outcome`]. Nothing is retried; the caller starts a new attempt.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::capabilities::{CapabilityKind, Dialog, PermissionState, Permissions};

/// A platform capability that may only run once permission is confirmed.
#[async_trait]
pub trait GatedCapability: Send + Sync {
    type Options: Send + 'static;
    type Output: Send + 'static;

    fn kind(&self) -> CapabilityKind;

    async fn invoke(&self, options: Self::Options) -> Result<Self::Output, Interruption>;
}

/// Why a capability invocation did not produce data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Interruption {
    Cancelled,
    Failed(CapabilityFailure),
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CapabilityFailure {
    #[error("capability unavailable on this device")]
    Unavailable,

    #[error("timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("{message}")]
    Failed { message: String },
}

/// Terminal result of one gated invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Outcome<T> {
    Success(T),
    UserCancelled,
    PermissionDenied,
    PermissionBlocked,
    CapabilityError(CapabilityFailure),
}

impl<T> Outcome<T> {
    /// Only blocked permissions need the OS settings affordance.
    #[must_use]
    pub const fn offers_settings(&self) -> bool {
        matches!(self, Self::PermissionBlocked)
    }

    pub fn map<U, F>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Success(value) => Outcome::Success(f(value)),
            Self::UserCancelled => Outcome::UserCancelled,
            Self::PermissionDenied => Outcome::PermissionDenied,
            Self::PermissionBlocked => Outcome::PermissionBlocked,
            Self::CapabilityError(failure) => Outcome::CapabilityError(failure),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Success(_) => "success",
            Self::UserCancelled => "user_cancelled",
            Self::PermissionDenied => "permission_denied",
            Self::PermissionBlocked => "permission_blocked",
            Self::CapabilityError(_) => "capability_error",
        }
    }
}

/// Where an attempt currently waits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStage {
    AwaitingRationale,
    CheckingPermission,
    RequestingPermission,
    Invoking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(Uuid);

impl AttemptId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub struct CapabilityGate<E> {
    permissions: Permissions<E>,
    dialog: Dialog<E>,
}

impl<E> CapabilityGate<E>
where
    E: Send + 'static,
{
    pub fn new(permissions: Permissions<E>, dialog: Dialog<E>) -> Self {
        Self {
            permissions,
            dialog,
        }
    }

    /// Runs one attempt. `progress` is told each stage before the gate
    /// suspends on it.
    #[instrument(skip_all, fields(attempt = %attempt, capability = %capability.kind()))]
    pub async fn invoke<C, P>(
        &self,
        attempt: AttemptId,
        capability: &C,
        options: C::Options,
        explain: bool,
        progress: P,
    ) -> Outcome<C::Output>
    where
        C: GatedCapability,
        P: Fn(GateStage) + Send + Sync,
    {
        let kind = capability.kind();

        if explain {
            progress(GateStage::AwaitingRationale);
            let choice = self.dialog.confirm_async(kind.rationale()).await;
            if !choice.is_proceed() {
                info!("rationale declined");
                return Outcome::UserCancelled;
            }
        }

        progress(GateStage::CheckingPermission);
        let mut state = self.permissions.check_async(kind).await;
        debug!(?state, "permission checked");

        if state.can_request() {
            progress(GateStage::RequestingPermission);
            state = self.permissions.request_async(kind).await;
            debug!(?state, "permission requested");
        }

        match state {
            PermissionState::Granted => {}
            PermissionState::Denied | PermissionState::Undetermined => {
                info!("permission denied");
                return Outcome::PermissionDenied;
            }
            PermissionState::PermanentlyBlocked => {
                info!("permission blocked");
                return Outcome::PermissionBlocked;
            }
            PermissionState::Unavailable => {
                warn!("capability unavailable");
                return Outcome::CapabilityError(CapabilityFailure::Unavailable);
            }
        }

        progress(GateStage::Invoking);
        match capability.invoke(options).await {
            Ok(data) => Outcome::Success(data),
            Err(Interruption::Cancelled) => {
                info!("capability cancelled by user");
                Outcome::UserCancelled
            }
            Err(Interruption::Failed(failure)) => {
                warn!(%failure, "capability failed");
                Outcome::CapabilityError(failure)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlight {
    pub attempt: AttemptId,
    pub stage: Option<GateStage>,
}

/// At most one attempt per capability kind.
#[derive(Debug, Clone, Default)]
pub struct AttemptTracker {
    in_flight: HashMap<CapabilityKind, InFlight>,
}

impl AttemptTracker {
    /// Returns `None` while an attempt for `kind` is still running.
    pub fn begin(&mut self, kind: CapabilityKind) -> Option<AttemptId> {
        if self.in_flight.contains_key(&kind) {
            return None;
        }
        let attempt = AttemptId::generate();
        self.in_flight.insert(
            kind,
            InFlight {
                attempt,
                stage: None,
            },
        );
        Some(attempt)
    }

    /// Records progress; stale attempts are ignored.
    pub fn advance(&mut self, attempt: AttemptId, stage: GateStage) -> bool {
        match self.in_flight.values_mut().find(|f| f.attempt == attempt) {
            Some(flight) => {
                flight.stage = Some(stage);
                true
            }
            None => false,
        }
    }

    /// Clears the attempt; `false` means it was unknown or already finished.
    pub fn finish(&mut self, kind: CapabilityKind, attempt: AttemptId) -> bool {
        match self.in_flight.get(&kind) {
            Some(flight) if flight.attempt == attempt => {
                self.in_flight.remove(&kind);
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_busy(&self, kind: CapabilityKind) -> bool {
        self.in_flight.contains_key(&kind)
    }

    #[must_use]
    pub fn stage(&self, kind: CapabilityKind) -> Option<GateStage> {
        self.in_flight.get(&kind).and_then(|f| f.stage)
    }
}
