use async_trait::async_trait;
use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::permissions::CapabilityKind;
use crate::gate::{CapabilityFailure, GatedCapability, Interruption};
use crate::model::Coordinate;

pub const DEFAULT_FIX_TIMEOUT_MS: u64 = 15_000;
pub const MIN_FIX_TIMEOUT_MS: u64 = 1_000;
pub const MAX_FIX_TIMEOUT_MS: u64 = 120_000;

pub struct Location<E> {
    context: CapabilityContext<LocationOperation, E>,
}

impl<E> Clone for Location<E> {
    fn clone(&self) -> Self {
        Self {
            context: self.context.clone(),
        }
    }
}

impl<Ev> Capability<Ev> for Location<Ev> {
    type Operation = LocationOperation;
    type MappedSelf<MappedEv> = Location<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Location::new(self.context.map_event(f))
    }
}

impl<E> Location<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<LocationOperation, E>) -> Self {
        Self { context }
    }

    /// Single-shot position request. The shell enforces `options.timeout_ms`.
    pub async fn current_fix_async(&self, options: FixOptions) -> LocationResult {
        let options = options.validated();
        self.context
            .request_from_shell(LocationOperation::GetCurrentFix(options))
            .await
    }
}

#[async_trait]
impl<E> GatedCapability for Location<E>
where
    E: Send + 'static,
{
    type Options = FixOptions;
    type Output = Coordinate;

    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Location
    }

    async fn invoke(&self, options: FixOptions) -> Result<Coordinate, Interruption> {
        let timeout_ms = options.validated().timeout_ms;
        let fix = self
            .current_fix_async(options)
            .await
            .map_err(|e| Interruption::Failed(e.into_failure(timeout_ms)))?;

        fix.coordinate().map_err(|e| {
            Interruption::Failed(CapabilityFailure::Failed {
                message: e.to_string(),
            })
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationOperation {
    GetCurrentFix(FixOptions),
}

impl Operation for LocationOperation {
    type Output = LocationResult;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct FixOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
}

impl Default for FixOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: DEFAULT_FIX_TIMEOUT_MS,
        }
    }
}

impl FixOptions {
    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.clamp(MIN_FIX_TIMEOUT_MS, MAX_FIX_TIMEOUT_MS);
        self
    }

    #[must_use]
    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    #[must_use]
    pub fn validated(mut self) -> Self {
        self.timeout_ms = self.timeout_ms.clamp(MIN_FIX_TIMEOUT_MS, MAX_FIX_TIMEOUT_MS);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_m: Option<f64>,
}

impl LocationFix {
    pub fn coordinate(&self) -> Result<Coordinate, crate::model::CoordinateError> {
        Coordinate::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum LocationError {
    #[error("location request timed out")]
    Timeout,

    #[error("location services unavailable")]
    Unavailable,

    #[error("location permission denied")]
    PermissionDenied,

    #[error("location failed: {message}")]
    Failed { message: String },
}

impl LocationError {
    /// Permission loss between the check and the fix is reported as a plain
    /// failure; the gate has already seen `Granted` for this attempt.
    #[must_use]
    pub fn into_failure(self, timeout_ms: u64) -> CapabilityFailure {
        match self {
            Self::Timeout => CapabilityFailure::Timeout { timeout_ms },
            Self::Unavailable => CapabilityFailure::Unavailable,
            Self::PermissionDenied => CapabilityFailure::Failed {
                message: self.to_string(),
            },
            Self::Failed { message } => CapabilityFailure::Failed { message },
        }
    }
}

pub type LocationResult = Result<LocationFix, LocationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fix_options_defaults() {
        let options = FixOptions::default();
        assert!(options.high_accuracy);
        assert_eq!(options.timeout_ms, 15_000);
    }

    #[test]
    fn test_fix_options_timeout_is_clamped() {
        assert_eq!(FixOptions::default().with_timeout_ms(10).timeout_ms, MIN_FIX_TIMEOUT_MS);
        assert_eq!(
            FixOptions::default().with_timeout_ms(10_000_000).timeout_ms,
            MAX_FIX_TIMEOUT_MS
        );

        let raw = FixOptions {
            high_accuracy: false,
            timeout_ms: 0,
        };
        assert_eq!(raw.validated().timeout_ms, MIN_FIX_TIMEOUT_MS);
    }

    #[test]
    fn test_timeout_maps_to_timeout_failure() {
        assert_eq!(
            LocationError::Timeout.into_failure(15_000),
            CapabilityFailure::Timeout { timeout_ms: 15_000 }
        );
        assert_eq!(
            LocationError::Unavailable.into_failure(15_000),
            CapabilityFailure::Unavailable
        );
        assert!(matches!(
            LocationError::Failed { message: "no gps".into() }.into_failure(1_000),
            CapabilityFailure::Failed { message } if message == "no gps"
        ));
    }

    #[test]
    fn test_fix_out_of_range_is_rejected() {
        let fix = LocationFix {
            latitude: 123.0,
            longitude: 0.0,
            accuracy_m: None,
        };
        assert!(fix.coordinate().is_err());

        let fix = LocationFix {
            latitude: 37.7749,
            longitude: -122.4194,
            accuracy_m: Some(5.0),
        };
        let coord = fix.coordinate().unwrap();
        assert_eq!(coord.lat(), 37.7749);
        assert_eq!(coord.lng(), -122.4194);
    }
}
