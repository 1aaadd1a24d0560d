//! Geolocation acquisition: bridges an asynchronous, permission-gated
//! position source into a [`LocationSession`].

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::app_config::AppConfig;
use crate::geo::Coordinates;
use crate::session::{GeolocationStatus, LocationSession};
use crate::stores::Store;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_MAX_AGE_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationFailure {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("position unavailable")]
    PositionUnavailable,
    #[error("location request timed out")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub timeout: Duration,
    /// A cached fix no older than this may be returned instead of a fresh one.
    pub maximum_age: Duration,
    pub high_accuracy: bool,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            maximum_age: Duration::from_secs(DEFAULT_MAX_AGE_SECS),
            high_accuracy: false,
        }
    }
}

impl GeolocationOptions {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.geo_timeout_secs),
            maximum_age: Duration::from_secs(config.geo_max_age_secs),
            high_accuracy: false,
        }
    }
}

/// A source of the visitor's position.
pub trait GeolocationProvider {
    fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> impl Future<Output = Result<Coordinates, GeolocationFailure>> + Send;
}

/// Provider for callers that already know the position (query parameters,
/// CLI flags).
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

impl GeolocationProvider for FixedPosition {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationFailure> {
        Ok(self.0)
    }
}

/// Run one geolocation request against `session`.
///
/// `provider` is `None` when the environment has no geolocation capability;
/// the session then moves straight to `error`. The session lock is released
/// while the provider is pending, so selections made in the meantime are
/// kept. A result arriving after a newer request started is dropped.
pub async fn locate<P: GeolocationProvider>(
    session: &Mutex<LocationSession>,
    provider: Option<&P>,
    stores: &[Store],
    options: &GeolocationOptions,
) -> GeolocationStatus {
    let Some(provider) = provider else {
        let mut session = session.lock().await;
        session.mark_unsupported();
        return session.status();
    };

    let ticket = session.lock().await.begin_locating();

    let outcome = tokio::time::timeout(options.timeout, provider.current_position(options))
        .await
        .unwrap_or(Err(GeolocationFailure::Timeout));

    if let Err(failure) = &outcome {
        tracing::info!(error = %failure, "geolocation request did not produce a position");
    }

    let mut session = session.lock().await;
    session.complete_locating(ticket, outcome, stores);
    session.status()
}
