//! Per-visitor location state: geolocation status, the resolved nearest
//! store, and the visitor's manual store/offering choices.
//!
//! A `LocationSession` is owned by whoever composes the page (a request
//! handler, a CLI command) and passed down explicitly. Nothing here is
//! persisted; a new visit starts from [`LocationSession::new`].

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geo::{nearest_store, Coordinates};
use crate::locate::GeolocationFailure;
use crate::stores::{Offering, Store};
use crate::visibility::{self, PriceDisplay, PriceDisplayPolicy, PriceRegion, VisibilityInputs};
use crate::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationStatus {
    #[default]
    Idle,
    Locating,
    Granted,
    Denied,
    Error,
}

impl std::fmt::Display for GeolocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeolocationStatus::Idle => write!(f, "idle"),
            GeolocationStatus::Locating => write!(f, "locating"),
            GeolocationStatus::Granted => write!(f, "granted"),
            GeolocationStatus::Denied => write!(f, "denied"),
            GeolocationStatus::Error => write!(f, "error"),
        }
    }
}

impl FromStr for GeolocationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "idle" => Ok(GeolocationStatus::Idle),
            "locating" => Ok(GeolocationStatus::Locating),
            "granted" => Ok(GeolocationStatus::Granted),
            "denied" => Ok(GeolocationStatus::Denied),
            "error" => Ok(GeolocationStatus::Error),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// Handle for one in-flight geolocation request.
///
/// Only the ticket from the most recent [`LocationSession::begin_locating`]
/// can complete the request; older tickets are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateTicket {
    generation: u64,
}

/// The nearest store as resolved for this session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedStore {
    pub store: Store,
    pub distance_miles: f64,
}

#[derive(Debug, Clone, Default)]
pub struct LocationSession {
    status: GeolocationStatus,
    user_coordinates: Option<Coordinates>,
    nearest: Option<ResolvedStore>,
    selected_store: Option<Store>,
    selected_offering: Option<Offering>,
    generation: u64,
}

impl LocationSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(&self) -> GeolocationStatus {
        self.status
    }

    #[must_use]
    pub fn user_coordinates(&self) -> Option<Coordinates> {
        self.user_coordinates
    }

    /// Nearest store; only meaningful once geolocation was granted.
    #[must_use]
    pub fn nearest(&self) -> Option<&ResolvedStore> {
        if self.status == GeolocationStatus::Granted {
            self.nearest.as_ref()
        } else {
            None
        }
    }

    #[must_use]
    pub fn selected_store(&self) -> Option<&Store> {
        self.selected_store.as_ref()
    }

    #[must_use]
    pub fn selected_offering(&self) -> Option<Offering> {
        self.selected_offering
    }

    /// Enter `locating`, dropping any earlier position and nearest result.
    pub fn begin_locating(&mut self) -> LocateTicket {
        self.generation += 1;
        self.status = GeolocationStatus::Locating;
        self.user_coordinates = None;
        self.nearest = None;
        tracing::debug!(generation = self.generation, "geolocation request started");
        LocateTicket {
            generation: self.generation,
        }
    }

    /// No geolocation capability at all; go straight to `error`.
    pub fn mark_unsupported(&mut self) {
        self.generation += 1;
        self.status = GeolocationStatus::Error;
        self.user_coordinates = None;
        self.nearest = None;
        tracing::debug!("geolocation unsupported");
    }

    /// Apply the outcome of a geolocation request.
    ///
    /// On success the resolver runs immediately against `stores`. Returns
    /// `false` without touching state when `ticket` belongs to a superseded
    /// request.
    pub fn complete_locating(
        &mut self,
        ticket: LocateTicket,
        outcome: Result<Coordinates, GeolocationFailure>,
        stores: &[Store],
    ) -> bool {
        if ticket.generation != self.generation || self.status != GeolocationStatus::Locating {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale geolocation result"
            );
            return false;
        }

        match outcome {
            Ok(position) => {
                self.status = GeolocationStatus::Granted;
                self.user_coordinates = Some(position);
                self.nearest = nearest_store(position, stores).map(|n| ResolvedStore {
                    store: n.store.clone(),
                    distance_miles: n.distance_miles,
                });
                tracing::debug!(
                    nearest = self.nearest.as_ref().map(|n| n.store.slug.as_str()),
                    "geolocation granted"
                );
            }
            Err(GeolocationFailure::PermissionDenied) => {
                self.status = GeolocationStatus::Denied;
                tracing::debug!("geolocation permission denied");
            }
            Err(failure) => {
                self.status = GeolocationStatus::Error;
                tracing::debug!(error = %failure, "geolocation failed");
            }
        }
        true
    }

    /// Manually pick a store. Switching to a different store drops the
    /// offering choice, since the new store may not provide it.
    pub fn select_store(&mut self, store: Store) {
        let same_store = self
            .active_store()
            .is_some_and(|active| active.slug == store.slug);
        if !same_store {
            self.selected_offering = None;
        }
        self.selected_store = Some(store);
    }

    /// Record a preferred offering. Ignored when the active store does not
    /// provide it.
    pub fn select_offering(&mut self, offering: Offering) {
        if let Some(store) = self.active_store() {
            if !store.offers(offering) {
                tracing::debug!(
                    store = %store.slug,
                    offering = %offering,
                    "ignoring offering not provided by active store"
                );
                return;
            }
        }
        self.selected_offering = Some(offering);
    }

    pub fn clear_selection(&mut self) {
        self.selected_store = None;
        self.selected_offering = None;
    }

    /// Manual selection, else the nearest store, else nothing.
    #[must_use]
    pub fn active_store(&self) -> Option<&Store> {
        self.selected_store
            .as_ref()
            .or_else(|| self.nearest().map(|n| &n.store))
    }

    /// The chosen offering when the active store provides it, else the active
    /// store's first offering.
    #[must_use]
    pub fn active_offering(&self) -> Option<Offering> {
        let store = self.active_store()?;
        self.selected_offering
            .filter(|o| store.offers(*o))
            .or_else(|| store.first_offering())
    }

    #[must_use]
    pub fn visibility_inputs(&self) -> VisibilityInputs {
        VisibilityInputs {
            has_selected_store: self.selected_store.is_some(),
            status: self.status,
            has_nearest_store: self.nearest().is_some(),
        }
    }

    #[must_use]
    pub fn prices_visible(&self) -> bool {
        visibility::prices_visible(&self.visibility_inputs())
    }

    /// What a page region should show for the active store and offering.
    #[must_use]
    pub fn price_display(&self, policy: &PriceDisplayPolicy, region: PriceRegion) -> PriceDisplay {
        visibility::price_display(
            self.active_store(),
            self.active_offering(),
            &self.visibility_inputs(),
            policy,
            region,
        )
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
