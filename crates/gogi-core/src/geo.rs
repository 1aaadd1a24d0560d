//! Great-circle distance and nearest-store resolution.
//!
//! Distances are in statute miles using a fixed 3959-mile earth radius and
//! are reported rounded to one decimal place.

use serde::{Deserialize, Serialize};

use crate::stores::Store;
use crate::CoreError;

pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// A validated latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    lat: f64,
    lng: f64,
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] when either value is not
    /// finite or falls outside `[-90, 90]` / `[-180, 180]`.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoreError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);
        if valid {
            Ok(Self { lat, lng })
        } else {
            Err(CoreError::InvalidCoordinates { lat, lng })
        }
    }

    #[must_use]
    pub fn lat(self) -> f64 {
        self.lat
    }

    #[must_use]
    pub fn lng(self) -> f64 {
        self.lng
    }
}

/// Haversine distance between two points, unrounded.
#[must_use]
pub fn haversine_miles(a: Coordinates, b: Coordinates) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_MILES * h.sqrt().min(1.0).asin()
}

#[must_use]
pub fn round_to_tenth(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}

/// A store paired with its rounded distance from the visitor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Nearest<'a> {
    pub store: &'a Store,
    pub distance_miles: f64,
}

/// Closest store to `origin`, or `None` when no store has coordinates.
///
/// Single pass; ties go to the first store encountered. Stores without
/// coordinates are skipped.
#[must_use]
pub fn nearest_store(origin: Coordinates, stores: &[Store]) -> Option<Nearest<'_>> {
    let mut best: Option<(&Store, f64)> = None;

    for store in stores {
        let Some(position) = store.coordinates() else {
            continue;
        };
        let distance = haversine_miles(origin, position);
        match best {
            Some((_, min)) if distance >= min => {}
            _ => best = Some((store, distance)),
        }
    }

    best.map(|(store, distance)| Nearest {
        store,
        distance_miles: round_to_tenth(distance),
    })
}

/// Every located store ordered by ascending distance; equal distances keep
/// directory order.
#[must_use]
pub fn rank_by_distance(origin: Coordinates, stores: &[Store]) -> Vec<Nearest<'_>> {
    let mut ranked: Vec<(&Store, f64)> = stores
        .iter()
        .filter_map(|store| {
            store
                .coordinates()
                .map(|position| (store, haversine_miles(origin, position)))
        })
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    ranked
        .into_iter()
        .map(|(store, distance)| Nearest {
            store,
            distance_miles: round_to_tenth(distance),
        })
        .collect()
}
