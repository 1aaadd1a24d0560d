use axum::{
    extract::{Query, State},
    Extension, Json,
};
use gogi_core::{
    locate, Coordinates, FixedPosition, GeolocationFailure, GeolocationOptions,
    GeolocationProvider, GeolocationStatus, LocationSession, Offering, PriceDisplay, PriceRegion,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::middleware::RequestId;

use super::stores::StoreItem;
use super::{map_db_error, parse_position, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize, Default)]
pub(super) struct PricesQuery {
    pub region: Option<String>,
    pub store: Option<String>,
    pub offering: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    /// Outcome of a client-side lookup that produced no position.
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct PricesData {
    pub status: GeolocationStatus,
    pub active_store: Option<String>,
    pub active_offering: Option<Offering>,
    pub nearest: Option<StoreItem>,
    pub prices_visible: bool,
    pub region: PriceRegion,
    pub region_visible: bool,
    pub display: PriceDisplay,
}

/// Where the visitor's position comes from for this request.
#[derive(Debug, Clone, Copy)]
enum PositionSource {
    Unrequested,
    Known(Coordinates),
    Failed(GeolocationFailure),
}

/// Replays a lookup failure the client already observed.
struct ReportedFailure(GeolocationFailure);

impl GeolocationProvider for ReportedFailure {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Coordinates, GeolocationFailure> {
        Err(self.0)
    }
}

#[derive(Debug)]
struct ParsedQuery {
    region: PriceRegion,
    store: Option<String>,
    offering: Option<Offering>,
    position: PositionSource,
}

fn parse_query(request_id: &str, query: PricesQuery) -> Result<ParsedQuery, ApiError> {
    let invalid = |message: String| ApiError::new(request_id, "validation_error", message);

    let region = query
        .region
        .as_deref()
        .map(str::parse::<PriceRegion>)
        .transpose()
        .map_err(|e| invalid(e.to_string()))?
        .unwrap_or(PriceRegion::Hero);

    let offering = query
        .offering
        .as_deref()
        .map(str::parse::<Offering>)
        .transpose()
        .map_err(|e| invalid(e.to_string()))?;

    let status = query
        .status
        .as_deref()
        .map(str::parse::<GeolocationStatus>)
        .transpose()
        .map_err(|e| invalid(e.to_string()))?;

    let coordinates =
        parse_position(request_id, query.lat.as_deref(), query.lng.as_deref())?;

    let position = match (coordinates, status) {
        (Some(position), None) => PositionSource::Known(position),
        (Some(_), Some(_)) => {
            return Err(invalid("status cannot be combined with lat/lng".to_string()));
        }
        (None, None | Some(GeolocationStatus::Idle)) => PositionSource::Unrequested,
        (None, Some(GeolocationStatus::Denied)) => {
            PositionSource::Failed(GeolocationFailure::PermissionDenied)
        }
        (None, Some(GeolocationStatus::Error)) => {
            PositionSource::Failed(GeolocationFailure::PositionUnavailable)
        }
        (None, Some(other)) => {
            return Err(invalid(format!("status {other} requires lat and lng")));
        }
    };

    Ok(ParsedQuery {
        region,
        store: query.store,
        offering,
        position,
    })
}

/// Evaluate the price gate for one visitor snapshot.
///
/// The request is replayed through a fresh [`LocationSession`] in the order a
/// visitor produces it: manual store choice, geolocation, then offering.
pub(super) async fn get_prices(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PricesQuery>,
) -> Result<Json<ApiResponse<PricesData>>, ApiError> {
    let parsed = parse_query(&req_id.0, query)?;

    let stores = gogi_db::list_active_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    let policy = gogi_db::get_price_display_policy(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let session = Mutex::new(LocationSession::new());

    if let Some(slug) = parsed.store.as_deref() {
        let store = stores
            .iter()
            .find(|s| s.slug == slug)
            .cloned()
            .ok_or_else(|| {
                ApiError::new(
                    req_id.0.clone(),
                    "not_found",
                    format!("store {slug} not found"),
                )
            })?;
        session.lock().await.select_store(store);
    }

    match parsed.position {
        PositionSource::Unrequested => {}
        PositionSource::Known(position) => {
            locate(
                &session,
                Some(&FixedPosition(position)),
                &stores,
                &state.geo_options,
            )
            .await;
        }
        PositionSource::Failed(failure) => {
            locate(
                &session,
                Some(&ReportedFailure(failure)),
                &stores,
                &state.geo_options,
            )
            .await;
        }
    }

    let mut session = session.into_inner();
    if let Some(offering) = parsed.offering {
        session.select_offering(offering);
    }

    let inputs = session.visibility_inputs();
    let data = PricesData {
        status: session.status(),
        active_store: session.active_store().map(|s| s.slug.clone()),
        active_offering: session.active_offering(),
        nearest: session
            .nearest()
            .map(|n| StoreItem::new(&n.store, Some(n.distance_miles))),
        prices_visible: session.prices_visible(),
        region: parsed.region,
        region_visible: gogi_core::region_prices_visible(&inputs, &policy, parsed.region),
        display: session.price_display(&policy, parsed.region),
    };

    tracing::debug!(
        status = %data.status,
        active_store = data.active_store.as_deref(),
        region = %data.region,
        prices_visible = data.prices_visible,
        "evaluated price visibility"
    );

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
