use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use gogi_core::{rank_by_distance, Offering, Store};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::RequestId;

use super::{map_db_error, parse_position, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize, Default)]
pub(super) struct PositionQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

/// Public store listing. Prices are only served by `/api/v1/prices`.
#[derive(Debug, Serialize)]
pub(super) struct StoreItem {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub phone: String,
    pub phone_display: String,
    pub hours: Vec<String>,
    pub offerings: Vec<Offering>,
    pub distance_miles: Option<f64>,
}

impl StoreItem {
    pub(super) fn new(store: &Store, distance_miles: Option<f64>) -> Self {
        Self {
            id: store.id,
            slug: store.slug.clone(),
            name: store.name.clone(),
            street: store.street.clone(),
            city: store.city.clone(),
            state: store.state.clone(),
            postal_code: store.postal_code.clone(),
            latitude: store.latitude,
            longitude: store.longitude,
            phone: store.phone.clone(),
            phone_display: store.phone_display.clone(),
            hours: store.hours.clone(),
            offerings: store.offerings.clone(),
            distance_miles,
        }
    }
}

pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<ApiResponse<Vec<StoreItem>>>, ApiError> {
    let position = parse_position(&req_id.0, query.lat.as_deref(), query.lng.as_deref())?;

    let stores = gogi_db::list_active_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = match position {
        None => stores.iter().map(|s| StoreItem::new(s, None)).collect(),
        Some(origin) => {
            let ranked = rank_by_distance(origin, &stores);
            let mut items: Vec<StoreItem> = ranked
                .iter()
                .map(|n| StoreItem::new(n.store, Some(n.distance_miles)))
                .collect();
            items.extend(
                stores
                    .iter()
                    .filter(|s| s.coordinates().is_none())
                    .map(|s| StoreItem::new(s, None)),
            );
            items
        }
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<StoreItem>>, ApiError> {
    let store = gogi_db::get_store_by_slug(&state.pool, &slug)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "not_found",
                format!("store {slug} not found"),
            )
        })?;

    Ok(Json(ApiResponse {
        data: StoreItem::new(&store, None),
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn nearest_store(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<PositionQuery>,
) -> Result<Json<ApiResponse<Option<StoreItem>>>, ApiError> {
    let origin = parse_position(&req_id.0, query.lat.as_deref(), query.lng.as_deref())?
        .ok_or_else(|| {
            ApiError::new(
                req_id.0.clone(),
                "validation_error",
                "lat and lng are required",
            )
        })?;

    let stores = gogi_db::list_active_stores(&state.pool)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = gogi_core::nearest_store(origin, &stores)
        .map(|n| StoreItem::new(n.store, Some(n.distance_miles)));
    if data.is_none() {
        tracing::debug!(store_count = stores.len(), "no located store to resolve");
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
