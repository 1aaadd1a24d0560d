//! Read operations for the `stores` table.

use chrono::{DateTime, Utc};
use gogi_core::{HotpotPricing, MealPrices, Offering, Store, StorePricing};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A row from the `stores` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoreRow {
    pub id: i64,
    pub public_id: Uuid,
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
    pub offerings: Vec<String>,
    pub kbbq_lunch_price: Option<Decimal>,
    pub kbbq_dinner_price: Option<Decimal>,
    pub hotpot_lunch_price: Option<Decimal>,
    pub hotpot_dinner_price: Option<Decimal>,
    /// When set, hot pot is sold as an upgrade at this surcharge over KBBQ.
    pub hotpot_addon_price: Option<Decimal>,
    pub sort_order: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoreRow {
    fn pricing(&self) -> StorePricing {
        let kbbq = match (self.kbbq_lunch_price, self.kbbq_dinner_price) {
            (Some(lunch), Some(dinner)) => Some(MealPrices { lunch, dinner }),
            _ => None,
        };
        let hotpot = match (
            self.hotpot_addon_price,
            self.hotpot_lunch_price,
            self.hotpot_dinner_price,
        ) {
            (Some(surcharge), _, _) => Some(HotpotPricing::AddOn { surcharge }),
            (None, Some(lunch), Some(dinner)) => {
                Some(HotpotPricing::Fixed(MealPrices { lunch, dinner }))
            }
            _ => None,
        };
        StorePricing { kbbq, hotpot }
    }
}

impl TryFrom<StoreRow> for Store {
    type Error = DbError;

    fn try_from(row: StoreRow) -> Result<Self, Self::Error> {
        let offerings = row
            .offerings
            .iter()
            .map(|raw| raw.parse::<Offering>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| DbError::InvalidRow {
                table: "stores",
                reason: format!("store '{}': {e}", row.slug),
            })?;
        let pricing = row.pricing();

        Ok(Store {
            id: row.public_id,
            slug: row.slug,
            name: row.name,
            street: row.street,
            city: row.city,
            state: row.state,
            postal_code: row.postal_code,
            latitude: row.latitude,
            longitude: row.longitude,
            phone: row.phone,
            phone_display: row.phone_display,
            hours: row.hours,
            offerings,
            pricing,
            is_active: row.is_active,
        })
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

const STORE_COLUMNS: &str = "id, public_id, slug, name, street, city, state, postal_code, \
     latitude, longitude, phone, phone_display, hours, offerings, \
     kbbq_lunch_price, kbbq_dinner_price, hotpot_lunch_price, hotpot_dinner_price, \
     hotpot_addon_price, sort_order, is_active, created_at, updated_at";

/// Returns all active stores in directory order (`sort_order`, then `id`).
///
/// Directory order matters: the nearest-store resolver breaks ties by
/// position.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if a row lists an unknown offering.
pub async fn list_active_stores(pool: &PgPool) -> Result<Vec<Store>, DbError> {
    let rows = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} \
         FROM stores \
         WHERE is_active = true \
         ORDER BY sort_order, id"
    ))
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(Store::try_from).collect()
}

/// Returns a single active store by slug, or `None` if not found.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::InvalidRow`]
/// if the row lists an unknown offering.
pub async fn get_store_by_slug(pool: &PgPool, slug: &str) -> Result<Option<Store>, DbError> {
    let row = sqlx::query_as::<_, StoreRow>(&format!(
        "SELECT {STORE_COLUMNS} \
         FROM stores \
         WHERE slug = $1 AND is_active = true"
    ))
    .bind(slug)
    .fetch_optional(pool)
    .await?;

    row.map(Store::try_from).transpose()
}
