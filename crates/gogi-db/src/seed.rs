use gogi_core::{HotpotPricing, StoresFile};
use sqlx::PgPool;

use crate::site_settings::upsert_price_display_policy;
use crate::DbError;

/// Upsert the store directory (and its price policy, if present) from config.
///
/// Returns the number of stores processed (inserted or updated). File order
/// becomes `sort_order`. Active stores whose slug is no longer in the file are
/// deactivated. Everything runs inside a single transaction; if any operation
/// fails the entire batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_stores(pool: &PgPool, stores_file: &StoresFile) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    let mut slugs = Vec::with_capacity(stores_file.stores.len());

    for (position, config) in stores_file.stores.iter().enumerate() {
        let store = config.clone().into_store();
        let offerings: Vec<String> = store.offerings.iter().map(ToString::to_string).collect();
        let (hotpot_lunch, hotpot_dinner, hotpot_addon) = match store.pricing.hotpot {
            Some(HotpotPricing::Fixed(prices)) => (Some(prices.lunch), Some(prices.dinner), None),
            Some(HotpotPricing::AddOn { surcharge }) => (None, None, Some(surcharge)),
            None => (None, None, None),
        };
        let sort_order = i32::try_from(position).unwrap_or(i32::MAX);

        sqlx::query(
            "INSERT INTO stores (public_id, slug, name, street, city, state, postal_code, \
                 latitude, longitude, phone, phone_display, hours, offerings, \
                 kbbq_lunch_price, kbbq_dinner_price, hotpot_lunch_price, hotpot_dinner_price, \
                 hotpot_addon_price, sort_order, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             ON CONFLICT (slug) DO UPDATE SET \
                 name = EXCLUDED.name, \
                 street = EXCLUDED.street, \
                 city = EXCLUDED.city, \
                 state = EXCLUDED.state, \
                 postal_code = EXCLUDED.postal_code, \
                 latitude = EXCLUDED.latitude, \
                 longitude = EXCLUDED.longitude, \
                 phone = EXCLUDED.phone, \
                 phone_display = EXCLUDED.phone_display, \
                 hours = EXCLUDED.hours, \
                 offerings = EXCLUDED.offerings, \
                 kbbq_lunch_price = EXCLUDED.kbbq_lunch_price, \
                 kbbq_dinner_price = EXCLUDED.kbbq_dinner_price, \
                 hotpot_lunch_price = EXCLUDED.hotpot_lunch_price, \
                 hotpot_dinner_price = EXCLUDED.hotpot_dinner_price, \
                 hotpot_addon_price = EXCLUDED.hotpot_addon_price, \
                 sort_order = EXCLUDED.sort_order, \
                 is_active = EXCLUDED.is_active, \
                 updated_at = NOW()",
        )
        .bind(store.id)
        .bind(&store.slug)
        .bind(&store.name)
        .bind(&store.street)
        .bind(&store.city)
        .bind(&store.state)
        .bind(&store.postal_code)
        .bind(store.latitude)
        .bind(store.longitude)
        .bind(&store.phone)
        .bind(&store.phone_display)
        .bind(&store.hours)
        .bind(&offerings)
        .bind(store.pricing.kbbq.map(|p| p.lunch))
        .bind(store.pricing.kbbq.map(|p| p.dinner))
        .bind(hotpot_lunch)
        .bind(hotpot_dinner)
        .bind(hotpot_addon)
        .bind(sort_order)
        .bind(store.is_active)
        .execute(&mut *tx)
        .await?;

        slugs.push(store.slug);
        count += 1;
    }

    let deactivated = sqlx::query(
        "UPDATE stores SET is_active = false, updated_at = NOW() \
         WHERE is_active = true AND slug <> ALL($1)",
    )
    .bind(&slugs)
    .execute(&mut *tx)
    .await?
    .rows_affected();

    if let Some(policy) = &stores_file.price_display {
        upsert_price_display_policy(&mut *tx, policy).await?;
    }

    tx.commit().await?;
    tracing::info!(count, deactivated, "seeded store directory");
    Ok(count)
}
