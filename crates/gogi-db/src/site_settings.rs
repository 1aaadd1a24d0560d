//! Database operations for the `site_settings` key/value table.

use gogi_core::PriceDisplayPolicy;
use sqlx::PgPool;

use crate::DbError;

const PRICE_DISPLAY_KEY: &str = "price_display";

/// Returns the per-region price policy, or the default policy when the
/// setting has never been written.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Json`] if the
/// stored value does not match the policy shape.
pub async fn get_price_display_policy(pool: &PgPool) -> Result<PriceDisplayPolicy, DbError> {
    let value: Option<serde_json::Value> =
        sqlx::query_scalar("SELECT value FROM site_settings WHERE key = $1")
            .bind(PRICE_DISPLAY_KEY)
            .fetch_optional(pool)
            .await?;

    match value {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => {
            tracing::debug!("price_display setting absent; using default policy");
            Ok(PriceDisplayPolicy::default())
        }
    }
}

/// Insert or replace the per-region price policy. Accepts a pool or an open
/// transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_price_display_policy<'e, E>(
    executor: E,
    policy: &PriceDisplayPolicy,
) -> Result<(), DbError>
where
    E: sqlx::PgExecutor<'e>,
{
    let value = serde_json::to_value(policy)?;
    sqlx::query(
        "INSERT INTO site_settings (key, value) \
         VALUES ($1, $2) \
         ON CONFLICT (key) DO UPDATE SET \
             value = EXCLUDED.value, \
             updated_at = NOW()",
    )
    .bind(PRICE_DISPLAY_KEY)
    .bind(value)
    .execute(executor)
    .await?;
    Ok(())
}
