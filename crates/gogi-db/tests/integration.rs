//! Offline unit tests for gogi-db pool configuration and row types.
//! These tests do not require a live database connection.

use gogi_core::{AppConfig, Environment, Offering, Store};
use gogi_db::{DbError, PoolConfig, StoreRow};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        stores_path: PathBuf::from("./config/stores.yaml"),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        geo_timeout_secs: 10,
        geo_max_age_secs: 300,
        rate_limit_per_minute: 120,
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

/// Compile-time smoke test: confirm that [`StoreRow`] has all expected
/// fields with the correct types and converts into the core type.
#[test]
fn store_row_converts_to_store() {
    use chrono::Utc;
    use rust_decimal::Decimal;

    let row = StoreRow {
        id: 3_i64,
        public_id: Store::id_for_slug("gogi-sandy"),
        slug: "gogi-sandy".to_string(),
        name: "Gogi Sandy".to_string(),
        street: "10305 S State St".to_string(),
        city: "Sandy".to_string(),
        state: "UT".to_string(),
        postal_code: "84070".to_string(),
        latitude: None,
        longitude: None,
        phone: "8015550188".to_string(),
        phone_display: "(801) 555-0188".to_string(),
        hours: vec![],
        offerings: vec!["hotpot".to_string()],
        kbbq_lunch_price: None,
        kbbq_dinner_price: None,
        hotpot_lunch_price: Some(Decimal::new(2299, 2)),
        hotpot_dinner_price: Some(Decimal::new(2999, 2)),
        hotpot_addon_price: None,
        sort_order: 2_i32,
        is_active: true,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };

    let store = Store::try_from(row).expect("valid row");
    assert_eq!(store.first_offering(), Some(Offering::Hotpot));
    assert!(store.coordinates().is_none());
    assert_eq!(
        store.prices_for(Offering::Hotpot).map(|p| p.lunch),
        Some(Decimal::new(2299, 2))
    );
}

#[test]
fn db_error_messages_are_descriptive() {
    let err = DbError::InvalidRow {
        table: "stores",
        reason: "bad offering".to_string(),
    };
    assert_eq!(err.to_string(), "invalid row in stores: bad offering");
}

#[test]
fn db_error_wraps_sqlx_errors_transparently() {
    let err = DbError::from(sqlx::Error::RowNotFound);
    assert!(matches!(err, DbError::Sqlx(sqlx::Error::RowNotFound)));
    assert_eq!(err.to_string(), sqlx::Error::RowNotFound.to_string());
}
