//! Store directory and price-gate command handlers.
//!
//! Every command can run against the database or straight from a YAML
//! directory file, so the resolver can be checked before seeding.

use std::path::PathBuf;

use gogi_core::{
    format_price, locate, Coordinates, FixedPosition, GeolocationOptions, GeolocationProvider,
    LocationSession, Offering, PriceDisplay, PriceDisplayPolicy, PriceRegion, Store,
};
use tokio::sync::Mutex;

/// Stores plus the price policy and geolocation limits that apply to them.
pub(crate) struct StoreSource {
    pub stores: Vec<Store>,
    pub policy: PriceDisplayPolicy,
    pub geo_options: GeolocationOptions,
}

impl StoreSource {
    /// Load from `from_file` when given, otherwise from the database.
    ///
    /// File mode needs no environment, so it runs with the default
    /// geolocation limits. Database mode takes them from `AppConfig`.
    pub(crate) async fn resolve(from_file: Option<PathBuf>) -> anyhow::Result<Self> {
        if let Some(path) = from_file {
            let stores_file = gogi_core::load_stores(&path)?;
            tracing::debug!(path = %path.display(), "loaded stores from file");
            return Ok(Self {
                stores: stores_file.active_stores(),
                policy: stores_file.price_display.unwrap_or_default(),
                geo_options: GeolocationOptions::default(),
            });
        }

        let (config, pool) = crate::connect().await?;
        let stores = gogi_db::list_active_stores(&pool).await?;
        let policy = gogi_db::get_price_display_policy(&pool).await?;
        Ok(Self {
            stores,
            policy,
            geo_options: GeolocationOptions::from_app_config(&config),
        })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct PricesRequest {
    pub store: Option<String>,
    pub offering: Option<Offering>,
    pub region: PriceRegion,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

fn offerings_label(store: &Store) -> String {
    store
        .offerings
        .iter()
        .map(|o| o.label())
        .collect::<Vec<_>>()
        .join(" + ")
}

fn store_line(store: &Store) -> String {
    let position = match store.coordinates() {
        Some(c) => format!("{:.4},{:.4}", c.lat(), c.lng()),
        None => "no coordinates".to_string(),
    };
    format!(
        "{}\t{}\t{}, {}\t{}\t{}\t{}",
        store.slug,
        store.name,
        store.city,
        store.state,
        store.phone_display,
        offerings_label(store),
        position
    )
}

pub(crate) fn run_list(source: &StoreSource) {
    if source.stores.is_empty() {
        println!("no active stores");
        return;
    }
    for store in &source.stores {
        println!("{}", store_line(store));
    }
}

pub(crate) fn run_nearest(source: &StoreSource, lat: f64, lng: f64) -> anyhow::Result<()> {
    let origin = Coordinates::new(lat, lng)?;
    match gogi_core::nearest_store(origin, &source.stores) {
        Some(nearest) => println!(
            "{}\t{}\t{:.1} mi",
            nearest.store.slug, nearest.store.name, nearest.distance_miles
        ),
        None => println!("no store has coordinates"),
    }
    Ok(())
}

/// Replay a visitor snapshot through a fresh session: manual store choice,
/// then geolocation, then offering.
pub(crate) async fn build_session(
    source: &StoreSource,
    request: &PricesRequest,
) -> anyhow::Result<LocationSession> {
    let position = match (request.lat, request.lng) {
        (Some(lat), Some(lng)) => Some(FixedPosition(Coordinates::new(lat, lng)?)),
        _ => None,
    };
    replay_session(source, request, position.as_ref()).await
}

/// Run `request` through a fresh session, locating with `provider` when one
/// is given.
async fn replay_session<P: GeolocationProvider>(
    source: &StoreSource,
    request: &PricesRequest,
    provider: Option<&P>,
) -> anyhow::Result<LocationSession> {
    let session = Mutex::new(LocationSession::new());

    if let Some(slug) = request.store.as_deref() {
        let store = source
            .stores
            .iter()
            .find(|s| s.slug == slug)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("store '{slug}' not found"))?;
        session.lock().await.select_store(store);
    }

    if let Some(provider) = provider {
        locate(&session, Some(provider), &source.stores, &source.geo_options).await;
    }

    let mut session = session.into_inner();
    if let Some(offering) = request.offering {
        session.select_offering(offering);
    }
    Ok(session)
}

fn describe_display(display: &PriceDisplay) -> String {
    match display {
        PriceDisplay::Prices {
            offering,
            lunch,
            dinner,
        } => format!(
            "{}: lunch {} / dinner {}",
            offering.label(),
            format_price(*lunch),
            format_price(*dinner)
        ),
        PriceDisplay::CallForPricing { message } => (*message).to_string(),
    }
}

pub(crate) async fn run_prices(
    source: &StoreSource,
    request: &PricesRequest,
) -> anyhow::Result<()> {
    let session = build_session(source, request).await?;

    println!("status: {}", session.status());
    match session.active_store() {
        Some(store) => println!("active store: {} ({})", store.name, store.slug),
        None => println!("active store: none"),
    }
    if let Some(nearest) = session.nearest() {
        println!(
            "nearest: {} ({:.1} mi)",
            nearest.store.slug, nearest.distance_miles
        );
    }
    if let Some(offering) = session.active_offering() {
        println!("offering: {}", offering.label());
    }
    println!("prices visible: {}", session.prices_visible());
    println!(
        "{}: {}",
        request.region,
        describe_display(&session.price_display(&source.policy, request.region))
    );
    Ok(())
}
