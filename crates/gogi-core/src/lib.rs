pub mod app_config;
pub mod config;
pub mod geo;
pub mod locate;
pub mod session;
pub mod stores;
pub mod visibility;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::{
    haversine_miles, nearest_store, rank_by_distance, round_to_tenth, Coordinates, Nearest,
    EARTH_RADIUS_MILES,
};
pub use locate::{
    locate, FixedPosition, GeolocationFailure, GeolocationOptions, GeolocationProvider,
};
pub use session::{GeolocationStatus, LocateTicket, LocationSession, ResolvedStore};
pub use stores::{
    format_phone, load_stores, HotpotPricing, MealPrices, Offering, Store, StoreConfig,
    StorePricing, StoresFile,
};
pub use visibility::{
    format_price, price_display, prices_visible, region_prices_visible, PriceDisplay,
    PriceDisplayPolicy, PriceRegion, VisibilityInputs, CALL_FOR_PRICING_MESSAGE,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),
    #[error("stores config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("coordinates out of range: lat={lat}, lng={lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("unknown offering: {0}")]
    UnknownOffering(String),
    #[error("unknown price region: {0}")]
    UnknownRegion(String),
    #[error("unknown geolocation status: {0}")]
    UnknownStatus(String),
}
