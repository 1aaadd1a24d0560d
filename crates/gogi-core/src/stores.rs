//! Store directory types and the YAML directory loader.
//!
//! The public site treats the directory as a read-only snapshot: stores are
//! authored in `config/stores.yaml` (or the CMS tables seeded from it) and
//! consumed by the resolver and the active-selection state.

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geo::Coordinates;
use crate::visibility::PriceDisplayPolicy;
use crate::{ConfigError, CoreError};

/// A service type a store provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Offering {
    Kbbq,
    Hotpot,
}

impl Offering {
    pub const ALL: [Offering; 2] = [Offering::Kbbq, Offering::Hotpot];

    /// Human-facing name used in page copy.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Offering::Kbbq => "Korean BBQ",
            Offering::Hotpot => "Hot Pot",
        }
    }
}

impl std::fmt::Display for Offering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Offering::Kbbq => write!(f, "kbbq"),
            Offering::Hotpot => write!(f, "hotpot"),
        }
    }
}

impl FromStr for Offering {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kbbq" => Ok(Offering::Kbbq),
            "hotpot" | "hot-pot" | "hot_pot" => Ok(Offering::Hotpot),
            other => Err(CoreError::UnknownOffering(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPrices {
    pub lunch: Decimal,
    pub dinner: Decimal,
}

/// Hot pot is either priced on its own or sold as an upgrade on top of KBBQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HotpotPricing {
    Fixed(MealPrices),
    AddOn { surcharge: Decimal },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorePricing {
    #[serde(default)]
    pub kbbq: Option<MealPrices>,
    #[serde(default)]
    pub hotpot: Option<HotpotPricing>,
}

impl StorePricing {
    /// Resolve lunch/dinner prices for an offering.
    ///
    /// Add-on hot pot pricing resolves against the KBBQ prices; without KBBQ
    /// prices there is nothing to add the surcharge to and this returns `None`.
    #[must_use]
    pub fn for_offering(&self, offering: Offering) -> Option<MealPrices> {
        match offering {
            Offering::Kbbq => self.kbbq,
            Offering::Hotpot => match self.hotpot? {
                HotpotPricing::Fixed(prices) => Some(prices),
                HotpotPricing::AddOn { surcharge } => self.kbbq.map(|base| MealPrices {
                    lunch: base.lunch + surcharge,
                    dinner: base.dinner + surcharge,
                }),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Raw digits, suitable for `tel:` links.
    pub phone: String,
    pub phone_display: String,
    pub hours: Vec<String>,
    /// Ordered; the first entry is the default active offering.
    pub offerings: Vec<Offering>,
    pub pricing: StorePricing,
    pub is_active: bool,
}

impl Store {
    /// Coordinates when both latitude and longitude are present and in range.
    #[must_use]
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coordinates::new(lat, lng).ok(),
            _ => None,
        }
    }

    #[must_use]
    pub fn offers(&self, offering: Offering) -> bool {
        self.offerings.contains(&offering)
    }

    #[must_use]
    pub fn first_offering(&self) -> Option<Offering> {
        self.offerings.first().copied()
    }

    /// Prices for an offering this store actually provides.
    #[must_use]
    pub fn prices_for(&self, offering: Offering) -> Option<MealPrices> {
        if !self.offers(offering) {
            return None;
        }
        self.pricing.for_offering(offering)
    }

    /// Stable id derived from the slug, so file-sourced and seeded records agree.
    #[must_use]
    pub fn id_for_slug(slug: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_URL, format!("gogi:store:{slug}").as_bytes())
    }
}

/// A store as authored in `stores.yaml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    pub phone: String,
    #[serde(default)]
    pub phone_display: Option<String>,
    #[serde(default)]
    pub hours: Vec<String>,
    pub offerings: Vec<Offering>,
    #[serde(default)]
    pub pricing: StorePricing,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl StoreConfig {
    /// Explicit slug if given, otherwise a URL-safe slug from the store name.
    #[must_use]
    pub fn slug(&self) -> String {
        let source = self.slug.as_deref().unwrap_or(&self.name);
        source
            .to_lowercase()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else if c == ' ' {
                    '-'
                } else {
                    '\0'
                }
            })
            .filter(|&c| c != '\0')
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    #[must_use]
    pub fn into_store(self) -> Store {
        let slug = self.slug();
        let phone_display = self
            .phone_display
            .clone()
            .unwrap_or_else(|| format_phone(&self.phone));
        Store {
            id: Store::id_for_slug(&slug),
            slug,
            name: self.name,
            street: self.street,
            city: self.city,
            state: self.state,
            postal_code: self.postal_code,
            latitude: self.latitude,
            longitude: self.longitude,
            phone: self.phone,
            phone_display,
            hours: self.hours,
            offerings: self.offerings,
            pricing: self.pricing,
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoresFile {
    pub stores: Vec<StoreConfig>,
    /// Seeded into site settings when present.
    #[serde(default)]
    pub price_display: Option<PriceDisplayPolicy>,
}

impl StoresFile {
    /// Active stores in file order.
    #[must_use]
    pub fn active_stores(&self) -> Vec<Store> {
        self.stores
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .map(StoreConfig::into_store)
            .collect()
    }
}

/// Format ten raw digits as `(801) 555-0134`; anything else is returned as-is.
#[must_use]
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.len() {
        11 if digits.starts_with('1') => &digits[1..],
        _ => digits.as_str(),
    };
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        raw.to_string()
    }
}

/// Load and validate the store directory from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_stores(path: &Path) -> Result<StoresFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::StoresFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let stores_file: StoresFile =
        serde_yaml::from_str(&content).map_err(ConfigError::StoresFileParse)?;

    validate_stores(&stores_file)?;

    tracing::debug!(
        path = %path.display(),
        count = stores_file.stores.len(),
        "loaded store directory"
    );

    Ok(stores_file)
}

fn validate_stores(stores_file: &StoresFile) -> Result<(), ConfigError> {
    let mut seen_slugs = HashSet::new();

    for store in &stores_file.stores {
        if store.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "store name must be non-empty".to_string(),
            ));
        }

        let slug = store.slug();
        if slug.is_empty() {
            return Err(ConfigError::Validation(format!(
                "store '{}' produces an empty slug",
                store.name
            )));
        }
        if !seen_slugs.insert(slug.clone()) {
            return Err(ConfigError::Validation(format!(
                "duplicate store slug: '{}' (from store '{}')",
                slug, store.name
            )));
        }

        if store.phone.is_empty() || !store.phone.chars().all(|c| c.is_ascii_digit()) {
            return Err(ConfigError::Validation(format!(
                "store '{}' phone must be raw digits, got '{}'",
                store.name, store.phone
            )));
        }

        validate_coordinates(store)?;
        validate_offerings(store)?;
    }

    Ok(())
}

fn validate_coordinates(store: &StoreConfig) -> Result<(), ConfigError> {
    match (store.latitude, store.longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => Coordinates::new(lat, lng).map(|_| ()).map_err(|e| {
            ConfigError::Validation(format!("store '{}': {e}", store.name))
        }),
        _ => Err(ConfigError::Validation(format!(
            "store '{}' must set both latitude and longitude or neither",
            store.name
        ))),
    }
}

fn validate_offerings(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.offerings.is_empty() {
        return Err(ConfigError::Validation(format!(
            "store '{}' must list at least one offering",
            store.name
        )));
    }

    let mut seen = HashSet::new();
    for offering in &store.offerings {
        if !seen.insert(*offering) {
            return Err(ConfigError::Validation(format!(
                "store '{}' lists offering '{offering}' more than once",
                store.name
            )));
        }
        if store.pricing.for_offering(*offering).is_none() {
            return Err(ConfigError::Validation(format!(
                "store '{}' offers '{offering}' but has no usable pricing for it",
                store.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "stores_test.rs"]
mod tests;
