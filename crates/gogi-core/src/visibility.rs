//! Price-visibility gate.
//!
//! [`prices_visible`] is the single rule for whether numeric prices may be
//! shown anywhere. Each page region then applies its own switch from
//! [`PriceDisplayPolicy`]; a region shows prices only when both agree.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::session::GeolocationStatus;
use crate::stores::{Offering, Store};
use crate::CoreError;

pub const CALL_FOR_PRICING_MESSAGE: &str =
    "Please call the store or select a location for pricing.";

/// Plain snapshot of the state the gate depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VisibilityInputs {
    pub has_selected_store: bool,
    pub status: GeolocationStatus,
    pub has_nearest_store: bool,
}

/// Manual selection always shows prices; otherwise geolocation must have
/// succeeded and found a store.
#[must_use]
pub fn prices_visible(inputs: &VisibilityInputs) -> bool {
    if inputs.has_selected_store {
        return true;
    }
    inputs.status == GeolocationStatus::Granted && inputs.has_nearest_store
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceRegion {
    Hero,
    LocationCards,
    StoreDetail,
    Menu,
    Footer,
    StructuredData,
    Header,
}

impl PriceRegion {
    pub const ALL: [PriceRegion; 7] = [
        PriceRegion::Hero,
        PriceRegion::LocationCards,
        PriceRegion::StoreDetail,
        PriceRegion::Menu,
        PriceRegion::Footer,
        PriceRegion::StructuredData,
        PriceRegion::Header,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PriceRegion::Hero => "hero",
            PriceRegion::LocationCards => "location_cards",
            PriceRegion::StoreDetail => "store_detail",
            PriceRegion::Menu => "menu",
            PriceRegion::Footer => "footer",
            PriceRegion::StructuredData => "structured_data",
            PriceRegion::Header => "header",
        }
    }
}

impl std::fmt::Display for PriceRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriceRegion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        PriceRegion::ALL
            .into_iter()
            .find(|region| region.as_str() == normalized)
            .ok_or_else(|| CoreError::UnknownRegion(s.to_string()))
    }
}

/// Per-region price switches, stored as a site setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct PriceDisplayPolicy {
    pub hero: bool,
    pub location_cards: bool,
    pub store_detail: bool,
    pub menu: bool,
    pub footer: bool,
    pub structured_data: bool,
    pub header: bool,
}

impl Default for PriceDisplayPolicy {
    /// Only the hero widget shows prices.
    fn default() -> Self {
        Self {
            hero: true,
            location_cards: false,
            store_detail: false,
            menu: false,
            footer: false,
            structured_data: false,
            header: false,
        }
    }
}

impl PriceDisplayPolicy {
    #[must_use]
    pub fn allows(&self, region: PriceRegion) -> bool {
        match region {
            PriceRegion::Hero => self.hero,
            PriceRegion::LocationCards => self.location_cards,
            PriceRegion::StoreDetail => self.store_detail,
            PriceRegion::Menu => self.menu,
            PriceRegion::Footer => self.footer,
            PriceRegion::StructuredData => self.structured_data,
            PriceRegion::Header => self.header,
        }
    }
}

#[must_use]
pub fn region_prices_visible(
    inputs: &VisibilityInputs,
    policy: &PriceDisplayPolicy,
    region: PriceRegion,
) -> bool {
    policy.allows(region) && prices_visible(inputs)
}

/// What a region renders in place of a price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriceDisplay {
    Prices {
        offering: Offering,
        lunch: Decimal,
        dinner: Decimal,
    },
    CallForPricing {
        message: &'static str,
    },
}

impl PriceDisplay {
    fn call_for_pricing() -> Self {
        PriceDisplay::CallForPricing {
            message: CALL_FOR_PRICING_MESSAGE,
        }
    }
}

/// Resolve the price block for a region.
///
/// Falls back to the call-for-pricing message when the gate is closed, when
/// there is no active store or offering, or when the store has no usable
/// price for the offering.
#[must_use]
pub fn price_display(
    store: Option<&Store>,
    offering: Option<Offering>,
    inputs: &VisibilityInputs,
    policy: &PriceDisplayPolicy,
    region: PriceRegion,
) -> PriceDisplay {
    if !region_prices_visible(inputs, policy, region) {
        return PriceDisplay::call_for_pricing();
    }

    let (Some(store), Some(offering)) = (store, offering) else {
        return PriceDisplay::call_for_pricing();
    };

    match store.prices_for(offering) {
        Some(prices) => PriceDisplay::Prices {
            offering,
            lunch: prices.lunch,
            dinner: prices.dinner,
        },
        None => PriceDisplay::call_for_pricing(),
    }
}

/// `$25.99` style rendering.
#[must_use]
pub fn format_price(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}
