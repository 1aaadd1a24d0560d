use rust_decimal::Decimal;

use super::*;
use crate::stores::{HotpotPricing, MealPrices, StorePricing};
use crate::visibility::CALL_FOR_PRICING_MESSAGE;

fn store(slug: &str, lat: f64, lng: f64, offerings: &[Offering]) -> Store {
    Store {
        id: Store::id_for_slug(slug),
        slug: slug.to_string(),
        name: slug.to_uppercase(),
        street: "1 Main St".to_string(),
        city: "Salt Lake City".to_string(),
        state: "UT".to_string(),
        postal_code: "84101".to_string(),
        latitude: Some(lat),
        longitude: Some(lng),
        phone: "8015550100".to_string(),
        phone_display: "(801) 555-0100".to_string(),
        hours: vec!["Daily 11am-10pm".to_string()],
        offerings: offerings.to_vec(),
        pricing: StorePricing {
            kbbq: Some(MealPrices {
                lunch: Decimal::new(2599, 2),
                dinner: Decimal::new(3599, 2),
            }),
            hotpot: Some(HotpotPricing::AddOn {
                surcharge: Decimal::new(500, 2),
            }),
        },
        is_active: true,
    }
}

fn store_a() -> Store {
    store("a", 40.611, -111.892, &[Offering::Kbbq, Offering::Hotpot])
}

fn store_b() -> Store {
    store("b", 40.745, -111.888, &[Offering::Kbbq])
}

fn directory() -> Vec<Store> {
    vec![store_a(), store_b()]
}

fn visitor() -> Coordinates {
    Coordinates::new(40.700, -111.890).expect("valid coordinates")
}

fn granted_session() -> LocationSession {
    let mut session = LocationSession::new();
    let ticket = session.begin_locating();
    assert!(session.complete_locating(ticket, Ok(visitor()), &directory()));
    session
}

#[test]
fn new_session_is_idle_with_nothing_active() {
    let session = LocationSession::new();
    assert_eq!(session.status(), GeolocationStatus::Idle);
    assert!(session.active_store().is_none());
    assert!(session.active_offering().is_none());
    assert!(!session.prices_visible());
}

#[test]
fn granted_result_populates_nearest() {
    let session = granted_session();
    assert_eq!(session.status(), GeolocationStatus::Granted);
    let nearest = session.nearest().expect("nearest store");
    assert_eq!(nearest.store.slug, "b");
    assert!((nearest.distance_miles - 3.1).abs() < f64::EPSILON);
    assert_eq!(session.user_coordinates(), Some(visitor()));
    assert_eq!(session.active_store().map(|s| s.slug.as_str()), Some("b"));
    assert!(session.prices_visible());
}

#[test]
fn manual_selection_wins_over_later_geolocation() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    let ticket = session.begin_locating();
    session.complete_locating(ticket, Ok(visitor()), &directory());

    assert_eq!(session.nearest().map(|n| n.store.slug.as_str()), Some("b"));
    assert_eq!(session.active_store().map(|s| s.slug.as_str()), Some("a"));
}

#[test]
fn selecting_another_store_resets_offering() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    session.select_offering(Offering::Hotpot);
    assert_eq!(session.active_offering(), Some(Offering::Hotpot));

    let z = store("z", 40.5, -111.9, &[Offering::Kbbq, Offering::Hotpot]);
    session.select_store(z);
    assert!(session.selected_offering().is_none());
    assert_eq!(session.active_offering(), Some(Offering::Kbbq));
}

#[test]
fn reselecting_the_active_store_keeps_offering() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    session.select_offering(Offering::Hotpot);
    session.select_store(store_a());
    assert_eq!(session.active_offering(), Some(Offering::Hotpot));
}

#[test]
fn unavailable_offering_is_ignored() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    session.select_offering(Offering::Hotpot);
    session.select_store(store_b());
    session.select_offering(Offering::Hotpot);
    assert!(session.selected_offering().is_none());
    assert_eq!(session.active_offering(), Some(Offering::Kbbq));
}

#[test]
fn offering_chosen_before_any_store_applies_once_valid() {
    let mut session = LocationSession::new();
    session.select_offering(Offering::Hotpot);
    assert!(session.active_offering().is_none());

    let ticket = session.begin_locating();
    let near_a = Coordinates::new(40.612, -111.892).expect("valid coordinates");
    session.complete_locating(ticket, Ok(near_a), &directory());
    assert_eq!(session.active_store().map(|s| s.slug.as_str()), Some("a"));
    assert_eq!(session.active_offering(), Some(Offering::Hotpot));
}

#[test]
fn selection_makes_prices_visible_regardless_of_status() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    assert!(session.prices_visible());

    let ticket = session.begin_locating();
    session.complete_locating(ticket, Err(GeolocationFailure::PermissionDenied), &directory());
    assert_eq!(session.status(), GeolocationStatus::Denied);
    assert!(session.prices_visible());
}

#[test]
fn denied_without_selection_hides_prices() {
    let mut session = LocationSession::new();
    let ticket = session.begin_locating();
    session.complete_locating(ticket, Err(GeolocationFailure::PermissionDenied), &directory());

    assert_eq!(session.status(), GeolocationStatus::Denied);
    assert!(session.active_store().is_none());
    assert!(!session.prices_visible());
    assert_eq!(
        session.price_display(&PriceDisplayPolicy::default(), PriceRegion::Hero),
        PriceDisplay::CallForPricing {
            message: CALL_FOR_PRICING_MESSAGE
        }
    );
}

#[test]
fn timeout_and_unavailable_map_to_error() {
    for failure in [
        GeolocationFailure::Timeout,
        GeolocationFailure::PositionUnavailable,
    ] {
        let mut session = LocationSession::new();
        let ticket = session.begin_locating();
        session.complete_locating(ticket, Err(failure), &directory());
        assert_eq!(session.status(), GeolocationStatus::Error);
        assert!(!session.prices_visible());
    }
}

#[test]
fn unsupported_goes_straight_to_error() {
    let mut session = LocationSession::new();
    session.mark_unsupported();
    assert_eq!(session.status(), GeolocationStatus::Error);
    assert!(session.active_store().is_none());
}

#[test]
fn granted_with_no_located_store_hides_prices() {
    let mut unlocated = store_a();
    unlocated.latitude = None;
    unlocated.longitude = None;

    let mut session = LocationSession::new();
    let ticket = session.begin_locating();
    session.complete_locating(ticket, Ok(visitor()), &[unlocated]);

    assert_eq!(session.status(), GeolocationStatus::Granted);
    assert!(session.nearest().is_none());
    assert!(!session.prices_visible());
}

#[test]
fn clear_selection_reverts_to_nearest() {
    let mut session = granted_session();
    session.select_store(store_a());
    session.select_offering(Offering::Hotpot);
    session.clear_selection();

    assert_eq!(session.active_store().map(|s| s.slug.as_str()), Some("b"));
    assert_eq!(session.active_offering(), Some(Offering::Kbbq));
}

#[test]
fn clear_selection_without_nearest_leaves_nothing_active() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    session.clear_selection();
    assert!(session.active_store().is_none());
    assert!(!session.prices_visible());
}

#[test]
fn stale_ticket_is_discarded() {
    let mut session = LocationSession::new();
    let first = session.begin_locating();
    let second = session.begin_locating();

    let near_a = Coordinates::new(40.612, -111.892).expect("valid coordinates");
    assert!(session.complete_locating(second, Ok(visitor()), &directory()));
    assert!(!session.complete_locating(first, Ok(near_a), &directory()));
    assert_eq!(session.nearest().map(|n| n.store.slug.as_str()), Some("b"));
}

#[test]
fn completed_ticket_cannot_apply_twice() {
    let mut session = LocationSession::new();
    let ticket = session.begin_locating();
    assert!(session.complete_locating(ticket, Ok(visitor()), &directory()));
    assert!(!session.complete_locating(
        ticket,
        Err(GeolocationFailure::PermissionDenied),
        &directory()
    ));
    assert_eq!(session.status(), GeolocationStatus::Granted);
}

#[test]
fn relocating_hides_previous_nearest_until_result() {
    let mut session = granted_session();
    let _ticket = session.begin_locating();
    assert_eq!(session.status(), GeolocationStatus::Locating);
    assert!(session.active_store().is_none());
    assert!(!session.prices_visible());
}

#[test]
fn concrete_selection_before_geolocation() {
    let mut session = LocationSession::new();
    session.select_store(store_a());
    assert_eq!(session.active_store().map(|s| s.slug.as_str()), Some("a"));
    assert!(session.prices_visible());
    assert_eq!(session.status(), GeolocationStatus::Idle);
}

#[test]
fn status_parses_and_displays() {
    for status in [
        GeolocationStatus::Idle,
        GeolocationStatus::Locating,
        GeolocationStatus::Granted,
        GeolocationStatus::Denied,
        GeolocationStatus::Error,
    ] {
        assert_eq!(status.to_string().parse::<GeolocationStatus>(), Ok(status));
    }
    assert!("maybe".parse::<GeolocationStatus>().is_err());
}
