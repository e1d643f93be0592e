use serde_json::json;

use super::*;
use crate::net::types::User;

fn rider() -> User {
    User {
        id: "u-1".to_owned(),
        name: "Asha".to_owned(),
        email: "asha@example.com".to_owned(),
        role: "rider".to_owned(),
    }
}

fn driver() -> Driver {
    Driver { id: "d-1".to_owned(), name: "Femi".to_owned(), location: None, rating: Some(4.8) }
}

fn ride() -> Ride {
    Ride {
        id: "r-1".to_owned(),
        rider: rider(),
        driver: None,
        vehicle: None,
        pickup: GeoPoint::new(3.38, 6.52),
        dropoff: GeoPoint::new(3.42, 6.45),
        fare: 1500.0,
        status: RideStatus::Requested,
        status_history: vec![StatusEntry {
            status: RideStatus::Requested,
            timestamp: 100,
            by: "u-1".to_owned(),
        }],
        rejected_by: Vec::new(),
        rating: None,
        cancellation_reason: None,
    }
}

fn loaded() -> RideState {
    RideState { ride: Some(ride()), connected: true }
}

// =============================================================
// Defaults and replacement
// =============================================================

#[test]
fn default_state_has_no_ride_and_is_disconnected() {
    let state = RideState::default();
    assert!(state.ride.is_none());
    assert!(!state.connected);
}

#[test]
fn clearing_active_ride_resets_connectivity() {
    let mut state = loaded();
    state.set_active_ride(None);
    assert!(state.ride.is_none());
    assert!(!state.connected);
}

#[test]
fn replacing_active_ride_keeps_connectivity() {
    let mut state = loaded();
    state.set_active_ride(Some(ride()));
    assert!(state.ride.is_some());
    assert!(state.connected);
}

// =============================================================
// Status-change events
// =============================================================

#[test]
fn status_change_without_ride_is_noop() {
    let mut state = RideState::default();
    state.apply_status_change(RideStatus::Accepted, 200, "d-1");
    assert!(state.ride.is_none());
}

#[test]
fn status_change_appends_to_history() {
    let mut state = loaded();
    state.apply_status_change(RideStatus::Accepted, 200, "d-1");

    let ride = state.ride.as_ref().expect("ride");
    assert_eq!(ride.status, RideStatus::Accepted);
    assert_eq!(ride.status_history.len(), 2);
    assert_eq!(ride.status_history[0].status, RideStatus::Requested);
    assert_eq!(
        ride.status_history[1],
        StatusEntry { status: RideStatus::Accepted, timestamp: 200, by: "d-1".to_owned() }
    );
}

#[test]
fn history_grows_monotonically_across_events() {
    let mut state = loaded();
    state.apply_status_change(RideStatus::Accepted, 200, "d-1");
    state.apply_status_change(RideStatus::Arrived, 300, "d-1");
    state.apply_status_change(RideStatus::Started, 400, "d-1");

    let history = &state.ride.as_ref().expect("ride").status_history;
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].timestamp, 100);
    assert_eq!(history[3].status, RideStatus::Started);
}

// =============================================================
// Partial-data merge
// =============================================================

#[test]
fn merge_patch_without_ride_is_noop() {
    let mut state = RideState::default();
    state.merge_patch(&json!({ "fare": 9000.0 }));
    assert!(state.ride.is_none());
}

#[test]
fn merge_patch_overlays_only_given_fields() {
    let mut state = loaded();
    state.merge_patch(&json!({ "fare": 1750.0, "status": "ACCEPTED" }));

    let ride = state.ride.as_ref().expect("ride");
    assert_eq!(ride.fare, 1750.0);
    assert_eq!(ride.status, RideStatus::Accepted);
    // Untouched fields survive.
    assert_eq!(ride.id, "r-1");
    assert_eq!(ride.status_history.len(), 1);
    assert_eq!(ride.pickup, GeoPoint::new(3.38, 6.52));
}

#[test]
fn merge_patch_assigns_and_clears_driver() {
    let mut state = loaded();
    state.merge_patch(&json!({
        "driver": { "id": "d-1", "name": "Femi", "rating": 4.8 }
    }));
    assert_eq!(state.ride.as_ref().expect("ride").driver, Some(driver()));

    state.merge_patch(&json!({ "driver": null }));
    assert!(state.ride.as_ref().expect("ride").driver.is_none());
}

#[test]
fn merge_patch_skips_malformed_values() {
    let mut state = loaded();
    state.merge_patch(&json!({ "status": "TELEPORTING", "fare": "lots" }));

    let ride = state.ride.as_ref().expect("ride");
    assert_eq!(ride.status, RideStatus::Requested);
    assert_eq!(ride.fare, 1500.0);
}

#[test]
fn merge_patch_sets_cancellation_reason() {
    let mut state = loaded();
    state.merge_patch(&json!({ "status": "CANCELLED", "cancellation_reason": "rider no-show" }));

    let ride = state.ride.as_ref().expect("ride");
    assert_eq!(ride.status, RideStatus::Cancelled);
    assert_eq!(ride.cancellation_reason.as_deref(), Some("rider no-show"));
}

// =============================================================
// Driver-location events
// =============================================================

#[test]
fn driver_location_sets_point_geometry() {
    let mut state = loaded();
    state.ride.as_mut().expect("ride").driver = Some(driver());

    state.apply_driver_location(10.5, 20.1);

    let location = state
        .ride
        .as_ref()
        .and_then(|r| r.driver.as_ref())
        .and_then(|d| d.location.as_ref())
        .expect("driver location");
    assert_eq!(location.kind, "Point");
    assert_eq!(location.coordinates, [10.5, 20.1]);
}

#[test]
fn driver_location_without_driver_is_noop() {
    let mut state = loaded();
    state.apply_driver_location(10.5, 20.1);
    assert!(state.ride.as_ref().expect("ride").driver.is_none());
}

#[test]
fn driver_location_without_ride_is_noop() {
    let mut state = RideState::default();
    state.apply_driver_location(10.5, 20.1);
    assert!(state.ride.is_none());
}
