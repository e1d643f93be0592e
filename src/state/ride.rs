#[cfg(test)]
#[path = "ride_test.rs"]
mod ride_test;

use serde_json::Value;

use crate::net::types::{Driver, GeoPoint, Ride, RideStatus, StatusEntry, Vehicle};

/// The active ride record plus the derived push-channel connectivity flag.
///
/// Written by two producers that agree on shape but not on timing: REST
/// responses replace the record wholesale, push events patch it in place.
/// Last write wins; every reducer is a no-op while no ride is loaded.
#[derive(Clone, Debug, Default)]
pub struct RideState {
    pub ride: Option<Ride>,
    pub connected: bool,
}

impl RideState {
    /// Replace the whole record. Clearing it also drops the connectivity
    /// flag, since a concluded ride leaves nothing to synchronize.
    pub fn set_active_ride(&mut self, ride: Option<Ride>) {
        if ride.is_none() {
            self.connected = false;
        }
        self.ride = ride;
    }

    /// Apply a status-change event: set the current status and append to the
    /// history log. History entries are never rewritten.
    pub fn apply_status_change(&mut self, status: RideStatus, timestamp: i64, by: &str) {
        let Some(ride) = self.ride.as_mut() else {
            return;
        };
        ride.status = status;
        ride.status_history.push(StatusEntry { status, timestamp, by: by.to_owned() });
    }

    /// Shallow-merge a partial ride payload over the record. Only known
    /// fields present in `data` are touched; malformed values are skipped.
    pub fn merge_patch(&mut self, data: &Value) {
        let Some(ride) = self.ride.as_mut() else {
            return;
        };

        if let Some(v) = data.get("status") {
            if let Ok(status) = serde_json::from_value::<RideStatus>(v.clone()) {
                ride.status = status;
            }
        }
        if let Some(fare) = data.get("fare").and_then(Value::as_f64) {
            ride.fare = fare;
        }
        if let Some(v) = data.get("driver") {
            if let Ok(driver) = serde_json::from_value::<Option<Driver>>(v.clone()) {
                ride.driver = driver;
            }
        }
        if let Some(v) = data.get("vehicle") {
            if let Ok(vehicle) = serde_json::from_value::<Option<Vehicle>>(v.clone()) {
                ride.vehicle = vehicle;
            }
        }
        if let Some(v) = data.get("pickup") {
            if let Ok(point) = serde_json::from_value::<GeoPoint>(v.clone()) {
                ride.pickup = point;
            }
        }
        if let Some(v) = data.get("dropoff") {
            if let Ok(point) = serde_json::from_value::<GeoPoint>(v.clone()) {
                ride.dropoff = point;
            }
        }
        if let Some(v) = data.get("status_history") {
            if let Ok(history) = serde_json::from_value::<Vec<StatusEntry>>(v.clone()) {
                ride.status_history = history;
            }
        }
        if let Some(v) = data.get("rejected_by") {
            if let Ok(rejected) = serde_json::from_value::<Vec<String>>(v.clone()) {
                ride.rejected_by = rejected;
            }
        }
        if let Some(v) = data.get("rating") {
            if let Ok(rating) = serde_json::from_value::<Option<u8>>(v.clone()) {
                ride.rating = rating;
            }
        }
        if let Some(v) = data.get("cancellation_reason") {
            if let Ok(reason) = serde_json::from_value::<Option<String>>(v.clone()) {
                ride.cancellation_reason = reason;
            }
        }
    }

    /// Apply a driver-location event. No-op unless the ride has a driver.
    pub fn apply_driver_location(&mut self, lng: f64, lat: f64) {
        let Some(driver) = self.ride.as_mut().and_then(|r| r.driver.as_mut()) else {
            return;
        };
        driver.location = Some(GeoPoint::new(lng, lat));
    }
}
