//! Wire types shared between the REST surface and the ride socket.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// An authenticated user. `role` is one of `rider`, `driver`, `admin`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

/// GeoJSON point, `{"type": "Point", "coordinates": [lng, lat]}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    #[must_use]
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { kind: "Point".to_owned(), coordinates: [lng, lat] }
    }

    /// Parse a `"lng,lat"` form input into a point.
    #[must_use]
    pub fn parse_lng_lat(input: &str) -> Option<Self> {
        let (lng, lat) = input.split_once(',')?;
        let lng = lng.trim().parse::<f64>().ok()?;
        let lat = lat.trim().parse::<f64>().ok()?;
        Some(Self::new(lng, lat))
    }
}

/// Ride lifecycle states. Closed set, SCREAMING_SNAKE_CASE on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RideStatus {
    Requested,
    Accepted,
    Arrived,
    Started,
    Completed,
    Cancelled,
}

impl RideStatus {
    /// Human-readable label for UI display.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Requested => "Requested",
            Self::Accepted => "Accepted",
            Self::Arrived => "Driver arrived",
            Self::Started => "In progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

/// One entry in a ride's append-only status history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: RideStatus,
    pub timestamp: i64,
    pub by: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub rating: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: String,
    pub make: String,
    pub model: String,
    pub plate: String,
    #[serde(default)]
    pub capacity: Option<u32>,
}

/// The ride the current user is presently engaged in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ride {
    pub id: String,
    pub rider: User,
    #[serde(default)]
    pub driver: Option<Driver>,
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
    pub pickup: GeoPoint,
    pub dropoff: GeoPoint,
    pub fare: f64,
    pub status: RideStatus,
    #[serde(default)]
    pub status_history: Vec<StatusEntry>,
    #[serde(default)]
    pub rejected_by: Vec<String>,
    #[serde(default)]
    pub rating: Option<u8>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
}

/// Envelope for push-channel events: `{"event": "...", "data": ...}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

// ---- REST response / request bodies ----

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareEstimate {
    pub fare: f64,
    pub distance_km: f64,
    pub duration_min: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RideStats {
    pub total: u64,
    pub completed: u64,
    pub cancelled: u64,
    pub total_fare: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriverEarnings {
    pub total: f64,
    pub rides: u64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AdminSummary {
    pub total_rides: u64,
    pub active_rides: u64,
    pub total_drivers: u64,
    pub total_riders: u64,
    pub revenue: f64,
}

/// Fields a user may change on their own account.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Body for registering a new vehicle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub make: String,
    pub model: String,
    pub plate: String,
    pub capacity: u32,
}
