use super::*;

// =============================================================
// GeoPoint
// =============================================================

#[test]
fn geo_point_serializes_as_geojson() {
    let point = GeoPoint::new(10.5, 20.1);
    let json = serde_json::to_value(&point).expect("serialize");
    assert_eq!(json, serde_json::json!({ "type": "Point", "coordinates": [10.5, 20.1] }));
}

#[test]
fn parse_lng_lat_accepts_whitespace() {
    let point = GeoPoint::parse_lng_lat(" 3.38 , 6.52 ").expect("point");
    assert_eq!(point.coordinates, [3.38, 6.52]);
}

#[test]
fn parse_lng_lat_rejects_garbage() {
    assert!(GeoPoint::parse_lng_lat("").is_none());
    assert!(GeoPoint::parse_lng_lat("3.38").is_none());
    assert!(GeoPoint::parse_lng_lat("east,west").is_none());
}

// =============================================================
// RideStatus
// =============================================================

#[test]
fn ride_status_uses_screaming_snake_case_on_the_wire() {
    let json = serde_json::to_string(&RideStatus::Accepted).expect("serialize");
    assert_eq!(json, "\"ACCEPTED\"");

    let status: RideStatus = serde_json::from_str("\"CANCELLED\"").expect("deserialize");
    assert_eq!(status, RideStatus::Cancelled);
}

#[test]
fn ride_status_rejects_unknown_states() {
    assert!(serde_json::from_str::<RideStatus>("\"TELEPORTING\"").is_err());
}

#[test]
fn ride_status_labels_are_human_readable() {
    assert_eq!(RideStatus::Started.label(), "In progress");
    assert_eq!(RideStatus::Arrived.label(), "Driver arrived");
}

// =============================================================
// Envelope / Ride decoding
// =============================================================

#[test]
fn envelope_data_defaults_to_null() {
    let envelope: Envelope = serde_json::from_str(r#"{"event":"ride:update"}"#).expect("decode");
    assert_eq!(envelope.event, "ride:update");
    assert!(envelope.data.is_null());
}

#[test]
fn ride_decodes_with_optional_fields_missing() {
    let ride: Ride = serde_json::from_value(serde_json::json!({
        "id": "r-1",
        "rider": { "id": "u-1", "name": "Asha", "email": "asha@example.com", "role": "rider" },
        "pickup": { "type": "Point", "coordinates": [3.38, 6.52] },
        "dropoff": { "type": "Point", "coordinates": [3.42, 6.45] },
        "fare": 1500.0,
        "status": "REQUESTED"
    }))
    .expect("decode");

    assert!(ride.driver.is_none());
    assert!(ride.vehicle.is_none());
    assert!(ride.status_history.is_empty());
    assert!(ride.rejected_by.is_empty());
    assert!(ride.rating.is_none());
    assert!(ride.cancellation_reason.is_none());
}
