//! Domain REST surface for riders, drivers, and admins.
//!
//! Client-side (hydrate): real HTTP calls via `gloo-net`, routed through the
//! session gate so an expired session is refreshed once and replayed.
//! Server-side (SSR): stubs returning [`ApiError::unavailable`] since these
//! endpoints are only meaningful in the browser.
//!
//! Every mutating call declares the cache tags it invalidates and bumps
//! them on success.

#![allow(clippy::unused_async)]

use std::sync::{Mutex, PoisonError};

use crate::net::http::{ApiConfig, ApiError, SessionGate};
use crate::net::types::{
    AdminSummary, DriverEarnings, FareEstimate, GeoPoint, NewVehicle, Ride, RideStats, User,
    UserUpdate, Vehicle,
};
use crate::state::cache::{CacheStamps, CacheTag};

/// Context-scoped REST client: endpoint config, the single-flight session
/// gate, and the query-cache stamps. Provided to the app as `Arc<ApiClient>`.
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
pub struct ApiClient {
    config: ApiConfig,
    gate: SessionGate,
    cache: Mutex<CacheStamps>,
}

impl ApiClient {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self { config, gate: SessionGate::new(), cache: Mutex::new(CacheStamps::default()) }
    }

    /// Current version stamp for a cache tag.
    #[must_use]
    pub fn cache_version(&self, tag: CacheTag) -> u64 {
        self.cache_lock().version(tag)
    }

    fn invalidate(&self, tags: &[CacheTag]) {
        self.cache_lock().invalidate(tags);
    }

    fn cache_lock(&self) -> std::sync::MutexGuard<'_, CacheStamps> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(feature = "hydrate")]
impl ApiClient {
    /// Issue a gated request and decode the JSON response.
    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: gloo_net::http::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let url = format!("{}{}", self.config.api_base, path);
        self.gate
            .run(
                || super::http::perform(method, &url, body.clone()),
                || super::http::refresh_session(&self.config),
            )
            .await
    }

    /// Issue a gated request, discarding the response body.
    async fn request_unit(
        &self,
        method: gloo_net::http::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        let url = format!("{}{}", self.config.api_base, path);
        self.gate
            .run(
                || super::http::perform_unit(method, &url, body.clone()),
                || super::http::refresh_session(&self.config),
            )
            .await
    }
}

impl ApiClient {
    /// Fetch the currently authenticated user from `/auth/me`.
    /// Returns `None` if not authenticated or on the server.
    pub async fn current_user(&self) -> Option<User> {
        #[cfg(feature = "hydrate")]
        {
            self.request(gloo_net::http::Method::GET, "/auth/me", None).await.ok()
        }
        #[cfg(not(feature = "hydrate"))]
        {
            None
        }
    }

    /// Sign in with email and password. Invalidates [`CacheTag::User`].
    ///
    /// # Errors
    ///
    /// Surfaces the backend's error message on bad credentials.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "email": email, "password": password });
            let user: User =
                self.request(gloo_net::http::Method::POST, "/auth/login", Some(body)).await?;
            self.invalidate(&[CacheTag::User]);
            Ok(user)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (email, password);
            Err(ApiError::unavailable())
        }
    }

    /// Log out the current user. Errors are ignored; the session is gone
    /// either way.
    pub async fn logout(&self) {
        #[cfg(feature = "hydrate")]
        {
            let _ = self.request_unit(gloo_net::http::Method::POST, "/auth/logout", None).await;
        }
    }

    /// Request a ride between two points. Invalidates [`CacheTag::Rides`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn request_ride(
        &self,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
    ) -> Result<Ride, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({
                "pickup": pickup,
                "dropoff": dropoff,
                "client_token": uuid::Uuid::new_v4().to_string(),
            });
            let ride: Ride =
                self.request(gloo_net::http::Method::POST, "/rides", Some(body)).await?;
            self.invalidate(&[CacheTag::Rides]);
            Ok(ride)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (pickup, dropoff);
            Err(ApiError::unavailable())
        }
    }

    /// Cancel a ride. Invalidates [`CacheTag::Rides`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn cancel_ride(&self, ride_id: &str, reason: &str) -> Result<Ride, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "reason": reason });
            let path = format!("/rides/{ride_id}/cancel");
            let ride: Ride =
                self.request(gloo_net::http::Method::POST, &path, Some(body)).await?;
            self.invalidate(&[CacheTag::Rides]);
            Ok(ride)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (ride_id, reason);
            Err(ApiError::unavailable())
        }
    }

    /// Accept a ride as the signed-in driver. Invalidates
    /// [`CacheTag::Rides`] and [`CacheTag::Drivers`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn accept_ride(&self, ride_id: &str) -> Result<Ride, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let path = format!("/rides/{ride_id}/accept");
            let ride: Ride = self.request(gloo_net::http::Method::POST, &path, None).await?;
            self.invalidate(&[CacheTag::Rides, CacheTag::Drivers]);
            Ok(ride)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = ride_id;
            Err(ApiError::unavailable())
        }
    }

    /// Reject a ride as the signed-in driver. Invalidates
    /// [`CacheTag::Rides`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn reject_ride(&self, ride_id: &str) -> Result<Ride, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let path = format!("/rides/{ride_id}/reject");
            let ride: Ride = self.request(gloo_net::http::Method::POST, &path, None).await?;
            self.invalidate(&[CacheTag::Rides]);
            Ok(ride)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = ride_id;
            Err(ApiError::unavailable())
        }
    }

    /// Rate a completed ride. Invalidates [`CacheTag::Rides`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn rate_ride(&self, ride_id: &str, rating: u8) -> Result<Ride, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "rating": rating });
            let path = format!("/rides/{ride_id}/rating");
            let ride: Ride =
                self.request(gloo_net::http::Method::POST, &path, Some(body)).await?;
            self.invalidate(&[CacheTag::Rides]);
            Ok(ride)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (ride_id, rating);
            Err(ApiError::unavailable())
        }
    }

    /// Fare estimate for a prospective ride.
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn fare_estimate(
        &self,
        pickup: &GeoPoint,
        dropoff: &GeoPoint,
    ) -> Result<FareEstimate, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let path = format!(
                "/rides/fare-estimate?pickup={},{}&dropoff={},{}",
                pickup.coordinates[0],
                pickup.coordinates[1],
                dropoff.coordinates[0],
                dropoff.coordinates[1],
            );
            self.request(gloo_net::http::Method::GET, &path, None).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (pickup, dropoff);
            Err(ApiError::unavailable())
        }
    }

    /// Ride history for the signed-in user.
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn ride_history(&self) -> Result<Vec<Ride>, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            self.request(gloo_net::http::Method::GET, "/rides/history", None).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(ApiError::unavailable())
        }
    }

    /// Aggregate ride statistics for the signed-in user.
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn ride_stats(&self) -> Result<RideStats, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            self.request(gloo_net::http::Method::GET, "/rides/stats", None).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(ApiError::unavailable())
        }
    }

    /// Toggle the signed-in driver's availability. Invalidates
    /// [`CacheTag::Drivers`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn update_driver_status(&self, available: bool) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "available": available });
            self.request_unit(gloo_net::http::Method::PATCH, "/drivers/status", Some(body))
                .await?;
            self.invalidate(&[CacheTag::Drivers]);
            Ok(())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = available;
            Err(ApiError::unavailable())
        }
    }

    /// Report the signed-in driver's position.
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn update_driver_location(&self, location: &GeoPoint) -> Result<(), ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "location": location });
            self.request_unit(gloo_net::http::Method::PATCH, "/drivers/location", Some(body))
                .await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = location;
            Err(ApiError::unavailable())
        }
    }

    /// Record earnings for a completed ride. Invalidates
    /// [`CacheTag::Drivers`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn add_driver_earnings(&self, amount: f64) -> Result<DriverEarnings, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::json!({ "amount": amount });
            let earnings: DriverEarnings = self
                .request(gloo_net::http::Method::PATCH, "/drivers/earnings", Some(body))
                .await?;
            self.invalidate(&[CacheTag::Drivers]);
            Ok(earnings)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = amount;
            Err(ApiError::unavailable())
        }
    }

    /// The signed-in driver's earnings to date.
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn driver_earnings(&self) -> Result<DriverEarnings, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            self.request(gloo_net::http::Method::GET, "/drivers/earnings", None).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(ApiError::unavailable())
        }
    }

    /// Update the signed-in user's profile. Invalidates [`CacheTag::User`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn update_user(&self, update: &UserUpdate) -> Result<User, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::to_value(update)
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            let user: User =
                self.request(gloo_net::http::Method::PATCH, "/users/me", Some(body)).await?;
            self.invalidate(&[CacheTag::User]);
            Ok(user)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = update;
            Err(ApiError::unavailable())
        }
    }

    /// Register a vehicle for the signed-in driver. Invalidates
    /// [`CacheTag::Vehicles`].
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn create_vehicle(&self, vehicle: &NewVehicle) -> Result<Vehicle, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            let body = serde_json::to_value(vehicle)
                .map_err(|e| ApiError::Decode(e.to_string()))?;
            let created: Vehicle =
                self.request(gloo_net::http::Method::POST, "/vehicles", Some(body)).await?;
            self.invalidate(&[CacheTag::Vehicles]);
            Ok(created)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = vehicle;
            Err(ApiError::unavailable())
        }
    }

    /// Platform-wide dashboard summary for admins.
    ///
    /// # Errors
    ///
    /// Propagates any non-expiry REST failure untouched.
    pub async fn admin_summary(&self) -> Result<AdminSummary, ApiError> {
        #[cfg(feature = "hydrate")]
        {
            self.request(gloo_net::http::Method::GET, "/admin/summary", None).await
        }
        #[cfg(not(feature = "hydrate"))]
        {
            Err(ApiError::unavailable())
        }
    }
}
