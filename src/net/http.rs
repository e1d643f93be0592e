//! Authenticated request plumbing: error taxonomy, endpoint configuration,
//! and the single-flight session refresh gate.
//!
//! SESSION EXPIRY
//! ==============
//! The backend signals an expired session as HTTP 500 with body message
//! `"jwt expired"` (not 401). Recovery must key on that exact signature;
//! loosening it silently changes which failures get the transparent
//! refresh-and-replay treatment.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use futures::channel::oneshot;

/// Message the backend uses for an expired session token.
pub const SESSION_EXPIRED_MESSAGE: &str = "jwt expired";

/// Status code carrying the expiry signature.
pub const SESSION_EXPIRED_STATUS: u16 = 500;

/// Errors surfaced by the REST layer.
///
/// Cloneable so a failed refresh can hand every queued caller the same
/// rejection.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("http {status}: {message}")]
    Status { status: u16, message: String },
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ApiError {
    /// True only for the exact expiry signature: status 500 with message
    /// `"jwt expired"`.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::Status { status: SESSION_EXPIRED_STATUS, message }
                if message == SESSION_EXPIRED_MESSAGE
        )
    }

    /// Stub error for REST calls attempted during SSR.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::Network("not available on server".to_owned())
    }
}

/// Endpoint configuration for the REST base path and the socket path.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub api_base: String,
    pub socket_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { api_base: "/api".to_owned(), socket_path: "/ws".to_owned() }
    }
}

struct GateInner {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Result<(), ApiError>>>,
}

/// Single-flight coordinator for session refresh.
///
/// At most one refresh call is in flight at a time. Callers that hit the
/// expiry signature while one is outstanding park on a oneshot waiter and
/// receive the shared outcome when it settles: `Ok` means "replay your
/// original request", `Err` carries the refresh failure verbatim.
///
/// The flag and queue live behind one mutex so "check flag + enqueue" and
/// "clear flag + drain" are each atomic. Waiters drain in arrival order.
pub struct SessionGate {
    inner: Mutex<GateInner>,
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGate {
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Mutex::new(GateInner { refreshing: false, waiters: Vec::new() }) }
    }

    /// Run `op`, transparently recovering from one expired-session failure.
    ///
    /// On the expiry signature the caller either joins the in-flight refresh
    /// or becomes its leader via `refresh`, then replays `op` exactly once.
    /// A replay that expires again propagates the error as-is, so each
    /// original call triggers at most one refresh cycle. Every other error
    /// passes through untouched.
    ///
    /// `refresh` must not itself route through this gate.
    ///
    /// # Errors
    ///
    /// Returns `op`'s error unchanged for non-expiry failures, or the
    /// refresh error when recovery fails.
    pub async fn run<T, Op, OpFut, Refresh, RefreshFut>(
        &self,
        op: Op,
        refresh: Refresh,
    ) -> Result<T, ApiError>
    where
        Op: Fn() -> OpFut,
        OpFut: Future<Output = Result<T, ApiError>>,
        Refresh: FnOnce() -> RefreshFut,
        RefreshFut: Future<Output = Result<(), ApiError>>,
    {
        match op().await {
            Ok(value) => Ok(value),
            Err(err) if err.is_session_expired() => {
                self.refresh_or_wait(refresh).await?;
                // Single replay. A repeated expiry here is not retried again.
                op().await
            }
            Err(err) => Err(err),
        }
    }

    /// Join the in-flight refresh, or lead a new one and wake the queue.
    async fn refresh_or_wait<Refresh, RefreshFut>(&self, refresh: Refresh) -> Result<(), ApiError>
    where
        Refresh: FnOnce() -> RefreshFut,
        RefreshFut: Future<Output = Result<(), ApiError>>,
    {
        {
            let mut inner = self.lock();
            if inner.refreshing {
                let (tx, rx) = oneshot::channel();
                inner.waiters.push(tx);
                drop(inner);
                return match rx.await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(ApiError::Network("session refresh abandoned".to_owned())),
                };
            }
            inner.refreshing = true;
        }

        let outcome = refresh().await;

        let waiters = {
            let mut inner = self.lock();
            inner.refreshing = false;
            std::mem::take(&mut inner.waiters)
        };
        for waiter in waiters {
            let _ = waiter.send(outcome.clone());
        }
        outcome
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, GateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Issue an HTTP request with credentials and map failures to [`ApiError`].
///
/// Error bodies are expected to carry a `message` field; when they do not,
/// the status code stands in.
#[cfg(feature = "hydrate")]
pub async fn perform<T: serde::de::DeserializeOwned>(
    method: gloo_net::http::Method,
    url: &str,
    body: Option<serde_json::Value>,
) -> Result<T, ApiError> {
    let resp = send_raw(method, url, body).await?;
    resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
}

/// Like [`perform`], for endpoints whose response body we discard.
#[cfg(feature = "hydrate")]
pub async fn perform_unit(
    method: gloo_net::http::Method,
    url: &str,
    body: Option<serde_json::Value>,
) -> Result<(), ApiError> {
    send_raw(method, url, body).await.map(|_| ())
}

#[cfg(feature = "hydrate")]
async fn send_raw(
    method: gloo_net::http::Method,
    url: &str,
    body: Option<serde_json::Value>,
) -> Result<gloo_net::http::Response, ApiError> {
    let builder = gloo_net::http::RequestBuilder::new(url)
        .method(method)
        .credentials(web_sys::RequestCredentials::Include);

    let resp = match body {
        Some(json) => builder
            .json(&json)
            .map_err(|e| ApiError::Network(e.to_string()))?
            .send()
            .await,
        None => builder.send().await,
    }
    .map_err(|e| ApiError::Network(e.to_string()))?;

    if resp.ok() {
        return Ok(resp);
    }
    Err(error_from_response(resp).await)
}

#[cfg(feature = "hydrate")]
async fn error_from_response(resp: gloo_net::http::Response) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = resp.status();
    let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => format!("request failed with status {status}"),
    };
    ApiError::Status { status, message }
}

/// `POST /auth/refresh-token`. Exempt from the session gate: a refresh
/// failure must surface directly, never recurse into another refresh.
#[cfg(feature = "hydrate")]
pub async fn refresh_session(config: &ApiConfig) -> Result<(), ApiError> {
    let url = format!("{}/auth/refresh-token", config.api_base);
    perform_unit(gloo_net::http::Method::POST, &url, None).await
}
