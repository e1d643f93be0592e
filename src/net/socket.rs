//! Real-time ride-state synchronizer.
//!
//! [`RideSocket`] owns the single push-channel connection for the whole app
//! and applies inbound events to the shared [`RideState`]. The WebSocket
//! transport itself is gated behind `#[cfg(feature = "hydrate")]`; the
//! connection handle, close classification, and event dispatch are plain
//! Rust and tested natively.
//!
//! RECONNECT POLICY
//! ================
//! Transient drops retry forever with backoff (1s base, 5s cap). A clean
//! server-initiated close instead gets exactly one manual reconnect after a
//! fixed delay, fired only if nothing reconnected in the meantime.

#[cfg(test)]
#[path = "socket_test.rs"]
mod socket_test;

use std::sync::{Arc, Mutex, PoisonError};

use futures::channel::mpsc;
use serde_json::Value;

use crate::net::http::ApiConfig;
use crate::net::types::{Envelope, RideStatus};
use crate::state::ride::RideState;

/// Base reconnect delay after a transient drop, in milliseconds.
pub const RECONNECT_BASE_MS: u32 = 1000;

/// Cap on the reconnect delay, in milliseconds.
pub const RECONNECT_MAX_MS: u32 = 5000;

/// Fixed delay before the single manual reconnect that follows a
/// server-initiated close, in milliseconds.
pub const SERVER_CLOSE_RETRY_MS: u32 = 3000;

/// Transport-level connection phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Connecting,
    Connected,
    Disconnected,
}

/// Why a session ended, as derived from the close frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloseKind {
    /// The server closed us on purpose; reconnect once, after a fixed delay.
    Server,
    /// Network drop or transport error; the automatic retry loop handles it.
    Transient,
}

/// Classify a WebSocket close frame.
///
/// Clean going-away/normal closes are treated as server-initiated;
/// everything else counts as a transient drop.
#[must_use]
pub fn classify_close(code: u16, was_clean: bool) -> CloseKind {
    if was_clean && (code == 1000 || code == 1001) {
        CloseKind::Server
    } else {
        CloseKind::Transient
    }
}

/// Shared handle for one push-channel connection.
///
/// Holds the outgoing message channel and the current phase. The receiving
/// half is taken exactly once by the transport task.
pub struct Connection {
    outgoing: mpsc::UnboundedSender<String>,
    incoming: Mutex<Option<mpsc::UnboundedReceiver<String>>>,
    phase: Mutex<Phase>,
}

impl Connection {
    fn new() -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded();
        Arc::new(Self {
            outgoing: tx,
            incoming: Mutex::new(Some(rx)),
            phase: Mutex::new(Phase::Connecting),
        })
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        *lock(&self.phase)
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase() == Phase::Connected
    }

    fn set_phase(&self, phase: Phase) {
        *lock(&self.phase) = phase;
    }

    /// Queue an event for the server. Returns `false` once the connection
    /// has been torn down.
    pub fn send_event(&self, event: &str, data: &Value) -> bool {
        let envelope = Envelope { event: event.to_owned(), data: data.clone() };
        match serde_json::to_string(&envelope) {
            Ok(json) => self.outgoing.unbounded_send(json).is_ok(),
            Err(_) => false,
        }
    }

    fn take_incoming(&self) -> Option<mpsc::UnboundedReceiver<String>> {
        lock(&self.incoming).take()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Context-scoped owner of the app's single push-channel connection.
pub struct RideSocket {
    config: ApiConfig,
    conn: Mutex<Option<Arc<Connection>>>,
}

impl RideSocket {
    #[must_use]
    pub fn new(config: ApiConfig) -> Self {
        Self { config, conn: Mutex::new(None) }
    }

    /// The shared connection handle, created lazily on first access.
    ///
    /// Repeated calls return the same handle, whether it is still
    /// connecting or already connected, until [`teardown`](Self::teardown).
    pub fn connection(&self) -> Arc<Connection> {
        let mut slot = lock(&self.conn);
        if let Some(conn) = slot.as_ref() {
            return Arc::clone(conn);
        }
        let conn = Connection::new();
        *slot = Some(Arc::clone(&conn));
        conn
    }

    /// The current handle without creating one.
    pub fn current(&self) -> Option<Arc<Connection>> {
        lock(&self.conn).clone()
    }

    /// Close the connection and release the handle. The next access builds
    /// a fresh connection.
    pub fn teardown(&self) {
        if let Some(conn) = lock(&self.conn).take() {
            conn.outgoing.close_channel();
            conn.set_phase(Phase::Disconnected);
        }
    }

    /// Ensure the connection exists and its transport task is running.
    /// A no-op returning the existing handle when already initialized.
    #[cfg(feature = "hydrate")]
    pub fn connect(&self, ride: leptos::prelude::RwSignal<RideState>) -> Arc<Connection> {
        let conn = self.connection();
        if let Some(rx) = conn.take_incoming() {
            let config = self.config.clone();
            leptos::task::spawn_local(transport_loop(Arc::clone(&conn), rx, ride, config));
        }
        conn
    }
}

/// Apply one inbound push event to the ride record. Unknown events are
/// ignored; malformed payloads are logged and dropped.
pub fn apply_push_event(state: &mut RideState, event: &str, data: &Value) {
    match event {
        "ride:status" => {
            let status = data
                .get("status")
                .and_then(|v| serde_json::from_value::<RideStatus>(v.clone()).ok());
            let timestamp = data.get("timestamp").and_then(Value::as_i64);
            let by = data.get("by").and_then(Value::as_str);
            match (status, timestamp, by) {
                (Some(status), Some(timestamp), Some(by)) => {
                    state.apply_status_change(status, timestamp, by);
                }
                _ => {
                    leptos::logging::warn!("ride socket: malformed ride:status payload: {data}");
                }
            }
        }

        "ride:update" => state.merge_patch(data),

        "driver:location" => {
            let coords = data.as_array().and_then(|pair| match pair.as_slice() {
                [lng, lat] => Some((lng.as_f64()?, lat.as_f64()?)),
                _ => None,
            });
            match coords {
                Some((lng, lat)) => state.apply_driver_location(lng, lat),
                None => {
                    leptos::logging::warn!("ride socket: malformed driver:location payload: {data}");
                }
            }
        }

        _ => {}
    }
}

/// Main connection loop with reconnect logic.
#[cfg(feature = "hydrate")]
async fn transport_loop(
    conn: Arc<Connection>,
    rx: mpsc::UnboundedReceiver<String>,
    ride: leptos::prelude::RwSignal<RideState>,
    config: ApiConfig,
) {
    use leptos::prelude::Update;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    let rx = Rc::new(RefCell::new(rx));
    let mut backoff_ms = RECONNECT_BASE_MS;

    loop {
        conn.set_phase(Phase::Connecting);
        let url = socket_url(&config);
        let end = run_session(&conn, &rx, ride, &url).await;

        conn.set_phase(Phase::Disconnected);
        ride.update(|r| r.connected = false);

        match end {
            SessionEnd::Local => break,
            SessionEnd::Server => {
                leptos::logging::log!("ride socket: server closed the connection");
                gloo_timers::future::sleep(Duration::from_millis(u64::from(
                    SERVER_CLOSE_RETRY_MS,
                )))
                .await;
                // Skip the one manual attempt if something already brought
                // the connection back while we waited.
                if conn.is_connected() {
                    break;
                }
                backoff_ms = RECONNECT_BASE_MS;
            }
            SessionEnd::Transient(reason) => {
                if let Some(reason) = reason {
                    leptos::logging::warn!("ride socket: {reason}");
                }
                gloo_timers::future::sleep(Duration::from_millis(u64::from(backoff_ms))).await;
                backoff_ms = (backoff_ms * 2).min(RECONNECT_MAX_MS);
            }
        }

        if conn.outgoing.is_closed() {
            break;
        }
    }
}

#[cfg(feature = "hydrate")]
enum SessionEnd {
    /// Torn down from our side; stop for good.
    Local,
    /// Clean server close.
    Server,
    /// Network drop, connect failure, or transport error.
    Transient(Option<String>),
}

/// Connect and pump messages until the session ends.
#[cfg(feature = "hydrate")]
async fn run_session(
    conn: &Arc<Connection>,
    rx: &std::rc::Rc<std::cell::RefCell<mpsc::UnboundedReceiver<String>>>,
    ride: leptos::prelude::RwSignal<RideState>,
    url: &str,
) -> SessionEnd {
    use futures::future::Either;
    use futures::{SinkExt, StreamExt};
    use gloo_net::websocket::futures::WebSocket;
    use gloo_net::websocket::{Message, WebSocketError};
    use leptos::prelude::Update;

    let ws = match WebSocket::open(url) {
        Ok(ws) => ws,
        Err(e) => return SessionEnd::Transient(Some(format!("connect failed: {e}"))),
    };
    let (mut ws_write, mut ws_read) = ws.split();

    conn.set_phase(Phase::Connected);
    ride.update(|r| r.connected = true);

    // Forward outgoing messages from the shared channel to the socket.
    let mut rx_borrow = rx.borrow_mut();
    let send_task = async {
        while let Some(msg) = rx_borrow.next().await {
            if ws_write.send(Message::Text(msg)).await.is_err() {
                return SessionEnd::Transient(Some("send failed".to_owned()));
            }
        }
        // Channel closed: teardown from our side.
        SessionEnd::Local
    };

    // Dispatch inbound events into the ride store.
    let recv_task = async {
        while let Some(msg) = ws_read.next().await {
            match msg {
                Ok(Message::Text(text)) => match serde_json::from_str::<Envelope>(&text) {
                    Ok(envelope) => {
                        ride.update(|r| apply_push_event(r, &envelope.event, &envelope.data));
                    }
                    Err(e) => leptos::logging::warn!("ride socket: bad envelope: {e}"),
                },
                Ok(Message::Bytes(_)) => {}
                Err(WebSocketError::ConnectionClose(ev)) => {
                    return match classify_close(ev.code, ev.was_clean) {
                        CloseKind::Server => SessionEnd::Server,
                        CloseKind::Transient => SessionEnd::Transient(Some(format!(
                            "closed: code {} ({})",
                            ev.code, ev.reason
                        ))),
                    };
                }
                Err(e) => return SessionEnd::Transient(Some(format!("recv error: {e}"))),
            }
        }
        SessionEnd::Transient(None)
    };

    match futures::future::select(Box::pin(send_task), Box::pin(recv_task)).await {
        Either::Left((end, _)) | Either::Right((end, _)) => end,
    }
}

/// Derive the WebSocket URL from the page location and configured path.
#[cfg(feature = "hydrate")]
fn socket_url(config: &ApiConfig) -> String {
    let location = web_sys::window()
        .and_then(|w| w.location().href().ok())
        .unwrap_or_default();
    let ws_proto = if location.starts_with("https") { "wss" } else { "ws" };
    let host = web_sys::window()
        .and_then(|w| w.location().host().ok())
        .unwrap_or_else(|| "localhost:3000".to_owned());
    format!("{ws_proto}://{host}{}", config.socket_path)
}
