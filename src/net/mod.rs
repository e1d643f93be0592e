//! Network layer: REST client with single-flight session refresh, wire
//! types, and the real-time ride socket.

pub mod api;
pub mod http;
pub mod socket;
pub mod types;
