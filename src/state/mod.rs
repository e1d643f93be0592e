//! Shared client-side state modules.
//!
//! DESIGN
//! ======
//! State is split by domain (`auth`, `ride`, `cache`) so individual
//! components can depend on small focused models. All mutation happens
//! through reducers on the state structs; both REST responses and push
//! events funnel into the same [`ride::RideState`] record.

pub mod auth;
pub mod cache;
pub mod ride;
