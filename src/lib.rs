//! # rideline-client
//!
//! Leptos + WASM front end for the Rideline ride-hailing application:
//! marketing/login pages, rider and driver dashboards, an admin summary,
//! and the data-fetching/state glue between them and the backend.
//!
//! The two stateful subsystems live under [`net`]: the REST client with
//! single-flight session refresh, and the real-time ride socket that keeps
//! the shared [`state::ride::RideState`] in sync with push events.

pub mod app;
pub mod components;
pub mod net;
pub mod pages;
pub mod state;

/// Client-side entry point: install panic/log hooks and hydrate the app.
#[cfg(feature = "hydrate")]
#[wasm_bindgen::prelude::wasm_bindgen]
pub fn hydrate() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);
    leptos::mount::hydrate_body(crate::app::App);
}
