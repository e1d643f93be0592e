//! Reusable UI components.

pub mod ride_card;
pub mod status_bar;
