//! Routed pages.

pub mod admin;
pub mod dashboard;
pub mod drive;
pub mod login;
