//! `mostrador-api` — HTTP surface.
//!
//! Exposed as a library so black-box tests can assemble the exact router the
//! binary serves.

pub mod app;
pub mod context;
pub mod middleware;
