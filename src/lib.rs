//! Purpose: Library crate backing the `gmaps-geocode` CLI and its tests.
//! Exports: `api` (context, transport, geocoding operations, errors).
//! Role: Client binding for the Google Maps Geocoding JSON API.
//! Invariants: No process-wide state; every call takes an explicit `Context`.
//! Invariants: Core modules are pure; only `api::transport` performs I/O.
pub mod api;
mod core;
