//! Purpose: Define the public Rust API boundary for the geocoding client.
//! Exports: `Context`, transport seam, request types, `geocode`, `reverse_geocode`, errors.
//! Role: Public surface; hides the pure normalization/encoding modules behind re-exports.
//! Invariants: Every operation takes `&Context`; there is no module-level credential.
//! Invariants: Results are passed through as JSON values; only the envelope is modeled.

mod context;
mod geocoding;
mod transport;

pub use crate::core::error::{Error, ErrorKind, to_exit_code};
pub use crate::core::params::{Bounds, Component, ComponentFilter, LatLng, MultiValue};
pub use crate::core::query::{DEFAULT_ENDPOINT, redact_key};
pub use context::Context;
pub use geocoding::{
    GeocodeRequest, ReverseGeocodeOptions, geocode, geocode_url, reverse_geocode,
    reverse_geocode_url,
};
pub use transport::{RawResponse, Transport, UreqTransport};

pub type ApiResult<T> = Result<T, Error>;
