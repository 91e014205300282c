// Pure building blocks: error model, parameter normalization, query encoding, envelopes.
pub mod envelope;
pub mod error;
pub mod params;
pub mod query;
