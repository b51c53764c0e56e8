//! Networking modules for the REST request pipeline.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` is the outbound HTTP port, `gateway` the request pipeline on
//! top of it, `refresh` the single-flight token refresh the gateway shares
//! across concurrent requests, `error` the failure taxonomy surfaced to
//! callers, and `types` the shared wire envelope.

pub mod error;
pub mod gateway;
pub mod refresh;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use session::encode_component;
