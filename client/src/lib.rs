//! Marketplace API client.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` is the request pipeline: auth header attachment, error
//! normalization and the coalesced refresh-and-replay on 401. `api` holds the
//! thin typed endpoint calls built on it, and `state` the session flows
//! (sign-in, identity verification, role switching, profile checks) that
//! combine endpoint calls with [`session::SessionStore`] mutations.

pub mod api;
pub mod config;
pub mod net;
pub mod state;

pub use config::{ConfigError, GatewayConfig};
pub use net::error::{ApiError, FieldError};
pub use net::gateway::{ApiGateway, LoggingNavigator, Navigator, RequestOptions};
pub use net::transport::{Method, OutgoingRequest, RawResponse, ReqwestTransport, Transport, TransportError};
pub use net::types::ApiResponse;
