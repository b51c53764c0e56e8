//! Country and timezone lookup for registration forms.

use std::collections::BTreeMap;

use crate::net::error::ApiError;
use crate::net::gateway::{ApiGateway, RequestOptions};
use crate::net::types::ApiResponse;

/// Country name to its IANA timezones.
pub type CountryTimezones = BTreeMap<String, Vec<String>>;

/// `GET /country` (public).
///
/// # Errors
///
/// Propagates gateway failures.
pub async fn countries(gateway: &ApiGateway) -> Result<ApiResponse<CountryTimezones>, ApiError> {
    gateway.get("/country", &RequestOptions::public()).await
}

/// Timezones for `country`, or empty when unknown.
#[must_use]
pub fn timezones_for<'a>(map: &'a CountryTimezones, country: &str) -> &'a [String] {
    map.get(country).map_or(&[], Vec::as_slice)
}
