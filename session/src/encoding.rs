//! Percent-encoding for URL path segments and query values.

#[cfg(test)]
#[path = "encoding_test.rs"]
mod tests;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Everything except RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Like [`COMPONENT`] but leaves `/` readable.
const QUERY_VALUE: &AsciiSet = &COMPONENT.remove(b'/');

/// Percent-encode a path segment or query value.
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Escape a query value, leaving `/` readable.
#[must_use]
pub fn encode_query_value(value: &str) -> String {
    utf8_percent_encode(value, QUERY_VALUE).to_string()
}
