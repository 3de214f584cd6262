//! Transport-neutral request and response types passed through rewrite handlers.
//!
//! Headers are kept as ordered `(name, value)` pairs so repeated headers
//! such as `set-cookie` survive the trip through the proxy.

mod request;
mod response;

pub use hyper::{Method, StatusCode};
pub use request::HostingRequest;
pub use response::HostingResponse;

/// Find the first value of a header, ignoring ASCII case of the name.
fn first_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// All values of a header in arrival order, ignoring ASCII case of the name.
fn all_headers<'a>(headers: &'a [(String, String)], name: &str) -> Vec<&'a str> {
    headers
        .iter()
        .filter(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
        .collect()
}
