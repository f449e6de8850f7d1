//! Convenient re-exports of http types that are part of `httpstub`'s public API.
pub use http::{HeaderMap, HeaderName, HeaderValue, Method, Response, StatusCode};
pub use url::Url;
