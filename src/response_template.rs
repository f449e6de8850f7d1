use crate::error::StubError;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode};
use serde::Serialize;
use std::convert::TryInto;

/// The `Content-Type` of every stubbed response that does not set its own.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// The blueprint for the response returned when a [`Stub`] matches an outgoing request.
///
/// [`Stub`]: crate::Stub
#[derive(Clone, Debug, PartialEq)]
pub struct ResponseTemplate {
    status_code: StatusCode,
    headers: HeaderMap,
    body: Vec<u8>,
}

// Templates written inline in tests panic on invalid literals, see `new` and `insert_header`.
// Templates assembled from configuration files go through the `try_*` variants instead.
impl ResponseTemplate {
    /// Start building a `ResponseTemplate` specifying the status code of the response.
    pub fn new<S>(s: S) -> Self
    where
        S: TryInto<StatusCode>,
        <S as TryInto<StatusCode>>::Error: std::fmt::Debug,
    {
        let status_code = s.try_into().expect("Failed to convert into status code.");
        Self {
            status_code,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Start building a `ResponseTemplate` from a status code read at runtime.
    pub fn try_new(status_code: u16) -> Result<Self, StubError> {
        let status_code =
            StatusCode::from_u16(status_code).map_err(|_| StubError::InvalidStatusCode {
                value: status_code.to_string(),
            })?;
        Ok(Self::new(status_code))
    }

    /// Append a header `value` to list of headers with `key` as header name.
    ///
    /// Unlike `insert_header`, this function will not override the contents of a header:
    /// - if there are no header values with `key` as header name, it will insert one;
    /// - if there are already some values with `key` as header name, it will append to the
    ///   existing list.
    pub fn append_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.append(key, value);
        self
    }

    /// Insert a header `value` with `key` as header name.
    ///
    /// This function will override the contents of a header:
    /// - if there are no header values with `key` as header name, it will insert one;
    /// - if there are already some values with `key` as header name, it will drop them and
    ///   start a new list of header values, containing only `value`.
    ///
    /// Inserting a `Content-Type` replaces the default one.
    ///
    /// ### Example:
    /// ```rust
    /// use httpstub::ResponseTemplate;
    ///
    /// let response = ResponseTemplate::new(200)
    ///     .insert_header("X-Correlation-ID", "1311db4f")
    ///     .insert_header("content-type", "text/plain")
    ///     .generate_response();
    ///
    /// assert_eq!(response.headers()["x-correlation-id"], "1311db4f");
    /// assert_eq!(response.headers()["content-type"], "text/plain");
    /// ```
    pub fn insert_header<K, V>(mut self, key: K, value: V) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
    {
        let key = key.try_into().expect("Failed to convert into header name.");
        let value = value
            .try_into()
            .expect("Failed to convert into header value.");
        self.headers.insert(key, value);
        self
    }

    /// Fallible counterpart of [`insert_header`](Self::insert_header) for headers read at runtime.
    pub fn try_insert_header(mut self, key: &str, value: &str) -> Result<Self, StubError> {
        let invalid = || StubError::InvalidHeader {
            name: key.to_owned(),
            value: value.to_owned(),
        };
        let name = HeaderName::from_bytes(key.as_bytes()).map_err(|_| invalid())?;
        let value = HeaderValue::from_str(value).map_err(|_| invalid())?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Append multiple header key-value pairs.
    ///
    /// Existing header values will not be overridden.
    pub fn append_headers<K, V, I>(mut self, headers: I) -> Self
    where
        K: TryInto<HeaderName>,
        <K as TryInto<HeaderName>>::Error: std::fmt::Debug,
        V: TryInto<HeaderValue>,
        <V as TryInto<HeaderValue>>::Error: std::fmt::Debug,
        I: IntoIterator<Item = (K, V)>,
    {
        let headers = headers.into_iter().map(|(key, value)| {
            (
                key.try_into().expect("Failed to convert into header name."),
                value
                    .try_into()
                    .expect("Failed to convert into header value."),
            )
        });
        // `Extend<(HeaderName, T)>` appends.
        self.headers.extend(headers);
        self
    }

    /// Set the response body with bytes.
    ///
    /// The bytes are returned verbatim: no transformation, no re-encoding.
    pub fn set_body_bytes<B>(mut self, body: B) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.body = body.into();
        self
    }

    /// Set the response body from a JSON-serializable value.
    pub fn set_body_json<B: Serialize>(mut self, body: B) -> Self {
        self.body = serde_json::to_vec(&body).expect("Failed to convert into body.");
        self
    }

    /// Set the response body to a string.
    pub fn set_body_string<T>(mut self, body: T) -> Self
    where
        T: Into<String>,
    {
        self.body = body.into().into_bytes();
        self
    }

    /// Set a raw response body together with its mime type, which replaces the default
    /// `Content-Type`.
    ///
    /// ### Example:
    /// ```rust
    /// use httpstub::ResponseTemplate;
    ///
    /// let response = ResponseTemplate::new(200)
    ///     .set_body_raw("<h1>Hello</h1>", "text/html")
    ///     .generate_response();
    ///
    /// assert_eq!(response.headers()["content-type"], "text/html");
    /// assert_eq!(response.body(), b"<h1>Hello</h1>");
    /// ```
    pub fn set_body_raw<B>(self, body: B, mime: &str) -> Self
    where
        B: Into<Vec<u8>>,
    {
        self.set_body_bytes(body).insert_header(CONTENT_TYPE, mime)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Generate a response from the template.
    ///
    /// Two calls on the same template always produce the same response.
    pub fn generate_response(&self) -> Response<Vec<u8>> {
        let mut headers = self.headers.clone();
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_CONTENT_TYPE));
        }

        let mut response = Response::new(self.body.clone());
        *response.status_mut() = self.status_code;
        *response.headers_mut() = headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn default_content_type_is_json() {
        let response = ResponseTemplate::new(201).generate_response();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
        assert!(response.body().is_empty());
    }

    #[test]
    fn body_bytes_are_returned_verbatim() {
        let body = b"{\n    \"access_token\": \"asdf\"\n}".to_vec();

        let response = ResponseTemplate::new(200)
            .set_body_bytes(body.clone())
            .generate_response();

        assert_eq!(response.body(), &body);
    }

    #[test]
    fn json_bodies_are_serialized() {
        let response = ResponseTemplate::new(200)
            .set_body_json(json!({ "access_token": "asdf" }))
            .generate_response();

        assert_eq!(response.body(), br#"{"access_token":"asdf"}"#);
    }

    #[test]
    fn appended_headers_keep_every_value() {
        let response = ResponseTemplate::new(200)
            .append_headers(vec![
                ("Set-Cookie", "name=value"),
                ("Set-Cookie", "name2=value2; Domain=example.com"),
            ])
            .append_header("Set-Cookie", "name3=value3")
            .generate_response();

        assert_eq!(response.headers().get_all("set-cookie").iter().count(), 3);
        assert_eq!(response.headers()[CONTENT_TYPE], DEFAULT_CONTENT_TYPE);
    }

    #[test]
    fn out_of_range_status_codes_are_rejected() {
        let error = ResponseTemplate::try_new(1000).unwrap_err();

        assert!(matches!(error, StubError::InvalidStatusCode { value } if value == "1000"));
    }

    #[test]
    fn invalid_header_names_are_rejected() {
        let error = ResponseTemplate::new(200)
            .try_insert_header("bad header", "value")
            .unwrap_err();

        assert!(matches!(error, StubError::InvalidHeader { name, .. } if name == "bad header"));
    }

    #[test]
    fn templates_generate_identical_responses() {
        let template = ResponseTemplate::new(200)
            .insert_header("x-stub", "1")
            .set_body_string("{}");

        let first = template.generate_response();
        let second = template.generate_response();

        assert_eq!(first.status(), second.status());
        assert_eq!(first.headers(), second.headers());
        assert_eq!(first.body(), second.body());
    }
}
