use std::fmt;

use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::de::DeserializeOwned;
use url::Url;

pub const BODY_PRINT_LIMIT: usize = 10_000;

/// Specifies limitations on printing request bodies when logging requests. Bodies may be too
/// large to reasonably print and it may be desirable to limit them.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyPrintLimit {
    /// Maximum length of a body to print in bytes.
    Limited(usize),
    /// There is no limit to the size of a body that may be printed.
    Unlimited,
}

impl Default for BodyPrintLimit {
    fn default() -> Self {
        BodyPrintLimit::Limited(BODY_PRINT_LIMIT)
    }
}

/// An outgoing request, as seen by the [`Interceptor`].
///
/// Stubs only look at `method` and `url`. `headers` and `body` travel along so that a request
/// which is passed through can still be sent over the network unmodified.
///
/// [`Interceptor`]: crate::Interceptor
#[derive(Debug, Clone)]
pub struct Request {
    pub url: Url,
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl Request {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            url,
            method,
            headers: HeaderMap::new(),
            body: Vec::new(),
        }
    }

    /// Shorthand to build a request from string literals.
    ///
    /// Panics if `method` or `url` are not valid: use [`Request::new`] for runtime input.
    pub fn from_parts(method: &str, url: &str) -> Self {
        let method = Method::from_bytes(method.as_bytes()).expect("Failed to parse HTTP method.");
        let url = Url::parse(url).expect("Failed to parse request URL.");
        Self::new(method, url)
    }

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

    pub fn set_body<B: Into<Vec<u8>>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn body_json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Capture an `http::Request` built by the application's HTTP stack.
    ///
    /// The URI must be absolute: relative URIs cannot be matched against URL patterns.
    pub fn from_http<B: AsRef<[u8]>>(request: &http::Request<B>) -> Result<Self, url::ParseError> {
        let url = Url::parse(&request.uri().to_string())?;
        Ok(Self {
            url,
            method: request.method().clone(),
            headers: request.headers().clone(),
            body: request.body().as_ref().to_vec(),
        })
    }

    pub(crate) fn print_with_limit(
        &self,
        mut buffer: impl fmt::Write,
        body_print_limit: BodyPrintLimit,
    ) -> fmt::Result {
        writeln!(buffer, "{} {}", self.method, self.url)?;
        for name in self.headers.keys() {
            let values = self
                .headers
                .get_all(name)
                .iter()
                .map(|value| String::from_utf8_lossy(value.as_bytes()))
                .collect::<Vec<_>>();
            writeln!(buffer, "{}: {}", name, values.join(","))?;
        }

        if self.body.is_empty() {
            return Ok(());
        }
        let printable = match body_print_limit {
            BodyPrintLimit::Limited(limit) if self.body.len() > limit => &self.body[..limit],
            _ => &self.body[..],
        };
        match std::str::from_utf8(printable) {
            Ok(body) => writeln!(buffer, "{}", body)?,
            // The limit may have split a multi-byte character.
            Err(e) if e.error_len().is_none() => {
                writeln!(buffer, "{}", String::from_utf8_lossy(&printable[..e.valid_up_to()]))?
            }
            Err(_) => {
                return writeln!(
                    buffer,
                    "Body is likely binary (invalid utf-8) size is {} bytes",
                    self.body.len()
                );
            }
        }
        if printable.len() < self.body.len() {
            writeln!(
                buffer,
                "We truncated the body because it was too large: {} bytes (limit: {} bytes)",
                self.body.len(),
                printable.len()
            )?;
            writeln!(
                buffer,
                "Increase this limit by setting `HTTPSTUB_BODY_PRINT_LIMIT`, or calling `StubberBuilder::body_print_limit`"
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.print_with_limit(f, BodyPrintLimit::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_bodies_are_truncated_when_printed() {
        let request = Request::from_parts("POST", "https://example.com/sign_up")
            .set_body("a".repeat(20));
        let mut output = String::new();

        request
            .print_with_limit(&mut output, BodyPrintLimit::Limited(5))
            .unwrap();

        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines[0], "POST https://example.com/sign_up");
        assert_eq!(lines[1], "aaaaa");
        assert!(lines[2].starts_with("We truncated the body"));
    }

    #[test]
    fn binary_bodies_are_not_printed() {
        let request =
            Request::from_parts("POST", "https://example.com/upload").set_body(vec![0xff, 0xfe]);
        let mut output = String::new();

        request
            .print_with_limit(&mut output, BodyPrintLimit::Unlimited)
            .unwrap();

        assert!(output.contains("Body is likely binary (invalid utf-8) size is 2 bytes"));
    }

    #[test]
    fn http_requests_are_captured_with_their_absolute_url() {
        let request = http::Request::post("https://example.com/sign_up?ref=1")
            .header("x-request-id", "42")
            .body(b"{}".to_vec())
            .unwrap();

        let captured = Request::from_http(&request).unwrap();

        assert_eq!(captured.method, Method::POST);
        assert_eq!(captured.url.as_str(), "https://example.com/sign_up?ref=1");
        assert_eq!(captured.headers["x-request-id"], "42");
        assert_eq!(captured.body, b"{}");
    }

    #[test]
    fn relative_http_requests_are_rejected() {
        let request = http::Request::get("/sign_up").body(Vec::new()).unwrap();

        assert!(Request::from_http(&request).is_err());
    }
}
