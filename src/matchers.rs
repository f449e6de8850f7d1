//! The matching strategies a [`Stub`](crate::Stub) is built from.
//!
//! Every stub is keyed on an HTTP method and a URL pattern, see [`RuleMatcher`]. Extra
//! constraints can be layered on top using the [`Match`] trait: `Fn` closures that take an
//! immutable [`Request`] reference as input and return a boolean implement it out of the box.
use crate::error::StubError;
use crate::{Match, Request};
use http::Method;
use regex::Regex;

/// Implement the `Match` trait for all closures, out of the box,
/// if their signature is compatible.
impl<F> Match for F
where
    F: Fn(&Request) -> bool,
    F: Send + Sync,
{
    fn matches(&self, request: &Request) -> bool {
        self(request)
    }
}

#[derive(Debug, Clone)]
/// Match **exactly** the method of a request.
///
/// The comparison is case-sensitive: a matcher built from `"post"` does not match a `POST`
/// request.
///
/// ### Example:
/// ```rust
/// use httpstub::{Match, Request};
/// use httpstub::matchers::method;
///
/// let matcher = method("POST");
///
/// assert!(matcher.matches(&Request::from_parts("POST", "https://example.com/sign_up")));
/// assert!(!matcher.matches(&Request::from_parts("GET", "https://example.com/sign_up")));
/// ```
pub struct MethodExactMatcher(Method);

/// Shorthand for [`MethodExactMatcher::new`].
pub fn method<T>(method: T) -> MethodExactMatcher
where
    T: AsRef<str>,
{
    MethodExactMatcher::new(method)
}

impl MethodExactMatcher {
    /// Panics if `method` is not a valid HTTP method: use [`MethodExactMatcher::try_new`]
    /// for configuration-driven input.
    pub fn new<T>(method: T) -> Self
    where
        T: AsRef<str>,
    {
        Self::try_new(method).expect("Failed to convert to HTTP method.")
    }

    pub fn try_new<T>(method: T) -> Result<Self, StubError>
    where
        T: AsRef<str>,
    {
        let method = method.as_ref();
        Method::from_bytes(method.as_bytes())
            .map(Self)
            .map_err(|_| StubError::InvalidMethod {
                method: method.to_owned(),
            })
    }

    pub fn method(&self) -> &Method {
        &self.0
    }
}

impl Match for MethodExactMatcher {
    fn matches(&self, request: &Request) -> bool {
        request.method == self.0
    }
}

#[derive(Debug, Clone)]
/// Match the full absolute URL of a request against a regular expression.
///
/// The pattern only has to match somewhere in the URL: `sign_up` matches
/// `https://example.com/v1/sign_up?ref=home`. Use anchors (`^`, `$`) to be stricter.
///
/// The pattern sees the URL as normalized by [`url::Url`], not the string the caller
/// started from: the scheme and host are lowercased, default ports (`:443` for `https`) are
/// dropped and characters not allowed in a URL are percent-encoded.
/// `https://EXAMPLE.com:443/a b` is matched as `https://example.com/a%20b`.
///
/// ### Example:
/// ```rust
/// use httpstub::{Match, Request};
/// use httpstub::matchers::url_regex;
///
/// let matcher = url_regex(r"/users/\d+$");
///
/// assert!(matcher.matches(&Request::from_parts("GET", "https://example.com/users/42")));
/// assert!(!matcher.matches(&Request::from_parts("GET", "https://example.com/users/42/posts")));
/// ```
pub struct UrlRegexMatcher(Regex);

/// Shorthand for [`UrlRegexMatcher::new`].
pub fn url_regex<T>(pattern: T) -> UrlRegexMatcher
where
    T: AsRef<str>,
{
    UrlRegexMatcher::new(pattern)
}

impl UrlRegexMatcher {
    /// Panics if `pattern` is not a valid regular expression: use [`UrlRegexMatcher::try_new`]
    /// for configuration-driven input.
    pub fn new<T>(pattern: T) -> Self
    where
        T: AsRef<str>,
    {
        Self::try_new(pattern).expect("Failed to create regex for URL matcher")
    }

    pub fn try_new<T>(pattern: T) -> Result<Self, StubError>
    where
        T: AsRef<str>,
    {
        let pattern = pattern.as_ref();
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| StubError::Pattern {
                pattern: pattern.to_owned(),
                source,
            })
    }

    pub fn pattern(&self) -> &str {
        self.0.as_str()
    }
}

impl Match for UrlRegexMatcher {
    fn matches(&self, request: &Request) -> bool {
        self.0.is_match(request.url.as_str())
    }
}

#[derive(Debug, Clone)]
/// The matcher every [`Stub`](crate::Stub) is keyed on: an exact method and a URL pattern.
///
/// Both halves are compiled once, when the matcher is built. Matching is then a pure function
/// of the request and can be evaluated from any number of threads at once.
///
/// ### Example:
/// ```rust
/// use httpstub::{Match, Request};
/// use httpstub::matchers::RuleMatcher;
///
/// let matcher = RuleMatcher::try_new("sign_up", "POST").unwrap();
///
/// assert!(matcher.matches(&Request::from_parts("POST", "https://example.com/sign_up")));
/// assert!(!matcher.matches(&Request::from_parts("GET", "https://example.com/sign_up")));
/// assert!(!matcher.matches(&Request::from_parts("POST", "https://example.com/log_in")));
///
/// // Invalid patterns are reported, they never turn into a matcher.
/// assert!(RuleMatcher::try_new("sign_up(", "POST").is_err());
/// ```
pub struct RuleMatcher {
    method: MethodExactMatcher,
    url: UrlRegexMatcher,
}

impl RuleMatcher {
    pub fn try_new<P, M>(url_pattern: P, method: M) -> Result<Self, StubError>
    where
        P: AsRef<str>,
        M: AsRef<str>,
    {
        Ok(Self {
            method: MethodExactMatcher::try_new(method)?,
            url: UrlRegexMatcher::try_new(url_pattern)?,
        })
    }

    pub fn url_pattern(&self) -> &str {
        self.url.pattern()
    }

    pub fn method(&self) -> &Method {
        self.method.method()
    }
}

impl Match for RuleMatcher {
    fn matches(&self, request: &Request) -> bool {
        // The method check is a cheap comparison, run it before the regex.
        self.method.matches(request) && self.url.matches(request)
    }
}

#[derive(Debug)]
/// Match all requests, regardless of their method or URL.
pub struct AnyMatcher;

/// Shorthand for [`AnyMatcher`].
pub fn any() -> AnyMatcher {
    AnyMatcher
}

impl Match for AnyMatcher {
    fn matches(&self, _request: &Request) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_comparison_is_case_sensitive() {
        let matcher = method("post");

        assert!(!matcher.matches(&Request::from_parts("POST", "https://example.com/")));
        assert!(matcher.matches(&Request::from_parts("post", "https://example.com/")));
    }

    #[test]
    fn empty_methods_are_rejected() {
        let error = MethodExactMatcher::try_new("").unwrap_err();

        assert!(matches!(error, StubError::InvalidMethod { method } if method.is_empty()));
    }

    #[test]
    fn methods_with_spaces_are_rejected() {
        assert!(MethodExactMatcher::try_new("GET ME").is_err());
    }

    #[test]
    fn url_patterns_match_anywhere_in_the_url() {
        let matcher = url_regex("example.com/sign");

        assert!(matcher.matches(&Request::from_parts("POST", "https://example.com/sign_up")));
        assert!(matcher.matches(&Request::from_parts(
            "POST",
            "https://api.example.com/sign_in?next=/home"
        )));
        assert!(!matcher.matches(&Request::from_parts("POST", "https://example.org/sign_up")));
    }

    #[test]
    fn url_patterns_see_the_query_string() {
        let matcher = url_regex(r"page=\d+");

        assert!(matcher.matches(&Request::from_parts(
            "GET",
            "https://example.com/medications?page=2"
        )));
        assert!(!matcher.matches(&Request::from_parts("GET", "https://example.com/medications")));
    }

    #[test]
    fn invalid_patterns_are_reported_with_the_pattern() {
        let error = UrlRegexMatcher::try_new("sign_up(").unwrap_err();

        match error {
            StubError::Pattern { pattern, .. } => assert_eq!(pattern, "sign_up("),
            other => panic!("Unexpected error: {:?}", other),
        }
    }

    #[test]
    fn rule_matcher_requires_both_halves() {
        let matcher = RuleMatcher::try_new("medications", "GET").unwrap();

        assert_eq!(matcher.url_pattern(), "medications");
        assert_eq!(matcher.method(), &Method::GET);
        assert!(matcher.matches(&Request::from_parts("GET", "https://example.com/medications")));
        assert!(!matcher.matches(&Request::from_parts("POST", "https://example.com/medications")));
        assert!(!matcher.matches(&Request::from_parts("GET", "https://example.com/sign_up")));
    }

    #[test]
    fn closures_are_matchers() {
        let matcher = |request: &Request| request.url.host_str() == Some("example.com");

        assert!(matcher.matches(&Request::from_parts("GET", "https://example.com/")));
        assert!(!matcher.matches(&Request::from_parts("GET", "https://example.org/")));
    }

    #[test]
    fn url_patterns_see_the_normalized_url() {
        let matcher = url_regex(r"^https://example\.com/a%20b$");
        let request = Request::from_parts("GET", "https://EXAMPLE.com:443/a b");

        assert_eq!(request.url.as_str(), "https://example.com/a%20b");
        assert!(matcher.matches(&request));
        assert!(!url_regex(":443").matches(&request));
    }
}
