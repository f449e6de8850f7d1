use crate::error::{StubError, TransportFailure};
use crate::matchers::RuleMatcher;
use crate::respond::Outcome;
use crate::{Request, ResponseTemplate};
use http::{Method, Response};
use std::fmt::{Debug, Formatter};

/// Anything that implements `Match` can be used to constrain when a [`Stub`] is activated.
///
/// Every stub is keyed on a [`RuleMatcher`] (method and URL pattern). `Match` lets you add
/// further constraints using [`StubBuilder::and`]:
/// ```rust
/// use httpstub::{Match, Request, ResponseTemplate, Stub};
/// use httpstub::matchers::RuleMatcher;
///
/// // Only match requests carrying an `Authorization` header.
/// pub struct Authenticated;
///
/// impl Match for Authenticated {
///     fn matches(&self, request: &Request) -> bool {
///         request.headers.contains_key("authorization")
///     }
/// }
///
/// let stub = Stub::given(RuleMatcher::try_new("medications", "GET").unwrap())
///     .and(Authenticated)
///     .respond_with(ResponseTemplate::new(200));
///
/// let request = Request::from_parts("GET", "https://example.com/medications");
/// assert!(!stub.matches(&request));
/// assert!(stub.matches(&request.insert_header("authorization", "Bearer asdf")));
/// ```
///
/// Anonymous functions that take a reference to a [`Request`] as input and return a boolean
/// as output automatically implement the `Match` trait.
///
/// Matchers run while the [`StubRegistry`](crate::StubRegistry) holding the stub is locked
/// for reading. A matcher must not install stubs into, or clear, that same registry (directly
/// or through the [`Stubber`](crate::Stubber) owning it): the lookup would deadlock.
pub trait Match: Send + Sync {
    /// Given a reference to a `Request`, determine if it should match or not given
    /// a specific criterion.
    fn matches(&self, request: &Request) -> bool;
}

/// Wrapper around a `Match` trait object, providing a `Debug` implementation
/// since closures do not implement it.
struct Matcher(Box<dyn Match>);

impl Match for Matcher {
    fn matches(&self, request: &Request) -> bool {
        self.0.matches(request)
    }
}

impl Debug for Matcher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("Matcher")
    }
}

/// A single stub rule: which requests to intercept and what to answer them with.
///
/// A `Stub` is immutable once built. Stubs only take effect once installed on a
/// [`Stubber`] (or directly on a [`StubRegistry`]).
///
/// ### Example:
/// ```rust
/// use httpstub::{Outcome, Request, ResponseTemplate, Stub};
///
/// let stub = Stub::new(
///     "sign_up",
///     "POST",
///     ResponseTemplate::new(200).set_body_string(r#"{"access_token":"asdf"}"#),
/// )
/// .unwrap();
///
/// assert!(stub.matches(&Request::from_parts("POST", "https://example.com/sign_up")));
///
/// // An invalid pattern is an error, never a stub that silently matches nothing.
/// assert!(Stub::new("sign_up(", "POST", Outcome::TransportFailure).is_err());
/// ```
///
/// [`Stubber`]: crate::Stubber
/// [`StubRegistry`]: crate::StubRegistry
#[derive(Debug)]
pub struct Stub {
    rule: RuleMatcher,
    matchers: Vec<Matcher>,
    outcome: Outcome,
    name: Option<String>,
}

/// A fluent builder to construct a [`Stub`] instance given a [`RuleMatcher`].
pub struct StubBuilder {
    rule: RuleMatcher,
    matchers: Vec<Matcher>,
}

impl Stub {
    /// Build a stub keyed on `url_pattern` and `method`.
    ///
    /// Fails if the pattern is not a valid regular expression or the method is not a valid
    /// HTTP method.
    pub fn new<P, M, O>(url_pattern: P, method: M, outcome: O) -> Result<Stub, StubError>
    where
        P: AsRef<str>,
        M: AsRef<str>,
        O: Into<Outcome>,
    {
        let rule = RuleMatcher::try_new(url_pattern, method)?;
        Ok(Stub::given(rule).with_outcome(outcome))
    }

    /// Start building a [`Stub`] keyed on `rule`.
    pub fn given(rule: RuleMatcher) -> StubBuilder {
        StubBuilder {
            rule,
            matchers: vec![],
        }
    }

    /// Assign a name to your stub.
    ///
    /// The name shows up in the logs when the stub intercepts a request, which helps when
    /// many stubs share similar patterns.
    pub fn named<T: Into<String>>(mut self, stub_name: T) -> Self {
        self.name = Some(stub_name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn url_pattern(&self) -> &str {
        self.rule.url_pattern()
    }

    pub fn method(&self) -> &Method {
        self.rule.method()
    }

    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// `true` if the request satisfies the method, the URL pattern and every extra matcher.
    pub fn matches(&self, request: &Request) -> bool {
        self.rule.matches(request) && self.matchers.iter().all(|m| m.matches(request))
    }

    /// Synthesize the response (or the transport failure) for a request this stub matched.
    pub fn respond(&self) -> Result<Response<Vec<u8>>, TransportFailure> {
        self.outcome.synthesize()
    }
}

impl StubBuilder {
    /// Add another request matcher to the stub you are building.
    ///
    /// **All** specified matchers must match for the overall `Stub` to match an incoming request.
    pub fn and<M: Match + 'static>(mut self, matcher: M) -> Self {
        self.matchers.push(Matcher(Box::new(matcher)));
        self
    }

    /// Specify the response that matching requests receive.
    pub fn respond_with(self, template: ResponseTemplate) -> Stub {
        self.with_outcome(template)
    }

    /// Make matching requests fail at the network layer, without any response.
    pub fn fail_with_transport_error(self) -> Stub {
        self.with_outcome(Outcome::TransportFailure)
    }

    pub fn with_outcome<O: Into<Outcome>>(self, outcome: O) -> Stub {
        Stub {
            rule: self.rule,
            matchers: self.matchers,
            outcome: outcome.into(),
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extra_matchers_must_all_match() {
        let stub = Stub::given(RuleMatcher::try_new("sign_up", "POST").unwrap())
            .and(|r: &Request| r.url.scheme() == "https")
            .and(|r: &Request| r.headers.contains_key("x-client"))
            .fail_with_transport_error();
        let request = Request::from_parts("POST", "https://example.com/sign_up");

        assert!(!stub.matches(&request));
        assert!(stub.matches(&request.clone().insert_header("x-client", "ios")));
        assert!(!stub.matches(
            &Request::from_parts("POST", "http://example.com/sign_up")
                .insert_header("x-client", "ios")
        ));
    }

    #[test]
    fn invalid_methods_are_reported() {
        let error = Stub::new("sign_up", "", Outcome::TransportFailure).unwrap_err();

        assert!(matches!(error, StubError::InvalidMethod { .. }));
    }

    #[test]
    fn transport_failures_never_produce_a_response() {
        let stub = Stub::new("sign_up", "POST", Outcome::TransportFailure).unwrap();

        assert_eq!(stub.respond().unwrap_err(), TransportFailure);
    }

    #[test]
    fn accessors_expose_the_rule() {
        let stub = Stub::new("medications", "GET", ResponseTemplate::new(200))
            .unwrap()
            .named("GET_Medications_200");

        assert_eq!(stub.url_pattern(), "medications");
        assert_eq!(stub.method(), &Method::GET);
        assert_eq!(stub.name(), Some("GET_Medications_200"));
        assert!(!stub.outcome().is_transport_failure());
    }
}
