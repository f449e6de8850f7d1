use crate::request::{BodyPrintLimit, BODY_PRINT_LIMIT};
use crate::stubber::Stubber;
use crate::{Interceptor, StubRegistry};
use std::env;
use std::sync::Arc;

/// Status codes that rule sets turn into simulated network failures unless configured
/// otherwise.
pub const DEFAULT_TRANSPORT_FAILURE_STATUSES: [u16; 2] = [422, 500];

/// A builder providing a fluent API to assemble a [`Stubber`] step-by-step.
/// Use [`Stubber::builder`] to get started.
#[derive(Debug)]
pub struct StubberBuilder {
    transport_failure_statuses: Vec<u16>,
    body_print_limit: BodyPrintLimit,
    intercept_on_start: bool,
}

impl StubberBuilder {
    pub(super) fn new() -> Self {
        let body_print_limit = match env::var("HTTPSTUB_BODY_PRINT_LIMIT")
            .ok()
            .and_then(|x| x.parse::<usize>().ok())
        {
            Some(limit) => BodyPrintLimit::Limited(limit),
            None => BodyPrintLimit::Limited(BODY_PRINT_LIMIT),
        };
        Self {
            transport_failure_statuses: DEFAULT_TRANSPORT_FAILURE_STATUSES.to_vec(),
            body_print_limit,
            intercept_on_start: true,
        }
    }

    /// Rules whose status code is listed here install as stubs that fail at the network layer
    /// instead of answering with a response. Defaults to `422` and `500`.
    ///
    /// Pass an empty list to always answer with a response.
    ///
    /// ### Example:
    /// ```rust
    /// use httpstub::{Request, Stubber};
    /// use httpstub::rule_set::{InMemoryRuleSource, RuleDescriptor};
    ///
    /// let source = InMemoryRuleSource::new()
    ///     .with_rules("failures", vec![RuleDescriptor::new("sign_up", "POST_SignUp_422", 422, "POST")])
    ///     .with_resource("failures", "POST_SignUp_422", r#"{"errors":["taken"]}"#);
    /// let stubber = Stubber::builder().transport_failure_statuses(Vec::new()).build();
    ///
    /// stubber.install(&source, "failures").unwrap();
    ///
    /// let response = stubber
    ///     .dispatch(&Request::from_parts("POST", "https://example.com/sign_up"))
    ///     .response()
    ///     .unwrap();
    /// assert_eq!(response.status(), 422);
    /// ```
    pub fn transport_failure_statuses<I>(mut self, statuses: I) -> Self
    where
        I: IntoIterator<Item = u16>,
    {
        self.transport_failure_statuses = statuses.into_iter().collect();
        self
    }

    /// Requests that pass through are logged at `debug` level. By default, the size of the
    /// printed body is limited.
    ///
    /// The default limit can also be changed with the `HTTPSTUB_BODY_PRINT_LIMIT` environment
    /// variable.
    pub fn body_print_limit(mut self, limit: BodyPrintLimit) -> Self {
        self.body_print_limit = limit;
        self
    }

    /// By default the interceptor of a new [`Stubber`] is installed right away.
    ///
    /// Turn this off to decide later, e.g. with [`Stubber::activate`].
    pub fn intercept_on_start(mut self, intercept: bool) -> Self {
        self.intercept_on_start = intercept;
        self
    }

    /// Finalise the builder and get a [`Stubber`].
    pub fn build(self) -> Stubber {
        let registry = Arc::new(StubRegistry::new());
        let interceptor =
            Interceptor::new(registry.clone()).with_body_print_limit(self.body_print_limit);
        if self.intercept_on_start {
            interceptor.install();
        }
        Stubber::new(registry, interceptor, self.transport_failure_statuses)
    }
}
