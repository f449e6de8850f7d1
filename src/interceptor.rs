use crate::error::TransportFailure;
use crate::request::BodyPrintLimit;
use crate::{Request, StubRegistry};
use http::Response;
use log::{debug, log_enabled, Level};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The verdict of the [`Interceptor`] on an outgoing request.
#[derive(Debug)]
pub enum Dispatch {
    /// A stub matched: hand this back to the caller instead of touching the network.
    ///
    /// `Err(TransportFailure)` must be surfaced as a connection error, not as a response.
    Intercepted(Result<Response<Vec<u8>>, TransportFailure>),
    /// No stub matched: perform the real network call with the unmodified request.
    PassThrough,
}

impl Dispatch {
    pub fn is_intercepted(&self) -> bool {
        matches!(self, Dispatch::Intercepted(_))
    }

    /// The synthesized response, if the request was intercepted with one.
    pub fn response(self) -> Option<Response<Vec<u8>>> {
        match self {
            Dispatch::Intercepted(Ok(response)) => Some(response),
            _ => None,
        }
    }
}

/// The per-request hook sitting between application code and the network.
///
/// An `Interceptor` starts **uninstalled**: every request passes through and the registry is
/// never consulted. Once [`install`](Interceptor::install)ed it stays installed for the rest
/// of its life and consults the registry on every request. Clearing the registry makes it
/// pass everything through again without uninstalling it.
///
/// ### Example:
/// ```rust
/// use std::sync::Arc;
/// use httpstub::{Dispatch, Interceptor, Request, ResponseTemplate, Stub, StubRegistry};
///
/// let registry = Arc::new(StubRegistry::new());
/// registry.install_single(Stub::new("sign_up", "POST", ResponseTemplate::new(200)).unwrap());
/// let interceptor = Interceptor::new(registry);
/// let request = Request::from_parts("POST", "https://example.com/sign_up");
///
/// assert!(matches!(interceptor.dispatch(&request), Dispatch::PassThrough));
///
/// interceptor.install();
/// assert!(interceptor.dispatch(&request).is_intercepted());
/// ```
#[derive(Debug)]
pub struct Interceptor {
    registry: Arc<StubRegistry>,
    installed: AtomicBool,
    body_print_limit: BodyPrintLimit,
}

impl Interceptor {
    pub fn new(registry: Arc<StubRegistry>) -> Self {
        Self {
            registry,
            installed: AtomicBool::new(false),
            body_print_limit: BodyPrintLimit::default(),
        }
    }

    pub(crate) fn with_body_print_limit(mut self, limit: BodyPrintLimit) -> Self {
        self.body_print_limit = limit;
        self
    }

    /// Hook the interceptor into the request path. Installing twice is a no-op.
    pub fn install(&self) {
        if !self.installed.swap(true, Ordering::AcqRel) {
            debug!("Interceptor installed.");
        }
    }

    pub fn is_installed(&self) -> bool {
        self.installed.load(Ordering::Acquire)
    }

    pub fn registry(&self) -> &Arc<StubRegistry> {
        &self.registry
    }

    /// Decide what happens to `request`.
    ///
    /// Never performs I/O and never blocks on anything but the registry lock.
    pub fn dispatch(&self, request: &Request) -> Dispatch {
        if !self.is_installed() {
            return Dispatch::PassThrough;
        }

        match self.registry.first_match(request) {
            Some(stub) => {
                debug!(
                    "{} {} intercepted by stub `{}`.",
                    request.method,
                    request.url,
                    stub.name().unwrap_or_else(|| stub.url_pattern())
                );
                Dispatch::Intercepted(stub.respond())
            }
            None => {
                if log_enabled!(Level::Debug) {
                    let mut printed = String::new();
                    if request
                        .print_with_limit(&mut printed, self.body_print_limit)
                        .is_ok()
                    {
                        debug!("No stub matched, passing through:\n{}", printed);
                    }
                }
                Dispatch::PassThrough
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ResponseTemplate, Stub};

    fn installed_interceptor() -> Interceptor {
        let interceptor = Interceptor::new(Arc::new(StubRegistry::new()));
        interceptor.install();
        interceptor
    }

    #[test]
    fn uninstalled_interceptor_does_not_consult_the_registry() {
        let registry = Arc::new(StubRegistry::new());
        let interceptor = Interceptor::new(registry.clone());
        registry.install_single(
            Stub::given(crate::matchers::RuleMatcher::try_new(".*", "GET").unwrap())
                .and(|_: &Request| -> bool { panic!("the registry was consulted") })
                .respond_with(ResponseTemplate::new(200)),
        );

        let dispatch = interceptor.dispatch(&Request::from_parts("GET", "https://example.com/"));

        assert!(!interceptor.is_installed());
        assert!(matches!(dispatch, Dispatch::PassThrough));
    }

    #[test]
    fn installing_twice_keeps_the_interceptor_installed() {
        let interceptor = installed_interceptor();

        interceptor.install();

        assert!(interceptor.is_installed());
    }

    #[test]
    fn misses_pass_through() {
        let interceptor = installed_interceptor();
        interceptor
            .registry()
            .install_single(Stub::new("sign_up", "POST", ResponseTemplate::new(200)).unwrap());

        let dispatch =
            interceptor.dispatch(&Request::from_parts("GET", "https://example.com/medications"));

        assert!(!dispatch.is_intercepted());
        assert!(dispatch.response().is_none());
    }

    #[test]
    fn hits_are_synthesized() {
        let interceptor = installed_interceptor();
        interceptor.registry().install_single(
            Stub::new(
                "medications",
                "GET",
                ResponseTemplate::new(200).set_body_string("[]"),
            )
            .unwrap(),
        );

        let response = interceptor
            .dispatch(&Request::from_parts("GET", "https://example.com/medications"))
            .response()
            .unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(response.body(), b"[]");
    }
}
