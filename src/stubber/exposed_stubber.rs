use crate::activation::Activation;
use crate::error::RuleSetError;
use crate::rule_set::{build_stubs, RuleDescriptor, RuleSource};
use crate::stubber::{InstallReport, StubberBuilder};
use crate::{Dispatch, Interceptor, Request, Stub, StubRegistry};
use log::{info, warn};
use std::sync::Arc;

/// The handle a test harness keeps to stub the HTTP traffic of the code under test.
///
/// A `Stubber` owns a [`StubRegistry`] and the [`Interceptor`] reading from it. It is `Send`
/// and `Sync`: create one when the test suite starts, share it (e.g. behind an `Arc` or in a
/// `static` your harness owns) with the HTTP client under test, and [`clear`] it when each test
/// case ends.
///
/// ### Example:
/// ```rust
/// use httpstub::{Request, ResponseTemplate, Stub, Stubber};
///
/// let stubber = Stubber::start();
/// stubber.install_stub(
///     Stub::new("sign_up", "POST", ResponseTemplate::new(200).set_body_string(r#"{"access_token":"asdf"}"#))
///         .unwrap(),
/// );
///
/// let response = stubber
///     .dispatch(&Request::from_parts("POST", "https://example.com/sign_up"))
///     .response()
///     .unwrap();
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), br#"{"access_token":"asdf"}"#);
///
/// // Test teardown.
/// stubber.clear();
/// assert_eq!(stubber.count(), 0);
/// ```
///
/// [`clear`]: Stubber::clear
#[derive(Debug)]
pub struct Stubber {
    registry: Arc<StubRegistry>,
    interceptor: Interceptor,
    transport_failure_statuses: Vec<u16>,
}

impl Stubber {
    pub(super) fn new(
        registry: Arc<StubRegistry>,
        interceptor: Interceptor,
        transport_failure_statuses: Vec<u16>,
    ) -> Self {
        Self {
            registry,
            interceptor,
            transport_failure_statuses,
        }
    }

    /// You can use `Stubber::builder` if you need to specify custom configuration - e.g.
    /// which status codes simulate network failures.
    ///
    /// If this is not your case, use [`Stubber::start`].
    pub fn builder() -> StubberBuilder {
        StubberBuilder::new()
    }

    /// A `Stubber` with the default configuration and its interceptor already installed.
    pub fn start() -> Self {
        Self::builder().build()
    }

    /// Install every rule of `rule_set`, in order, after the stubs already installed.
    ///
    /// Rules that cannot be turned into stubs (invalid pattern, missing body resource, ...) are
    /// skipped and listed in the returned [`InstallReport`]; the other rules are installed in one
    /// go. An error is returned only when the rule set itself cannot be read.
    pub fn install(
        &self,
        source: &dyn RuleSource,
        rule_set: &str,
    ) -> Result<InstallReport, RuleSetError> {
        let descriptors = source.rules(rule_set)?;
        Ok(self.install_descriptors(&descriptors, 0, source, rule_set))
    }

    /// Install only the first rule of `rule_set` whose response body is `resource`.
    pub fn install_one(
        &self,
        source: &dyn RuleSource,
        rule_set: &str,
        resource: &str,
    ) -> Result<InstallReport, RuleSetError> {
        let descriptors = source.rules(rule_set)?;
        let index = descriptors
            .iter()
            .position(|d| d.json_file == resource)
            .ok_or_else(|| RuleSetError::RuleNotFound {
                name: rule_set.to_owned(),
                resource: resource.to_owned(),
            })?;
        Ok(self.install_descriptors(&descriptors[index..=index], index, source, rule_set))
    }

    fn install_descriptors(
        &self,
        descriptors: &[RuleDescriptor],
        offset: usize,
        source: &dyn RuleSource,
        rule_set: &str,
    ) -> InstallReport {
        let (stubs, failures) = build_stubs(
            descriptors,
            offset,
            source,
            rule_set,
            &self.transport_failure_statuses,
        );
        for failure in &failures {
            warn!("Rule set `{}`: {}: {}", rule_set, failure, failure.source);
        }
        let installed = stubs.len();
        self.registry.install(stubs);
        info!(
            "Installed {} stub(s) from rule set `{}`, {} rule(s) failed.",
            installed,
            rule_set,
            failures.len()
        );
        InstallReport {
            installed,
            failures,
        }
    }

    /// Install already built stubs, in order, after the stubs already installed.
    pub fn install_stubs<I>(&self, stubs: I)
    where
        I: IntoIterator<Item = Stub>,
    {
        self.registry.install(stubs)
    }

    pub fn install_stub(&self, stub: Stub) {
        self.registry.install_single(stub)
    }

    /// Act on a startup [`Activation`] decision.
    ///
    /// When stubbing is requested and a rule set is named, the interceptor is installed and the
    /// rule set installed; the report is returned. Otherwise nothing happens and `Ok(None)` is
    /// returned.
    pub fn activate(
        &self,
        activation: &Activation,
        source: &dyn RuleSource,
    ) -> Result<Option<InstallReport>, RuleSetError> {
        let Some(rule_set) = activation.rule_set_to_install() else {
            return Ok(None);
        };
        info!("Activating stubs from rule set `{}`.", rule_set);
        let report = self.install(source, rule_set)?;
        self.interceptor.install();
        Ok(Some(report))
    }

    /// Drop every installed stub. Typically called when a test case ends.
    ///
    /// The interceptor stays installed: with an empty registry every request passes through.
    pub fn clear(&self) {
        self.registry.clear();
    }

    /// Number of stubs currently installed.
    pub fn count(&self) -> usize {
        self.registry.count()
    }

    /// `true` once the interceptor is hooked into the request path.
    pub fn is_active(&self) -> bool {
        self.interceptor.is_installed()
    }

    /// Install the interceptor if it is not installed yet.
    pub fn intercept(&self) {
        self.interceptor.install();
    }

    /// Decide what happens to an outgoing request, see [`Interceptor::dispatch`].
    pub fn dispatch(&self, request: &Request) -> Dispatch {
        self.interceptor.dispatch(request)
    }

    pub fn registry(&self) -> &Arc<StubRegistry> {
        &self.registry
    }

    /// Load a response body straight from a rule source, e.g. to compare it with what the code
    /// under test received.
    pub fn retrieve_data(source: &dyn RuleSource, rule_set: &str, resource: &str) -> Option<Vec<u8>> {
        source.resource(rule_set, resource)
    }
}
