//! `httpstub` makes code that talks to HTTP APIs deterministically testable by intercepting
//! its outgoing requests and answering them with canned responses.
//!
//! # Table of Contents
//! 1. [Getting started](#getting-started)
//! 2. [Rule sets](#rule-sets)
//! 3. [Matching](#matching)
//! 4. [Simulating network failures](#simulating-network-failures)
//! 5. [Test isolation](#test-isolation)
//! 6. [Plugging into an HTTP client](#plugging-into-an-http-client)
//!
//! ## Getting started
//! ```rust
//! use httpstub::{Dispatch, Request, ResponseTemplate, Stub, Stubber};
//!
//! // Create a stubber: its interceptor is installed right away.
//! let stubber = Stubber::start();
//!
//! // When a POST request hits a URL containing `sign_up`, answer with a 200 and a token.
//! stubber.install_stub(
//!     Stub::new(
//!         "sign_up",
//!         "POST",
//!         ResponseTemplate::new(200).set_body_string(r#"{"access_token":"asdf"}"#),
//!     )
//!     .unwrap(),
//! );
//!
//! // The HTTP stack asks the stubber before sending anything.
//! let request = Request::from_parts("POST", "https://example.com/sign_up");
//! let response = stubber.dispatch(&request).response().unwrap();
//! assert_eq!(response.status(), 200);
//! assert_eq!(response.headers()["content-type"], "application/json; charset=utf-8");
//!
//! // Requests no stub matches go to the network, untouched.
//! let request = Request::from_parts("GET", "https://example.com/medications");
//! assert!(matches!(stubber.dispatch(&request), Dispatch::PassThrough));
//! ```
//!
//! ## Rule sets
//!
//! Stubs are usually kept out of the test code, in rule sets: a list of rules plus the response
//! bodies they serve. Check the [`rule_set`] module for the on-disk layout.
//!
//! ```rust,no_run
//! use httpstub::Stubber;
//! use httpstub::rule_set::DirectoryRuleSource;
//!
//! let source = DirectoryRuleSource::new("tests/fixtures");
//! let stubber = Stubber::start();
//!
//! let report = stubber.install(&source, "http_success_stubs").unwrap();
//! assert!(report.is_complete());
//! ```
//!
//! Rules are independent: a rule with an invalid URL pattern or a missing body is reported in
//! the [`InstallReport`] and the rest of the rule set is installed anyway.
//!
//! ## Matching
//!
//! A stub matches a request when the request method is **exactly** the stub method (`"post"`
//! does not match `POST`) and the stub URL pattern, a regular expression, matches somewhere in
//! the absolute request URL.
//!
//! Stubs are tried in the order they were installed: the first one that matches wins.
//! Further constraints can be added with the [`Match`] trait, see [`StubBuilder::and`].
//!
//! ## Simulating network failures
//!
//! A stub with [`Outcome::TransportFailure`] makes matching requests fail as if the network
//! were unreachable: the caller gets a [`TransportFailure`], never a response.
//! Rule sets produce such stubs for the status codes configured with
//! [`StubberBuilder::transport_failure_statuses`] (`422` and `500` by default).
//!
//! ## Test isolation
//!
//! A [`Stubber`] is meant to live for the whole test run: the HTTP client under test keeps a
//! handle to it. Call [`Stubber::clear`] when each test case ends, so that stubs never leak into
//! the next one. All operations are safe to call concurrently.
//!
//! ## Plugging into an HTTP client
//!
//! Implement [`client::Transport`] for whatever sends requests in your application and wrap it
//! in a [`client::InterceptingClient`].
//!
//! Stubbing can also be turned on from launch arguments, see [`Activation`].
mod activation;
pub mod client;
mod error;
pub mod http;
mod interceptor;
pub mod matchers;
mod request;
mod respond;
mod response_template;
pub mod rule_set;
mod stub;
mod stub_registry;
mod stubber;

pub use activation::{Activation, ActivationMarkers};
pub use error::{RuleError, RuleSetError, StubError, TransportFailure};
pub use interceptor::{Dispatch, Interceptor};
pub use request::{BodyPrintLimit, Request};
pub use respond::Outcome;
pub use response_template::{ResponseTemplate, DEFAULT_CONTENT_TYPE};
pub use stub::{Match, Stub, StubBuilder};
pub use stub_registry::StubRegistry;
pub use stubber::{InstallReport, Stubber, StubberBuilder, DEFAULT_TRANSPORT_FAILURE_STATUSES};
