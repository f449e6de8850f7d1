//! The `Stubber` ties the pieces together: one [`StubRegistry`], the [`Interceptor`] reading
//! from it and the configuration used to turn rule sets into stubs.
//!
//! `builder::StubberBuilder` assembles a `Stubber`, `exposed_stubber::Stubber` is the handle
//! test harnesses keep for the whole run, and `report::InstallReport` tells them which rules of
//! a rule set made it into the registry.
//!
//! [`StubRegistry`]: crate::StubRegistry
//! [`Interceptor`]: crate::Interceptor
mod builder;
mod exposed_stubber;
mod report;

pub use builder::{StubberBuilder, DEFAULT_TRANSPORT_FAILURE_STATUSES};
pub use exposed_stubber::Stubber;
pub use report::InstallReport;
