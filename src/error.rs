//! Error types returned while building stubs and loading rule sets.
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Why a single [`Stub`](crate::Stub) could not be built.
#[derive(Debug, thiserror::Error)]
pub enum StubError {
    /// The URL pattern is not a valid regular expression.
    #[error("`{pattern}` is not a valid URL pattern")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    /// The method is empty or contains characters that are not allowed in an HTTP method.
    #[error("`{method}` is not a valid HTTP method")]
    InvalidMethod { method: String },
    /// The status code is not an integer in the `100..=999` range.
    #[error("`{value}` is not a valid HTTP status code")]
    InvalidStatusCode { value: String },
    #[error("`{name}: {value}` is not a valid HTTP header")]
    InvalidHeader { name: String, value: String },
    /// The response body references a resource that the rule source does not have.
    #[error("response body resource `{resource}` was not found")]
    ResourceNotFound { resource: String },
}

/// A rule of a rule set that failed to install.
///
/// `index` is the position of the rule in its rule set, `pattern` its URL pattern: together
/// they are enough to find the offending entry in the configuration file.
#[derive(Debug, thiserror::Error)]
#[error("rule #{index} (`{pattern}`) was not installed")]
pub struct RuleError {
    pub index: usize,
    pub pattern: String,
    #[source]
    pub source: StubError,
}

/// Failures that prevent a whole rule set from being read.
#[derive(Debug, thiserror::Error)]
pub enum RuleSetError {
    #[error("rule set `{name}` does not exist")]
    NotFound { name: String },
    #[error("failed to read `{}`", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("rule set `{name}` is not a valid list of rules")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    /// `install_one` was asked for a resource that no rule of the set responds with.
    #[error("rule set `{name}` has no rule responding with `{resource}`")]
    RuleNotFound { name: String, resource: String },
}

/// The simulated network-layer failure produced by a stub configured with
/// [`Outcome::TransportFailure`](crate::Outcome::TransportFailure).
///
/// It is not an HTTP response: HTTP stacks should surface it as their own "connection failed"
/// error. The conversion into [`io::Error`] is provided for stacks built on `std::io`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportFailure;

impl fmt::Display for TransportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("could not load from network")
    }
}

impl std::error::Error for TransportFailure {}

impl From<TransportFailure> for io::Error {
    fn from(failure: TransportFailure) -> Self {
        io::Error::new(io::ErrorKind::NotConnected, failure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_error_message_locates_the_rule() {
        let error = RuleError {
            index: 3,
            pattern: "sign_up".into(),
            source: StubError::ResourceNotFound {
                resource: "POST_SignUp_200".into(),
            },
        };

        assert_eq!(error.to_string(), "rule #3 (`sign_up`) was not installed");
        let source = std::error::Error::source(&error).unwrap();
        assert_eq!(
            source.to_string(),
            "response body resource `POST_SignUp_200` was not found"
        );
    }

    #[test]
    fn transport_failure_converts_into_a_network_io_error() {
        let error: io::Error = TransportFailure.into();

        assert_eq!(error.kind(), io::ErrorKind::NotConnected);
        assert_eq!(error.to_string(), "could not load from network");
    }
}
