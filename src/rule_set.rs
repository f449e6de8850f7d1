//! Rule sets: named lists of stub rules kept next to the response bodies they reference.
//!
//! A rule set on disk is a directory holding a `stubRules.json` file and one `<name>.json`
//! file per response body:
//!
//! ```text
//! http_success_stubs/
//! ├── stubRules.json
//! ├── POST_SignUp_200.json
//! └── GET_Medications_200.json
//! ```
//!
//! `stubRules.json` is a JSON array of [`RuleDescriptor`]s:
//!
//! ```json
//! [
//!   {
//!     "matching_url": "sign_up",
//!     "json_file": "POST_SignUp_200",
//!     "status_code": "200",
//!     "http_method": "POST"
//!   }
//! ]
//! ```
use crate::error::{RuleError, RuleSetError, StubError};
use crate::matchers::RuleMatcher;
use crate::{Outcome, ResponseTemplate, Stub};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the file listing the rules of an on-disk rule set.
pub const RULES_FILE_NAME: &str = "stubRules.json";

/// Extension of the response body files of an on-disk rule set.
pub const RESOURCE_EXTENSION: &str = "json";

/// A status code as written in a rule set: either `200` or `"200"`.
///
/// Any other JSON value still deserializes, into `Other`, and is rejected by
/// [`StatusCodeValue::parse`] so that only the offending rule fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusCodeValue {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl StatusCodeValue {
    pub fn parse(&self) -> Result<u16, StubError> {
        let invalid = || StubError::InvalidStatusCode {
            value: self.to_string(),
        };
        let code = match self {
            StatusCodeValue::Number(n) => n
                .as_u64()
                .and_then(|n| u16::try_from(n).ok())
                .ok_or_else(invalid)?,
            StatusCodeValue::Text(s) => s.trim().parse::<u16>().map_err(|_| invalid())?,
            StatusCodeValue::Other(_) => return Err(invalid()),
        };
        if (100..=999).contains(&code) {
            Ok(code)
        } else {
            Err(invalid())
        }
    }
}

impl fmt::Display for StatusCodeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCodeValue::Number(n) => write!(f, "{}", n),
            StatusCodeValue::Text(s) => f.write_str(s),
            StatusCodeValue::Other(v) => write!(f, "{}", v),
        }
    }
}

impl From<u16> for StatusCodeValue {
    fn from(code: u16) -> Self {
        StatusCodeValue::Number(code.into())
    }
}

impl From<&str> for StatusCodeValue {
    fn from(code: &str) -> Self {
        StatusCodeValue::Text(code.to_owned())
    }
}

impl From<String> for StatusCodeValue {
    fn from(code: String) -> Self {
        StatusCodeValue::Text(code)
    }
}

/// One entry of a rule set, as written in its configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDescriptor {
    /// Regular expression matched against the absolute request URL.
    pub matching_url: String,
    /// Name of the resource holding the response body, without extension.
    pub json_file: String,
    pub status_code: StatusCodeValue,
    pub http_method: String,
    /// Response body used instead of the `json_file` resource.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_response: Option<String>,
    /// Extra response headers.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RuleDescriptor {
    pub fn new<U, F, S, M>(matching_url: U, json_file: F, status_code: S, http_method: M) -> Self
    where
        U: Into<String>,
        F: Into<String>,
        S: Into<StatusCodeValue>,
        M: Into<String>,
    {
        Self {
            matching_url: matching_url.into(),
            json_file: json_file.into(),
            status_code: status_code.into(),
            http_method: http_method.into(),
            inline_response: None,
            headers: BTreeMap::new(),
        }
    }

    pub fn inline_response<T: Into<String>>(mut self, body: T) -> Self {
        self.inline_response = Some(body.into());
        self
    }

    pub fn header<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Turn the descriptor into a [`Stub`].
    ///
    /// Status codes listed in `transport_failure_statuses` produce a stub that fails at the
    /// network layer; such stubs have no body, so their resource is never looked up.
    pub fn to_stub(
        &self,
        source: &dyn RuleSource,
        rule_set: &str,
        transport_failure_statuses: &[u16],
    ) -> Result<Stub, StubError> {
        let rule = RuleMatcher::try_new(&self.matching_url, &self.http_method)?;
        let status_code = self.status_code.parse()?;

        let outcome = if transport_failure_statuses.contains(&status_code) {
            Outcome::TransportFailure
        } else {
            let body = match &self.inline_response {
                Some(body) => body.clone().into_bytes(),
                None => source.resource(rule_set, &self.json_file).ok_or_else(|| {
                    StubError::ResourceNotFound {
                        resource: self.json_file.clone(),
                    }
                })?,
            };
            let mut template = ResponseTemplate::try_new(status_code)?.set_body_bytes(body);
            for (name, value) in &self.headers {
                template = template.try_insert_header(name, value)?;
            }
            Outcome::Success(template)
        };

        Ok(Stub::given(rule)
            .with_outcome(outcome)
            .named(self.json_file.clone()))
    }
}

/// Turn a list of descriptors into stubs, keeping going past the rules that fail.
///
/// `offset` is added to the index reported for failing rules, so that they point at the
/// right entry of the full rule set when only a slice of it is built.
pub(crate) fn build_stubs(
    descriptors: &[RuleDescriptor],
    offset: usize,
    source: &dyn RuleSource,
    rule_set: &str,
    transport_failure_statuses: &[u16],
) -> (Vec<Stub>, Vec<RuleError>) {
    let mut stubs = Vec::with_capacity(descriptors.len());
    let mut failures = Vec::new();
    for (index, descriptor) in descriptors.iter().enumerate() {
        match descriptor.to_stub(source, rule_set, transport_failure_statuses) {
            Ok(stub) => stubs.push(stub),
            Err(error) => failures.push(RuleError {
                index: index + offset,
                pattern: descriptor.matching_url.clone(),
                source: error,
            }),
        }
    }
    (stubs, failures)
}

/// Where rule sets and their response bodies come from.
pub trait RuleSource: Send + Sync {
    /// The rules of `rule_set`, in priority order.
    fn rules(&self, rule_set: &str) -> Result<Vec<RuleDescriptor>, RuleSetError>;

    /// The raw bytes of the `name` resource of `rule_set`, if it exists.
    fn resource(&self, rule_set: &str, name: &str) -> Option<Vec<u8>>;
}

/// Rule sets stored as directories under a common root, see the [module docs](self).
#[derive(Debug, Clone)]
pub struct DirectoryRuleSource {
    root: PathBuf,
}

impl DirectoryRuleSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn rule_set_dir(&self, rule_set: &str) -> PathBuf {
        self.root.join(rule_set)
    }
}

impl RuleSource for DirectoryRuleSource {
    fn rules(&self, rule_set: &str) -> Result<Vec<RuleDescriptor>, RuleSetError> {
        let dir = self.rule_set_dir(rule_set);
        if !dir.is_dir() {
            return Err(RuleSetError::NotFound {
                name: rule_set.to_owned(),
            });
        }
        let path = dir.join(RULES_FILE_NAME);
        let content = fs::read(&path).map_err(|source| RuleSetError::Io { path, source })?;
        serde_json::from_slice(&content).map_err(|source| RuleSetError::Parse {
            name: rule_set.to_owned(),
            source,
        })
    }

    fn resource(&self, rule_set: &str, name: &str) -> Option<Vec<u8>> {
        let path = self
            .rule_set_dir(rule_set)
            .join(format!("{}.{}", name, RESOURCE_EXTENSION));
        fs::read(path).ok()
    }
}

#[derive(Debug, Clone, Default)]
struct InMemoryRuleSet {
    rules: Vec<RuleDescriptor>,
    resources: HashMap<String, Vec<u8>>,
}

/// Rule sets assembled in code, handy for unit tests that should not touch the file system.
///
/// ### Example:
/// ```rust
/// use httpstub::rule_set::{InMemoryRuleSource, RuleDescriptor, RuleSource};
///
/// let source = InMemoryRuleSource::new()
///     .with_rules(
///         "http_success_stubs",
///         vec![RuleDescriptor::new("sign_up", "POST_SignUp_200", 200, "POST")],
///     )
///     .with_resource("http_success_stubs", "POST_SignUp_200", r#"{"access_token":"asdf"}"#);
///
/// assert_eq!(source.rules("http_success_stubs").unwrap().len(), 1);
/// assert!(source.resource("http_success_stubs", "POST_SignUp_200").is_some());
/// assert!(source.rules("http_failure_stubs").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryRuleSource {
    rule_sets: HashMap<String, InMemoryRuleSet>,
}

impl InMemoryRuleSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `rules` to the `rule_set` rule set, creating it if needed.
    pub fn with_rules<N, I>(mut self, rule_set: N, rules: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator<Item = RuleDescriptor>,
    {
        self.rule_sets
            .entry(rule_set.into())
            .or_default()
            .rules
            .extend(rules);
        self
    }

    pub fn with_resource<N, R, B>(mut self, rule_set: N, name: R, body: B) -> Self
    where
        N: Into<String>,
        R: Into<String>,
        B: Into<Vec<u8>>,
    {
        self.rule_sets
            .entry(rule_set.into())
            .or_default()
            .resources
            .insert(name.into(), body.into());
        self
    }
}

impl RuleSource for InMemoryRuleSource {
    fn rules(&self, rule_set: &str) -> Result<Vec<RuleDescriptor>, RuleSetError> {
        self.rule_sets
            .get(rule_set)
            .map(|set| set.rules.clone())
            .ok_or_else(|| RuleSetError::NotFound {
                name: rule_set.to_owned(),
            })
    }

    fn resource(&self, rule_set: &str, name: &str) -> Option<Vec<u8>> {
        self.rule_sets
            .get(rule_set)
            .and_then(|set| set.resources.get(name))
            .cloned()
    }
}
