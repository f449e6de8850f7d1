use crate::error::RuleError;

/// What happened when a rule set was installed.
///
/// Rules are independent: a broken rule is reported here and every other rule of the set
/// still gets installed.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Number of rules that made it into the registry.
    pub installed: usize,
    /// Rules that did not, in rule set order.
    pub failures: Vec<RuleError>,
}

impl InstallReport {
    /// `true` if every rule was installed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Turn a partial install into an error carrying the first failure.
    ///
    /// Handy in tests that expect their fixtures to be valid:
    /// `stubber.install(&source, "http_success_stubs")?.into_result()?`.
    pub fn into_result(self) -> Result<usize, RuleError> {
        match self.failures.into_iter().next() {
            Some(failure) => Err(failure),
            None => Ok(self.installed),
        }
    }
}
