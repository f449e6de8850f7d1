//! Turning stubbing on from the command line.
//!
//! UI-level test runners cannot call into the application under test, but they can choose its
//! launch arguments. By convention:
//! - `RUNNING_AUTOMATION_TESTS` asks the application to stub its HTTP traffic;
//! - `STUB_API_CALLS_<rule set>` names the rule set to install, e.g.
//!   `STUB_API_CALLS_stubsTemplate_addresses` installs `stubsTemplate_addresses`.
//!
//! [`Activation::from_args`] reads that convention, [`Stubber::activate`] acts on it.
//!
//! [`Stubber::activate`]: crate::Stubber::activate

/// The launch arguments [`Activation::from_args`] looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationMarkers {
    /// Argument that turns stubbing on.
    pub flag: String,
    /// Prefix of the argument naming the rule set to install.
    pub rule_set_prefix: String,
}

impl Default for ActivationMarkers {
    fn default() -> Self {
        Self {
            flag: "RUNNING_AUTOMATION_TESTS".to_string(),
            rule_set_prefix: "STUB_API_CALLS_".to_string(),
        }
    }
}

/// Whether stubbing should be switched on at startup, and with which rule set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Activation {
    pub should_activate: bool,
    pub rule_set: Option<String>,
}

impl Activation {
    pub fn new(should_activate: bool, rule_set: Option<String>) -> Self {
        Self {
            should_activate,
            rule_set,
        }
    }

    /// Read the default markers from `args`.
    ///
    /// ### Example:
    /// ```rust
    /// use httpstub::Activation;
    ///
    /// let activation = Activation::from_args([
    ///     "my-app",
    ///     "RUNNING_AUTOMATION_TESTS",
    ///     "STUB_API_CALLS_http_success_stubs",
    /// ]);
    ///
    /// assert!(activation.should_activate);
    /// assert_eq!(activation.rule_set.as_deref(), Some("http_success_stubs"));
    /// ```
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_args_with(args, &ActivationMarkers::default())
    }

    /// Read `markers` from `args`.
    ///
    /// Only the first argument carrying the rule set prefix counts; an empty rule set name is
    /// ignored.
    pub fn from_args_with<I, S>(args: I, markers: &ActivationMarkers) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut activation = Activation::default();
        for arg in args {
            let arg = arg.as_ref();
            if arg == markers.flag {
                activation.should_activate = true;
            } else if activation.rule_set.is_none() {
                activation.rule_set = arg
                    .strip_prefix(markers.rule_set_prefix.as_str())
                    .filter(|name| !name.is_empty())
                    .map(str::to_owned);
            }
        }
        activation
    }

    /// Read the default markers from the arguments of the current process.
    pub fn from_env() -> Self {
        Self::from_args(std::env::args())
    }

    /// The rule set to install, if stubbing is on and one was named.
    pub fn rule_set_to_install(&self) -> Option<&str> {
        if self.should_activate {
            self.rule_set.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_flag_means_no_activation() {
        let activation = Activation::from_args(["my-app", "STUB_API_CALLS_http_success_stubs"]);

        assert!(!activation.should_activate);
        assert_eq!(activation.rule_set.as_deref(), Some("http_success_stubs"));
        assert_eq!(activation.rule_set_to_install(), None);
    }

    #[test]
    fn flag_without_rule_set_activates_nothing_to_install() {
        let activation = Activation::from_args(["my-app", "RUNNING_AUTOMATION_TESTS"]);

        assert!(activation.should_activate);
        assert_eq!(activation.rule_set_to_install(), None);
    }

    #[test]
    fn the_first_rule_set_wins() {
        let activation = Activation::from_args([
            "STUB_API_CALLS_first",
            "RUNNING_AUTOMATION_TESTS",
            "STUB_API_CALLS_second",
        ]);

        assert_eq!(activation.rule_set_to_install(), Some("first"));
    }

    #[test]
    fn empty_rule_set_names_are_ignored() {
        let activation = Activation::from_args([
            "RUNNING_AUTOMATION_TESTS",
            "STUB_API_CALLS_",
            "STUB_API_CALLS_addresses",
        ]);

        assert_eq!(activation.rule_set_to_install(), Some("addresses"));
    }

    #[test]
    fn markers_are_configurable() {
        let markers = ActivationMarkers {
            flag: "--ui-tests".into(),
            rule_set_prefix: "--stubs=".into(),
        };

        let activation = Activation::from_args_with(["--ui-tests", "--stubs=checkout"], &markers);

        assert_eq!(activation.rule_set_to_install(), Some("checkout"));
    }

    #[test]
    fn the_flag_must_match_exactly() {
        let activation = Activation::from_args(["RUNNING_AUTOMATION_TESTS_LATER"]);

        assert!(!activation.should_activate);
    }
}
