use crate::error::TransportFailure;
use crate::ResponseTemplate;
use http::Response;

/// What a [`Stub`] does with the requests it matches.
///
/// ## Canned responses
///
/// ```rust
/// use httpstub::{Outcome, ResponseTemplate};
///
/// let outcome = Outcome::from(
///     ResponseTemplate::new(200).set_body_string(r#"{"access_token":"asdf"}"#)
/// );
///
/// let response = outcome.synthesize().unwrap();
/// assert_eq!(response.status(), 200);
/// assert_eq!(response.body(), br#"{"access_token":"asdf"}"#);
/// ```
///
/// ## Network failures
///
/// A transport failure is not an HTTP response: the caller never gets a status code or a
/// body, only a [`TransportFailure`] to surface as its own "connection failed" error.
///
/// ```rust
/// use httpstub::Outcome;
///
/// assert!(Outcome::TransportFailure.synthesize().is_err());
/// ```
///
/// [`Stub`]: crate::Stub
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Success(ResponseTemplate),
    TransportFailure,
}

impl Outcome {
    /// Build the concrete result handed back to the HTTP stack.
    pub fn synthesize(&self) -> Result<Response<Vec<u8>>, TransportFailure> {
        match self {
            Outcome::Success(template) => Ok(template.generate_response()),
            Outcome::TransportFailure => Err(TransportFailure),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, Outcome::TransportFailure)
    }
}

impl From<ResponseTemplate> for Outcome {
    fn from(template: ResponseTemplate) -> Self {
        Outcome::Success(template)
    }
}
