//! Plugging a [`Stubber`] in front of an HTTP stack.
//!
//! Implement [`Transport`] for whatever actually sends requests in your application, then wrap
//! it in an [`InterceptingClient`]: every request goes through [`Stubber::dispatch`] first and
//! only reaches the wrapped transport when no stub matched it.
use crate::error::TransportFailure;
use crate::{Dispatch, Request, Stubber};
use async_trait::async_trait;
use http::Response;
use std::sync::Arc;

/// Something that can send a [`Request`] and return the response.
#[async_trait]
pub trait Transport: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn send(&self, request: Request) -> Result<Response<Vec<u8>>, Self::Error>;
}

/// The error returned by an [`InterceptingClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError<E>
where
    E: std::error::Error + 'static,
{
    /// A stub simulated a network failure.
    #[error(transparent)]
    Stubbed(#[from] TransportFailure),
    /// The wrapped transport failed on a request that passed through.
    #[error(transparent)]
    Network(E),
}

/// A [`Transport`] that answers from a [`Stubber`] when it can and delegates to `inner`
/// otherwise.
///
/// ### Example:
/// ```rust
/// use std::sync::Arc;
/// use async_trait::async_trait;
/// use http::Response;
/// use httpstub::client::{ClientError, InterceptingClient, Transport};
/// use httpstub::{Request, ResponseTemplate, Stub, Stubber};
///
/// /// Pretends to be the network: always answers `503`.
/// struct Offline;
///
/// #[async_trait]
/// impl Transport for Offline {
///     type Error = std::io::Error;
///
///     async fn send(&self, _request: Request) -> Result<Response<Vec<u8>>, Self::Error> {
///         let mut response = Response::new(Vec::new());
///         *response.status_mut() = http::StatusCode::SERVICE_UNAVAILABLE;
///         Ok(response)
///     }
/// }
///
/// #[async_std::main]
/// async fn main() {
///     let stubber = Arc::new(Stubber::start());
///     stubber.install_stub(Stub::new("sign_up", "POST", ResponseTemplate::new(200)).unwrap());
///     stubber.install_stub(Stub::new("log_in", "POST", httpstub::Outcome::TransportFailure).unwrap());
///     let client = InterceptingClient::new(stubber, Offline);
///
///     let stubbed = client.send(Request::from_parts("POST", "https://example.com/sign_up")).await;
///     assert_eq!(stubbed.unwrap().status(), 200);
///
///     let failed = client.send(Request::from_parts("POST", "https://example.com/log_in")).await;
///     assert!(matches!(failed, Err(ClientError::Stubbed(_))));
///
///     let real = client.send(Request::from_parts("GET", "https://example.com/medications")).await;
///     assert_eq!(real.unwrap().status(), 503);
/// }
/// ```
#[derive(Debug)]
pub struct InterceptingClient<T> {
    stubber: Arc<Stubber>,
    inner: T,
}

impl<T> InterceptingClient<T> {
    pub fn new(stubber: Arc<Stubber>, inner: T) -> Self {
        Self { stubber, inner }
    }

    pub fn stubber(&self) -> &Arc<Stubber> {
        &self.stubber
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Transport> Transport for InterceptingClient<T> {
    type Error = ClientError<T::Error>;

    async fn send(&self, request: Request) -> Result<Response<Vec<u8>>, Self::Error> {
        let dispatch = self.stubber.dispatch(&request);
        match dispatch {
            Dispatch::Intercepted(outcome) => Ok(outcome?),
            Dispatch::PassThrough => self.inner.send(request).await.map_err(ClientError::Network),
        }
    }
}
