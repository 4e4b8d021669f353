use http::StatusCode;
use serde_json::Value;
use tenax_retry::ErrorKind;

use crate::error::Error;
use crate::transport::OutgoingRequest;

/// A failed attempt as seen by [`Interceptor::on_error`]: the classified kind
/// plus whatever the transport returned.
#[derive(Debug, Clone, Copy)]
pub struct AttemptFailure<'a> {
    pub status: Option<StatusCode>,
    pub raw: Option<&'a Value>,
    pub kind: ErrorKind,
}

/// A hook run on every attempt, in registration order.
///
/// The engine stays ignorant of interceptor internals: the whole contract is
/// these two methods. Both have no-op defaults, so implementations override
/// only the side they care about.
///
/// # Example
///
/// ```
/// use tenax_client::{Interceptor, OutgoingRequest};
/// use http::header::{HeaderValue, USER_AGENT};
///
/// struct UserAgentInterceptor;
///
/// #[async_trait::async_trait]
/// impl Interceptor for UserAgentInterceptor {
///     async fn before_request(
///         &self,
///         request: &mut OutgoingRequest,
///     ) -> tenax_client::Result<()> {
///         request
///             .headers
///             .insert(USER_AGENT, HeaderValue::from_static("tenax/0.3"));
///         Ok(())
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Interceptor: 'static + Send + Sync {
    /// Runs before the attempt is dispatched; may mutate the outgoing
    /// request, typically to inject headers. An error here aborts the
    /// attempt without touching the transport.
    async fn before_request(&self, request: &mut OutgoingRequest) -> Result<(), Error> {
        let _ = request;
        Ok(())
    }

    /// Runs after an attempt was classified as a failure, before the failure
    /// envelope is surfaced. Returning an error replaces the classified
    /// failure and ends the invocation immediately; it is never retried.
    async fn on_error(&self, failure: &AttemptFailure<'_>) -> Option<Error> {
        let _ = failure;
        None
    }
}
