use std::sync::Arc;

use http::header::{HeaderValue, AUTHORIZATION};
use tenax_client::{AttemptFailure, Error, ErrorKind, Interceptor, OutgoingRequest};

/// Supplies and refreshes the access token injected by [`AuthInterceptor`].
#[async_trait::async_trait]
pub trait TokenProvider: 'static + Send + Sync {
    /// The current token, or `None` when the call should go out anonymous.
    async fn access_token(&self) -> Option<String>;

    /// Called when the backend rejects the current token.
    async fn refresh(&self) -> Result<(), anyhow::Error>;
}

/// Injects `Authorization: Bearer <token>` on every attempt and refreshes
/// the token when an attempt comes back `Unauthorized`.
///
/// The refresh happens before the engine's retry decision, so pairing this
/// with a policy that retries `Unauthorized` once gives
/// refresh-and-retry-once semantics: the follow-up attempt re-runs
/// `before_request` and picks up the fresh token.
pub struct AuthInterceptor {
    provider: Arc<dyn TokenProvider>,
}

impl AuthInterceptor {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        AuthInterceptor { provider }
    }
}

#[async_trait::async_trait]
impl Interceptor for AuthInterceptor {
    async fn before_request(&self, request: &mut OutgoingRequest) -> tenax_client::Result<()> {
        if let Some(token) = self.provider.access_token().await {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(Error::interceptor)?;
            request.headers.insert(AUTHORIZATION, value);
        }
        Ok(())
    }

    async fn on_error(&self, failure: &AttemptFailure<'_>) -> Option<Error> {
        if failure.kind != ErrorKind::Unauthorized {
            return None;
        }
        match self.provider.refresh().await {
            Ok(()) => None,
            Err(error) => Some(Error::Interceptor(error)),
        }
    }
}
