use tenax_client::{AttemptFailure, Interceptor, OutgoingRequest};

/// Logs every outgoing attempt and every classified failure through
/// `tracing`, so the caller's subscriber decides where the records go.
///
/// The switch exists so traffic logging can be turned off in one place
/// without rebuilding the interceptor chain.
pub struct LoggingInterceptor {
    enabled: bool,
}

impl LoggingInterceptor {
    pub fn new() -> Self {
        LoggingInterceptor { enabled: true }
    }

    pub fn disabled() -> Self {
        LoggingInterceptor { enabled: false }
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        LoggingInterceptor::new()
    }
}

#[async_trait::async_trait]
impl Interceptor for LoggingInterceptor {
    async fn before_request(&self, request: &mut OutgoingRequest) -> tenax_client::Result<()> {
        if self.enabled {
            tracing::info!(
                method = %request.method,
                url = %request.url,
                "dispatching request"
            );
        }
        Ok(())
    }

    async fn on_error(&self, failure: &AttemptFailure<'_>) -> Option<tenax_client::Error> {
        if self.enabled {
            tracing::warn!(
                kind = %failure.kind,
                status = failure.status.map(|s| s.as_u16()),
                "request failed"
            );
        }
        None
    }
}
