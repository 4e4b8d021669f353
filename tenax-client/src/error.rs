use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Faults that cannot be expressed as a classified [`Envelope`] failure.
///
/// Classified transport faults always come back as
/// [`Envelope::Failure`](crate::Envelope); this type covers the fatal side
/// channel: interceptor failures, unbuildable request URLs, and the typed
/// feature-gate translation.
#[derive(Error, Debug)]
pub enum Error {
    /// An interceptor failed, or the request could not be prepared.
    #[error("Interceptor error: {0}")]
    Interceptor(#[from] anyhow::Error),
    /// The base URL and endpoint path did not combine into a valid URL.
    #[error("Invalid request URL: {0}")]
    Url(#[from] url::ParseError),
    /// The backend rejected the call through a feature gate. Produced by the
    /// feature-unavailable interceptor in place of the generic classified
    /// failure, so higher layers can catch it selectively.
    #[error(transparent)]
    FeatureUnavailable(#[from] FeatureUnavailable),
}

impl Error {
    pub fn interceptor<E>(err: E) -> Self
    where
        E: 'static + Send + Sync + std::error::Error,
    {
        Error::Interceptor(err.into())
    }
}

/// Typed translation of the backend's
/// `{"error_code": "feature_unavailable", ...}` payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Feature '{feature}' is unavailable: {message}")]
pub struct FeatureUnavailable {
    pub feature: String,
    pub message: String,
}
