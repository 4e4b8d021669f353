use serde::Deserialize;
use tenax_client::{AttemptFailure, Error, FeatureUnavailable, Interceptor};

const FEATURE_UNAVAILABLE_CODE: &str = "feature_unavailable";

#[derive(Deserialize)]
struct FeatureGatePayload {
    error_code: String,
    #[serde(default)]
    feature: String,
    #[serde(default)]
    message: String,
}

/// Recognizes the backend's feature-gate error payload
/// (`{"error_code": "feature_unavailable", "feature": ..., "message": ...}`)
/// inside a failed response and replaces the generic classified failure with
/// a typed [`FeatureUnavailable`] error before it reaches the caller.
#[derive(Debug, Default, Clone, Copy)]
pub struct FeatureGateInterceptor;

impl FeatureGateInterceptor {
    pub fn new() -> Self {
        FeatureGateInterceptor
    }
}

#[async_trait::async_trait]
impl Interceptor for FeatureGateInterceptor {
    async fn on_error(&self, failure: &AttemptFailure<'_>) -> Option<Error> {
        let raw = failure.raw?;
        let payload: FeatureGatePayload = serde_json::from_value(raw.clone()).ok()?;
        if payload.error_code != FEATURE_UNAVAILABLE_CODE {
            return None;
        }
        Some(Error::FeatureUnavailable(FeatureUnavailable {
            feature: payload.feature,
            message: payload.message,
        }))
    }
}
