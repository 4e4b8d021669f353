//! Ready-made interceptors for the tenax HTTP client.
//!
//! - [`LoggingInterceptor`] traces outgoing requests and classified failures.
//! - [`AuthInterceptor`] injects a bearer token from a [`TokenProvider`] and
//!   refreshes it when the backend answers 401.
//! - [`FeatureGateInterceptor`] translates the backend's feature-gate error
//!   payload into a typed [`FeatureUnavailable`] error.
//!
//! [`FeatureUnavailable`]: tenax_client::FeatureUnavailable

mod auth;
mod feature_gate;
mod logging;

pub use auth::{AuthInterceptor, TokenProvider};
pub use feature_gate::FeatureGateInterceptor;
pub use logging::LoggingInterceptor;
