use std::time::Duration;

use url::Url;

/// Transport-level timeout configuration, applied once when the transport is
/// built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Maximum time to establish a connection.
    pub connect_timeout: Duration,
    /// Maximum time to write the request.
    pub send_timeout: Duration,
    /// Maximum time to read the response.
    pub receive_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            connect_timeout: Duration::from_millis(8_000),
            send_timeout: Duration::from_millis(8_000),
            receive_timeout: Duration::from_millis(10_000),
        }
    }
}

/// Resolves the base URL for the next attempt.
///
/// Invoked fresh before every attempt, so an implementation can rotate hosts
/// at runtime and in-flight retries pick up the new base immediately.
pub trait BaseUrlResolver: 'static + Send + Sync {
    fn base_url(&self) -> Url;
}

/// A [`BaseUrlResolver`] that always returns the same URL.
#[derive(Debug, Clone)]
pub struct StaticBaseUrl(Url);

impl StaticBaseUrl {
    pub fn new(url: Url) -> Self {
        StaticBaseUrl(url)
    }
}

impl BaseUrlResolver for StaticBaseUrl {
    fn base_url(&self) -> Url {
        self.0.clone()
    }
}
