use std::fmt;

/// Classification of a failed attempt, independent of the underlying
/// transport.
///
/// This is the only failure vocabulary exposed to callers: every transport
/// fault and every erroring HTTP status collapses into one of these members.
/// There is no ordering between kinds; the only relation that matters is
/// membership in a policy's retryable set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The attempt was cancelled before it completed.
    Cancelled,
    /// The response arrived but its body did not parse into the expected
    /// shape.
    Parsing,
    /// HTTP 400.
    BadRequest,
    /// HTTP 401.
    Unauthorized,
    /// HTTP 403.
    Forbidden,
    /// HTTP 404.
    NotFound,
    /// HTTP 422.
    Unprocessable,
    /// A backend feature gate rejected the call. Never produced by the
    /// classifier itself; set through the feature-unavailable override.
    FeatureUnavailable,
    /// Timeout or connection-level failure.
    BadConnection,
    /// HTTP 5xx.
    Server,
    /// Anything that does not fit the categories above.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Parsing => "parsing",
            ErrorKind::BadRequest => "bad_request",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Unprocessable => "unprocessable",
            ErrorKind::FeatureUnavailable => "feature_unavailable",
            ErrorKind::BadConnection => "bad_connection",
            ErrorKind::Server => "server",
            ErrorKind::Other => "other",
        };
        f.write_str(name)
    }
}
