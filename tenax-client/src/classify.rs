use http::StatusCode;
use tenax_retry::ErrorKind;

use crate::transport::TransportFault;

/// Maps a transport-level fault to its [`ErrorKind`].
///
/// Timeouts and connection failures are `BadConnection`; an explicit
/// cancellation signal is `Cancelled`; an unknown fault wrapping a
/// socket-level error is still `BadConnection`, anything else is `Other`.
pub fn classify_fault(fault: &TransportFault) -> ErrorKind {
    match fault {
        TransportFault::ConnectTimeout
        | TransportFault::SendTimeout
        | TransportFault::ReceiveTimeout
        | TransportFault::Connection(_) => ErrorKind::BadConnection,
        TransportFault::Cancelled => ErrorKind::Cancelled,
        TransportFault::Unknown(source) => {
            if source
                .chain()
                .any(|cause| cause.downcast_ref::<std::io::Error>().is_some())
            {
                ErrorKind::BadConnection
            } else {
                ErrorKind::Other
            }
        }
    }
}

/// Maps an erroring HTTP status to its [`ErrorKind`].
///
/// This table is the single source of truth for retry eligibility: new
/// status-code handling belongs here, not at call sites.
pub fn classify_status(status: StatusCode) -> ErrorKind {
    match status.as_u16() {
        400 => ErrorKind::BadRequest,
        401 => ErrorKind::Unauthorized,
        403 => ErrorKind::Forbidden,
        404 => ErrorKind::NotFound,
        422 => ErrorKind::Unprocessable,
        code if code >= 500 => ErrorKind::Server,
        _ => ErrorKind::Other,
    }
}

/// Walks an error's source chain looking for a `T`.
pub(crate) fn source_error<T: std::error::Error + 'static>(
    err: &dyn std::error::Error,
) -> Option<&T> {
    let mut source = err.source();

    while let Some(cause) = source {
        if let Some(cause) = cause.downcast_ref::<T>() {
            return Some(cause);
        }

        source = cause.source();
    }
    None
}
