use http::StatusCode;
use serde_json::Value;
use tenax_retry::ErrorKind;

/// The result of one engine invocation, regardless of how many attempts it
/// took.
///
/// Exactly one variant is ever populated. `Success` carries the parsed
/// payload when a parse function was supplied (`data`) and the raw body
/// otherwise; `Failure` carries the classified [`ErrorKind`] plus whatever
/// raw payload the server returned. `status` is absent when the attempt
/// never produced an HTTP response (transport faults).
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    Success {
        status: Option<StatusCode>,
        raw: Option<Value>,
        data: Option<T>,
    },
    Failure {
        status: Option<StatusCode>,
        raw: Option<Value>,
        kind: ErrorKind,
    },
}

impl<T> Envelope<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Envelope::Success { .. })
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Envelope::Success { status, .. } | Envelope::Failure { status, .. } => *status,
        }
    }

    /// The raw response payload, if any.
    pub fn raw(&self) -> Option<&Value> {
        match self {
            Envelope::Success { raw, .. } | Envelope::Failure { raw, .. } => raw.as_ref(),
        }
    }

    /// The parsed payload, if this is a `Success` produced with a parse
    /// function.
    pub fn data(&self) -> Option<&T> {
        match self {
            Envelope::Success { data, .. } => data.as_ref(),
            Envelope::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Envelope::Success { .. } => None,
            Envelope::Failure { kind, .. } => Some(*kind),
        }
    }

    /// Fold-style accessor: exactly one of the two closures runs.
    pub fn handle<R>(
        self,
        on_success: impl FnOnce(Option<T>, Option<Value>) -> R,
        on_failure: impl FnOnce(ErrorKind, Option<Value>) -> R,
    ) -> R {
        match self {
            Envelope::Success { raw, data, .. } => on_success(data, raw),
            Envelope::Failure { raw, kind, .. } => on_failure(kind, raw),
        }
    }
}
