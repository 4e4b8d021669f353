//! Retry policies and the error taxonomy used by the tenax HTTP client.
//!
//! A [`RetryPolicy`] describes how many attempts an operation gets, how long
//! to wait between them, and which [`ErrorKind`]s are worth retrying at all.
//! Policies are plain immutable values; the presets ([`RetryPolicy::critical`],
//! [`RetryPolicy::data_fetch`], [`RetryPolicy::interactive`],
//! [`RetryPolicy::none`]) cover the common operation classes, and
//! [`RetryPolicy::for_method`] picks one from the request verb when the caller
//! does not care.

mod kind;
mod policy;

pub use kind::ErrorKind;
pub use policy::{retries_by_default, RetryPolicy};
