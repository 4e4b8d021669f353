//! A resilient HTTP request layer: every call is classified into a stable
//! error taxonomy and retried according to a per-operation [`RetryPolicy`].
//!
//! The entry point is [`Client`], built with [`ClientBuilder`] from a
//! [`Transport`] (usually [`ReqwestTransport`]) and an optional base URL.
//! Interceptors attach with [`with`] and run on every attempt:
//!
//! ```no_run
//! use tenax_client::{ClientBuilder, ClientConfig, ReqwestTransport};
//! use url::Url;
//!
//! async fn run() -> anyhow::Result<()> {
//!     let transport = ReqwestTransport::new(&ClientConfig::default())?;
//!     let client = ClientBuilder::new(transport)
//!         .base_url(Url::parse("https://api.example.com")?)
//!         .build();
//!
//!     let envelope = client.get("/v2/accounts").send().await?;
//!     println!("success: {}", envelope.is_success());
//!     Ok(())
//! }
//! ```
//!
//! Every invocation produces exactly one [`Envelope`]: either `Success` with
//! the parsed (or raw) payload, or `Failure` carrying an
//! [`ErrorKind`](tenax_retry::ErrorKind). Transport faults never leak through
//! an envelope; the only escape hatch is [`Error`], reserved for faults the
//! taxonomy cannot express.
//!
//! [`with`]: ClientBuilder::with

mod classify;
mod client;
mod config;
mod envelope;
mod error;
mod interceptor;
mod request;
mod transport;

pub use classify::{classify_fault, classify_status};
pub use client::{CallBuilder, Client, ClientBuilder, ParseFn};
pub use config::{BaseUrlResolver, ClientConfig, StaticBaseUrl};
pub use envelope::Envelope;
pub use error::{Error, FeatureUnavailable, Result};
pub use interceptor::{AttemptFailure, Interceptor};
pub use request::{ApiRequest, MultipartForm, MultipartPart};
pub use transport::{
    OutgoingRequest, ReqwestTransport, Transport, TransportFault, TransportResponse,
};

pub use tenax_retry::{retries_by_default, ErrorKind, RetryPolicy};
