use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::classify::source_error;
use crate::config::ClientConfig;
use crate::request::MultipartForm;

/// One fully resolved outbound attempt.
///
/// The engine builds a fresh one before every attempt (base URL resolution
/// happens per attempt), and interceptors may mutate it before dispatch.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
    pub multipart: Option<MultipartForm>,
}

/// Transport-level failure categories.
///
/// These are the classifier's inputs, never exposed to callers directly: each
/// one collapses into an [`ErrorKind`](tenax_retry::ErrorKind) before it
/// reaches an envelope.
#[derive(Error, Debug)]
pub enum TransportFault {
    #[error("connect timeout")]
    ConnectTimeout,
    #[error("send timeout")]
    SendTimeout,
    #[error("receive timeout")]
    ReceiveTimeout,
    #[error("connection error: {0}")]
    Connection(#[source] anyhow::Error),
    #[error("request cancelled")]
    Cancelled,
    #[error("transport error: {0}")]
    Unknown(#[source] anyhow::Error),
}

/// A completed transport call. The status may still be an error status; that
/// decision belongs to the classifier.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

/// The transport collaborator: dispatches one attempt and surfaces timeouts,
/// connection errors and cancellation as distinguishable fault categories.
///
/// Implementations must be safe for concurrent use; the engine shares one
/// transport across all in-flight invocations.
#[async_trait::async_trait]
pub trait Transport: 'static + Send + Sync {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportFault>;
}

#[async_trait::async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportFault> {
        (**self).send(request).await
    }
}

/// [`Transport`] implementation backed by [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a transport with the configured timeouts. reqwest has no
    /// separate write timeout, so the send and receive budgets are combined
    /// into the total request timeout.
    pub fn new(config: &ClientConfig) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.receive_timeout)
            .timeout(config.send_timeout + config.receive_timeout)
            .build()?;
        Ok(ReqwestTransport { client })
    }

    /// Wraps an existing client, keeping whatever timeouts it was built with.
    pub fn from_client(client: reqwest::Client) -> Self {
        ReqwestTransport { client }
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportFault> {
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        // Multipart wins when both payloads are present.
        builder = if let Some(form) = request.multipart {
            builder.multipart(to_reqwest_form(form)?)
        } else if let Some(body) = request.body {
            builder.json(&body)
        } else {
            builder
        };

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        Ok(TransportResponse { status, body })
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportFault> {
    let mut out = reqwest::multipart::Form::new();
    for part in form.into_parts() {
        let mut piece = reqwest::multipart::Part::bytes(part.data);
        if let Some(filename) = part.filename {
            piece = piece.file_name(filename);
        }
        if let Some(mime) = part.mime {
            piece = piece
                .mime_str(&mime)
                .map_err(|e| TransportFault::Unknown(e.into()))?;
        }
        out = out.part(part.name, piece);
    }
    Ok(out)
}

fn map_reqwest_error(error: reqwest::Error) -> TransportFault {
    if error.is_timeout() {
        return if error.is_connect() {
            TransportFault::ConnectTimeout
        } else {
            TransportFault::ReceiveTimeout
        };
    }
    if error.is_connect() {
        return TransportFault::Connection(error.into());
    }
    // hyper raises Canceled when the connection is closed from the server
    // side mid-request; reqwest does not surface it as its own category.
    if let Some(hyper_error) = source_error::<hyper::Error>(&error) {
        if hyper_error.is_canceled() {
            return TransportFault::Cancelled;
        }
    }
    TransportFault::Unknown(error.into())
}
