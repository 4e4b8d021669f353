use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::Method;
use serde_json::Value;
use tenax_retry::{retries_by_default, ErrorKind, RetryPolicy};
use url::Url;

use crate::classify::{classify_fault, classify_status};
use crate::config::{BaseUrlResolver, StaticBaseUrl};
use crate::envelope::Envelope;
use crate::error::{Error, Result};
use crate::interceptor::{AttemptFailure, Interceptor};
use crate::request::{ApiRequest, MultipartForm};
use crate::transport::{OutgoingRequest, Transport};

/// The per-call parsing collaborator: turns the raw JSON payload into the
/// caller's type, or `None` when the payload does not have the expected
/// shape.
pub type ParseFn<T> = dyn Fn(&Value) -> Option<T> + Send + Sync;

/// How one attempt failed outside the envelope: plain faults are retried,
/// interceptor overrides end the invocation on the spot.
enum AttemptError {
    Fault(Error),
    Override(Error),
}

impl From<Error> for AttemptError {
    fn from(error: Error) -> Self {
        AttemptError::Fault(error)
    }
}

/// Builds a [`Client`] from a transport, an optional base URL, and an
/// ordered interceptor chain.
pub struct ClientBuilder {
    transport: Arc<dyn Transport>,
    resolver: Option<Arc<dyn BaseUrlResolver>>,
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ClientBuilder {
    pub fn new<T: Transport>(transport: T) -> Self {
        ClientBuilder {
            transport: Arc::new(transport),
            resolver: None,
            interceptors: Vec::new(),
        }
    }

    /// Resolves every request against a fixed base URL.
    pub fn base_url(self, url: Url) -> Self {
        self.base_url_resolver(StaticBaseUrl::new(url))
    }

    /// Resolves the base URL through `resolver`, invoked fresh before every
    /// attempt. Without a resolver, request paths must be absolute URLs.
    pub fn base_url_resolver<R: BaseUrlResolver>(mut self, resolver: R) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Convenience method to attach an interceptor.
    ///
    /// If you need to keep a reference to the interceptor after attaching,
    /// use [`with_arc`](Self::with_arc).
    pub fn with<I: Interceptor>(self, interceptor: I) -> Self {
        self.with_arc(Arc::new(interceptor))
    }

    /// Adds an interceptor to the chain. Interceptors run in registration
    /// order on every attempt.
    pub fn with_arc(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> Client {
        Client {
            transport: self.transport,
            resolver: self.resolver,
            interceptors: self.interceptors.into_boxed_slice(),
        }
    }
}

/// The request execution engine.
///
/// One invocation of [`execute`](Self::execute) performs up to
/// `max_attempts` transport calls and produces exactly one [`Envelope`].
/// The client is cheaply clonable and holds no per-request state, so
/// concurrent invocations are fully independent.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    resolver: Option<Arc<dyn BaseUrlResolver>>,
    interceptors: Box<[Arc<dyn Interceptor>]>,
}

impl Client {
    /// Starts a `GET` call.
    pub fn get(&self, path: impl Into<String>) -> CallBuilder {
        self.request(Method::GET, path)
    }

    /// Starts a `POST` call.
    pub fn post(&self, path: impl Into<String>) -> CallBuilder {
        self.request(Method::POST, path)
    }

    /// Starts a `PUT` call.
    pub fn put(&self, path: impl Into<String>) -> CallBuilder {
        self.request(Method::PUT, path)
    }

    /// Starts a `PATCH` call.
    pub fn patch(&self, path: impl Into<String>) -> CallBuilder {
        self.request(Method::PATCH, path)
    }

    /// Starts a `DELETE` call.
    pub fn delete(&self, path: impl Into<String>) -> CallBuilder {
        self.request(Method::DELETE, path)
    }

    /// Starts a call with an arbitrary verb.
    pub fn request(&self, method: Method, path: impl Into<String>) -> CallBuilder {
        CallBuilder {
            client: self.clone(),
            request: ApiRequest::new(method, path),
            retry: None,
            policy: None,
        }
    }

    /// Executes `request`, retrying according to policy, and returns the
    /// final envelope.
    ///
    /// - `parse`: optional parsing collaborator. When present, its result is
    ///   the success payload, and `None` on a transport-successful response
    ///   yields a `Parsing` failure. When absent, the raw body is the
    ///   payload.
    /// - `retry`: explicit opt in/out. When unspecified, only GET-class
    ///   requests retry.
    /// - `policy`: explicit retry policy. When unspecified, the verb-based
    ///   default applies.
    ///
    /// Classified failures always come back as `Ok(Envelope::Failure)`. An
    /// `Err` means the fault was outside the taxonomy (interceptor failure,
    /// unbuildable URL) and recurred through the whole retry budget, or an
    /// interceptor override ended the invocation early.
    pub async fn execute<T>(
        &self,
        request: &ApiRequest,
        parse: Option<&ParseFn<T>>,
        retry: Option<bool>,
        policy: Option<RetryPolicy>,
    ) -> Result<Envelope<T>> {
        let retry_enabled = retry.unwrap_or_else(|| retries_by_default(&request.method));
        if !retry_enabled {
            return match self.attempt(request, parse).await {
                Ok(envelope) => Ok(envelope),
                Err(AttemptError::Override(error)) => Err(error),
                Err(AttemptError::Fault(error)) => {
                    tracing::error!(%error, "request failed outside the taxonomy");
                    Err(error)
                }
            };
        }

        let policy = policy.unwrap_or_else(|| RetryPolicy::for_method(&request.method));
        let max_attempts = policy.max_attempts.max(1);

        let mut attempt = 1;
        loop {
            match self.attempt(request, parse).await {
                Ok(envelope) => match envelope {
                    Envelope::Success { .. } => return Ok(envelope),
                    Envelope::Failure { kind, .. } => {
                        if !policy.is_retryable(kind) || attempt >= max_attempts {
                            return Ok(envelope);
                        }
                        let delay = policy.delay_for(attempt - 1);
                        tracing::warn!(
                            %kind,
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            "attempt failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                    }
                },
                // Interceptor overrides are terminal, never retried.
                Err(AttemptError::Override(error)) => return Err(error),
                Err(AttemptError::Fault(error)) => {
                    if attempt >= max_attempts {
                        tracing::error!(%error, attempt, "request failed outside the taxonomy");
                        return Err(error);
                    }
                    let delay = policy.delay_for(attempt - 1);
                    tracing::warn!(
                        %error,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "attempt errored, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
            attempt += 1;
        }
    }

    /// One attempt: prepare, run the interceptor chain, dispatch, classify.
    async fn attempt<T>(
        &self,
        request: &ApiRequest,
        parse: Option<&ParseFn<T>>,
    ) -> std::result::Result<Envelope<T>, AttemptError> {
        let mut outgoing = self.prepare(request)?;
        for interceptor in self.interceptors.iter() {
            interceptor.before_request(&mut outgoing).await?;
        }

        match self.transport.send(outgoing).await {
            Ok(response) if response.status.is_success() => {
                let status = Some(response.status);
                let raw = decode_body(&response.body);
                match parse {
                    Some(parse) => match raw.as_ref().and_then(parse) {
                        Some(data) => Ok(Envelope::Success {
                            status,
                            raw,
                            data: Some(data),
                        }),
                        // A parse function that yields nothing for a payload
                        // the transport reported as success is a failure, not
                        // a silent `Success(None)`.
                        None => Ok(Envelope::Failure {
                            status,
                            raw,
                            kind: ErrorKind::Parsing,
                        }),
                    },
                    None => Ok(Envelope::Success {
                        status,
                        raw,
                        data: None,
                    }),
                }
            }
            Ok(response) => {
                let raw = decode_body(&response.body);
                let kind = classify_status(response.status);
                self.failure(Some(response.status), raw, kind).await
            }
            Err(fault) => {
                let kind = classify_fault(&fault);
                tracing::debug!(%fault, %kind, "transport fault");
                self.failure(None, None, kind).await
            }
        }
    }

    /// Builds a failure envelope, giving `on_error` interceptors the chance
    /// to override it with a typed error first.
    async fn failure<T>(
        &self,
        status: Option<http::StatusCode>,
        raw: Option<Value>,
        kind: ErrorKind,
    ) -> std::result::Result<Envelope<T>, AttemptError> {
        let failure = AttemptFailure {
            status,
            raw: raw.as_ref(),
            kind,
        };
        for interceptor in self.interceptors.iter() {
            if let Some(error) = interceptor.on_error(&failure).await {
                return Err(AttemptError::Override(error));
            }
        }
        Ok(Envelope::Failure { status, raw, kind })
    }

    fn prepare(&self, request: &ApiRequest) -> Result<OutgoingRequest> {
        Ok(OutgoingRequest {
            method: request.method.clone(),
            url: self.resolve_url(request)?,
            headers: request.headers.clone(),
            query: request.query.clone(),
            // Multipart wins when both payloads are present.
            body: if request.multipart.is_some() {
                None
            } else {
                request.body.clone()
            },
            multipart: request.multipart.clone(),
        })
    }

    fn resolve_url(&self, request: &ApiRequest) -> Result<Url> {
        let mut relative = String::new();
        if let Some(version) = &request.version {
            relative.push_str(version.trim_matches('/'));
            relative.push('/');
        }
        relative.push_str(request.path.trim_start_matches('/'));

        match &self.resolver {
            Some(resolver) => {
                let base = resolver.base_url();
                let joined = format!("{}/{}", base.as_str().trim_end_matches('/'), relative);
                Ok(Url::parse(&joined)?)
            }
            None => Ok(Url::parse(&relative)?),
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // skipping the transport and interceptor stacks
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

fn decode_body(body: &Bytes) -> Option<Value> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_slice(body)
        .ok()
        .or_else(|| Some(Value::String(String::from_utf8_lossy(body).into_owned())))
}

/// Fluent surface over [`Client::execute`] for one call.
#[must_use = "CallBuilder does nothing until you 'send' it"]
pub struct CallBuilder {
    client: Client,
    request: ApiRequest,
    retry: Option<bool>,
    policy: Option<RetryPolicy>,
}

impl CallBuilder {
    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.request = self.request.query(key, value);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.request = self.request.header(name, value);
        self
    }

    /// Sets the API version segment.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.request = self.request.version(version);
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.request = self.request.json(body);
        self
    }

    /// Sets a multipart payload. Takes priority over [`json`](Self::json).
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.request = self.request.multipart(form);
        self
    }

    /// Explicitly opts this call in or out of retrying.
    pub fn retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Overrides the verb-based default policy for this call.
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = Some(policy);
        self
    }

    /// The request descriptor built so far.
    pub fn into_request(self) -> ApiRequest {
        self.request
    }

    /// Sends without a parsing collaborator; the raw body is the payload.
    pub async fn send(self) -> Result<Envelope<Value>> {
        self.client
            .execute(&self.request, None, self.retry, self.policy)
            .await
    }

    /// Sends with a parsing collaborator; its result becomes the payload.
    pub async fn send_parsed<T>(
        self,
        parse: impl Fn(&Value) -> Option<T> + Send + Sync + 'static,
    ) -> Result<Envelope<T>> {
        let parse: &ParseFn<T> = &parse;
        self.client
            .execute(&self.request, Some(parse), self.retry, self.policy)
            .await
    }
}
