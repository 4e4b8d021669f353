use std::collections::HashMap;

use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use serde_json::Value;

/// An immutable description of one logical API call.
///
/// Built with the consuming-builder methods below, then passed by reference
/// into [`Client::execute`](crate::Client::execute); the engine clones what
/// it needs per attempt and never mutates the descriptor.
///
/// A request may carry either a JSON body or a multipart payload. If both are
/// set, multipart wins.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub version: Option<String>,
    pub body: Option<Value>,
    pub multipart: Option<MultipartForm>,
    pub query: HashMap<String, String>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        ApiRequest {
            method,
            path: path.into(),
            version: None,
            body: None,
            multipart: None,
            query: HashMap::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Sets the API version segment, inserted between the base URL and the
    /// endpoint path.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Sets a multipart payload. Takes priority over [`json`](Self::json).
    pub fn multipart(mut self, form: MultipartForm) -> Self {
        self.multipart = Some(form);
        self
    }

    /// Adds a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// A transport-agnostic multipart payload.
///
/// Kept as plain bytes so the engine can rebuild the transport-specific form
/// for every attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartForm {
    parts: Vec<MultipartPart>,
}

#[derive(Debug, Clone)]
pub struct MultipartPart {
    pub name: String,
    pub filename: Option<String>,
    pub mime: Option<String>,
    pub data: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        MultipartForm::default()
    }

    /// Adds a plain text field.
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.part(MultipartPart {
            name: name.into(),
            filename: None,
            mime: None,
            data: value.into().into_bytes(),
        })
    }

    /// Adds a file field.
    pub fn file(
        self,
        name: impl Into<String>,
        filename: impl Into<String>,
        mime: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.part(MultipartPart {
            name: name.into(),
            filename: Some(filename.into()),
            mime: Some(mime.into()),
            data,
        })
    }

    pub fn part(mut self, part: MultipartPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn parts(&self) -> &[MultipartPart] {
        &self.parts
    }

    pub fn into_parts(self) -> Vec<MultipartPart> {
        self.parts
    }
}
