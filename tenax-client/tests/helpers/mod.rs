#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::StatusCode;
use tenax_client::{
    Client, ClientBuilder, OutgoingRequest, Transport, TransportFault, TransportResponse,
};
use url::Url;

/// A transport that replays a canned sequence of outcomes, recording how many
/// times it was called and what it was last asked to send.
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Result<TransportResponse, TransportFault>>>,
    calls: AtomicU32,
    last_request: Mutex<Option<OutgoingRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: Vec<Result<TransportResponse, TransportFault>>) -> Arc<Self> {
        Arc::new(ScriptedTransport {
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<OutgoingRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<TransportResponse, TransportFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("transport script exhausted")
    }
}

pub fn response(status: u16, body: &str) -> Result<TransportResponse, TransportFault> {
    Ok(TransportResponse {
        status: StatusCode::from_u16(status).unwrap(),
        body: Bytes::copy_from_slice(body.as_bytes()),
    })
}

pub fn client(transport: Arc<ScriptedTransport>) -> Client {
    ClientBuilder::new(transport)
        .base_url(Url::parse("https://api.test").unwrap())
        .build()
}
