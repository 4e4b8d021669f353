mod helpers;

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use helpers::{client, response, ScriptedTransport};
use serde_json::{json, Value};
use tenax_client::{
    ApiRequest, AttemptFailure, ClientBuilder, Envelope, Error, ErrorKind, Interceptor,
    MultipartForm, OutgoingRequest, RetryPolicy, TransportFault,
};
use url::Url;

fn quick_policy(max_attempts: u32, retryable: Vec<ErrorKind>) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        initial_delay: Duration::from_millis(1),
        backoff_multiplier: 2.0,
        max_delay: Duration::from_millis(4),
        retryable_errors: retryable,
    }
}

#[tokio::test(start_paused = true)]
async fn post_performs_a_single_attempt_by_default() {
    let transport = ScriptedTransport::new(vec![Err(TransportFault::ConnectTimeout)]);
    let envelope = client(transport.clone()).post("/orders").send().await.unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::BadConnection));
}

#[tokio::test(start_paused = true)]
async fn get_retries_by_default_with_the_data_fetch_budget() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportFault::ConnectTimeout),
        Err(TransportFault::ReceiveTimeout),
    ]);
    let envelope = client(transport.clone()).get("/orders").send().await.unwrap();

    // data-fetch preset: two attempts total.
    assert_eq!(transport.calls(), 2);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::BadConnection));
}

#[tokio::test(start_paused = true)]
async fn non_retryable_failure_short_circuits_with_attempts_remaining() {
    let transport = ScriptedTransport::new(vec![response(403, "")]);
    let envelope = client(transport.clone())
        .get("/orders")
        .retry_policy(quick_policy(3, vec![ErrorKind::Server]))
        .send()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Forbidden));
}

#[tokio::test(start_paused = true)]
async fn retryable_failure_consumes_the_full_budget() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportFault::ConnectTimeout),
        Err(TransportFault::ConnectTimeout),
        Err(TransportFault::ConnectTimeout),
    ]);
    let envelope = client(transport.clone())
        .get("/orders")
        .retry_policy(quick_policy(3, vec![ErrorKind::BadConnection]))
        .send()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 3);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::BadConnection));
}

#[tokio::test(start_paused = true)]
async fn success_mid_budget_stops_the_loop() {
    let transport = ScriptedTransport::new(vec![
        response(500, ""),
        response(200, r#"{"ok":true}"#),
    ]);
    let envelope = client(transport.clone())
        .get("/orders")
        .retry_policy(quick_policy(3, vec![ErrorKind::Server]))
        .send()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 2);
    assert!(envelope.is_success());
    assert_eq!(envelope.raw(), Some(&json!({"ok": true})));
}

#[tokio::test(start_paused = true)]
async fn explicit_retry_on_post_uses_the_interactive_budget() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportFault::ConnectTimeout),
        Err(TransportFault::ConnectTimeout),
    ]);
    let envelope = client(transport.clone())
        .post("/orders")
        .retry(true)
        .send()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::BadConnection));
}

#[tokio::test(start_paused = true)]
async fn interactive_policy_does_not_retry_cancellation() {
    let transport = ScriptedTransport::new(vec![Err(TransportFault::Cancelled)]);
    let envelope = client(transport.clone())
        .post("/orders")
        .retry(true)
        .send()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn data_fetch_policy_retries_cancellation() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportFault::Cancelled),
        Err(TransportFault::Cancelled),
    ]);
    let envelope = client(transport.clone()).get("/orders").send().await.unwrap();

    assert_eq!(transport.calls(), 2);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Cancelled));
}

#[tokio::test(start_paused = true)]
async fn delete_opted_into_retry_still_gets_the_none_preset() {
    let transport = ScriptedTransport::new(vec![response(500, "")]);
    let envelope = client(transport.clone())
        .delete("/orders/1")
        .retry(true)
        .send()
        .await
        .unwrap();

    assert_eq!(transport.calls(), 1);
    assert_eq!(envelope.error_kind(), Some(ErrorKind::Server));
}

#[tokio::test(start_paused = true)]
async fn parse_function_returning_none_yields_a_parsing_failure() {
    let transport = ScriptedTransport::new(vec![response(200, r#"{"name":42}"#)]);
    let envelope = client(transport)
        .post("/users")
        .send_parsed(|value: &Value| {
            value.get("name").and_then(Value::as_str).map(String::from)
        })
        .await
        .unwrap();

    assert_eq!(envelope.error_kind(), Some(ErrorKind::Parsing));
    // The offending payload is still available to the caller.
    assert_eq!(envelope.raw(), Some(&json!({"name": 42})));
}

#[tokio::test(start_paused = true)]
async fn parse_function_result_becomes_the_payload() {
    let transport = ScriptedTransport::new(vec![response(200, r#"{"name":"ada"}"#)]);
    let envelope = client(transport)
        .get("/users/1")
        .send_parsed(|value: &Value| {
            value.get("name").and_then(Value::as_str).map(String::from)
        })
        .await
        .unwrap();

    assert_eq!(envelope.data(), Some(&"ada".to_string()));
}

#[tokio::test(start_paused = true)]
async fn raw_passthrough_when_no_parse_function_is_supplied() {
    let transport = ScriptedTransport::new(vec![response(200, r#"{"a":1}"#)]);
    let envelope = client(transport).get("/raw").send().await.unwrap();

    assert!(envelope.is_success());
    assert_eq!(envelope.raw(), Some(&json!({"a": 1})));
    assert_eq!(envelope.data(), None);
}

#[tokio::test(start_paused = true)]
async fn multipart_wins_over_a_json_body() {
    let transport = ScriptedTransport::new(vec![response(200, "")]);
    let form = MultipartForm::new().text("note", "hello");
    client(transport.clone())
        .post("/upload")
        .json(json!({"ignored": true}))
        .multipart(form)
        .send()
        .await
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert!(sent.body.is_none());
    assert!(sent.multipart.is_some());
}

#[tokio::test(start_paused = true)]
async fn version_segment_lands_between_base_and_path() {
    let transport = ScriptedTransport::new(vec![response(200, "")]);
    client(transport.clone())
        .get("/users")
        .version("v2")
        .query("page", "3")
        .send()
        .await
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.url.as_str(), "https://api.test/v2/users");
    assert_eq!(sent.query.get("page").map(String::as_str), Some("3"));
}

struct FailingInterceptor {
    calls: AtomicU32,
}

#[async_trait::async_trait]
impl Interceptor for FailingInterceptor {
    async fn before_request(&self, _request: &mut OutgoingRequest) -> tenax_client::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(Error::Interceptor(anyhow::anyhow!("boom")))
    }
}

#[tokio::test(start_paused = true)]
async fn faults_outside_the_taxonomy_are_retried_then_propagated() {
    let transport = ScriptedTransport::new(vec![]);
    let interceptor = Arc::new(FailingInterceptor {
        calls: AtomicU32::new(0),
    });
    let client = ClientBuilder::new(transport.clone())
        .base_url(Url::parse("https://api.test").unwrap())
        .with_arc(interceptor.clone())
        .build();

    let request = ApiRequest::new(http::Method::GET, "/orders");
    let result = client
        .execute::<Value>(
            &request,
            None,
            Some(true),
            Some(quick_policy(2, vec![ErrorKind::BadConnection])),
        )
        .await;

    assert!(matches!(result, Err(Error::Interceptor(_))));
    // The fault consumed the whole budget without ever reaching the
    // transport.
    assert_eq!(interceptor.calls.load(Ordering::SeqCst), 2);
    assert_eq!(transport.calls(), 0);
}

struct VetoingInterceptor {
    overrides: AtomicU32,
}

#[async_trait::async_trait]
impl Interceptor for VetoingInterceptor {
    async fn on_error(&self, _failure: &AttemptFailure<'_>) -> Option<Error> {
        self.overrides.fetch_add(1, Ordering::SeqCst);
        Some(Error::Interceptor(anyhow::anyhow!("vetoed")))
    }
}

#[tokio::test(start_paused = true)]
async fn on_error_override_is_terminal_even_under_a_retryable_policy() {
    let transport = ScriptedTransport::new(vec![response(500, ""), response(500, "")]);
    let interceptor = Arc::new(VetoingInterceptor {
        overrides: AtomicU32::new(0),
    });
    let client = ClientBuilder::new(transport.clone())
        .base_url(Url::parse("https://api.test").unwrap())
        .with_arc(interceptor.clone())
        .build();

    let result = client
        .get("/orders")
        .retry_policy(quick_policy(3, vec![ErrorKind::Server]))
        .send()
        .await;

    // The override ends the invocation on the first failing attempt, even
    // though the policy would have retried the server error twice more.
    assert!(matches!(result, Err(Error::Interceptor(_))));
    assert_eq!(transport.calls(), 1);
    assert_eq!(interceptor.overrides.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn into_request_captures_the_accumulated_call_state() {
    let transport = ScriptedTransport::new(vec![response(200, "")]);
    let request = client(transport)
        .post("/orders")
        .version("v2")
        .query("dry_run", "true")
        .header(http::header::ACCEPT, http::HeaderValue::from_static("application/json"))
        .json(json!({"sku": "A-1"}))
        .into_request();

    assert_eq!(request.method, http::Method::POST);
    assert_eq!(request.path, "/orders");
    assert_eq!(request.version.as_deref(), Some("v2"));
    assert_eq!(request.query.get("dry_run").map(String::as_str), Some("true"));
    assert_eq!(
        request.headers.get(http::header::ACCEPT).unwrap(),
        "application/json"
    );
    assert_eq!(request.body, Some(json!({"sku": "A-1"})));
}

struct HeaderInterceptor;

#[async_trait::async_trait]
impl Interceptor for HeaderInterceptor {
    async fn before_request(&self, request: &mut OutgoingRequest) -> tenax_client::Result<()> {
        request.headers.insert(
            http::header::USER_AGENT,
            http::HeaderValue::from_static("tenax-test"),
        );
        Ok(())
    }
}

#[tokio::test(start_paused = true)]
async fn before_request_interceptors_mutate_the_outgoing_request() {
    let transport = ScriptedTransport::new(vec![response(200, "")]);
    let client = ClientBuilder::new(transport.clone())
        .base_url(Url::parse("https://api.test").unwrap())
        .with(HeaderInterceptor)
        .build();

    client.get("/ping").send().await.unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(
        sent.headers.get(http::header::USER_AGENT).unwrap(),
        "tenax-test"
    );
}

#[test]
fn envelope_fold_runs_exactly_one_side() {
    let success: Envelope<String> = Envelope::Success {
        status: Some(http::StatusCode::OK),
        raw: None,
        data: Some("payload".into()),
    };
    let seen = success.handle(
        |data, _raw| format!("ok:{}", data.unwrap()),
        |kind, _raw| format!("err:{kind}"),
    );
    assert_eq!(seen, "ok:payload");

    let failure: Envelope<String> = Envelope::Failure {
        status: Some(http::StatusCode::NOT_FOUND),
        raw: None,
        kind: ErrorKind::NotFound,
    };
    let seen = failure.handle(
        |data, _raw| format!("ok:{}", data.unwrap()),
        |kind, _raw| format!("err:{kind}"),
    );
    assert_eq!(seen, "err:not_found");
}
