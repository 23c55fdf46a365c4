// tests/dispatcher_test.rs — Integration test: dispatcher with scripted transports

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use serde_json::json;

use selfcare::client::{
    ErrorKind, HttpRequest, HttpResponse, RecordingSleeper, RequestDispatcher, RequestOptions,
    Transport, TransportError,
};
use selfcare::infra::config::ProfileTuning;
use selfcare::profile::{ConfigProfile, Endpoint, ProfileName};
use selfcare::session::SessionStore;

/// Replays canned results in order and records every request it sees.
/// Once the script runs out it keeps answering with the last entry.
struct ScriptedTransport {
    script: Mutex<VecDeque<Result<HttpResponse, TransportError>>>,
    last: Mutex<Option<Result<HttpResponse, TransportError>>>,
    seen: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(script: Vec<Result<HttpResponse, TransportError>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.seen.lock().unwrap().clone()
    }

    fn attempts(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        let next = self.script.lock().unwrap().pop_front();
        let mut last = self.last.lock().unwrap();
        match next {
            Some(result) => {
                *last = Some(result.clone());
                result
            }
            None => last
                .clone()
                .unwrap_or_else(|| Err(TransportError::Other("script exhausted".into()))),
        }
    }
}

/// Never answers; only the dispatcher's timeout ends an attempt.
#[derive(Default)]
struct HangingTransport {
    calls: Mutex<usize>,
}

#[async_trait]
impl Transport for HangingTransport {
    async fn send(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        *self.calls.lock().unwrap() += 1;
        std::future::pending().await
    }
}

fn json_ok(body: serde_json::Value) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: 200,
        content_type: Some("application/json".into()),
        body: body.to_string(),
    })
}

fn status(code: u16) -> Result<HttpResponse, TransportError> {
    Ok(HttpResponse {
        status: code,
        content_type: Some("text/html".into()),
        body: String::new(),
    })
}

fn development(max_retries: u32) -> ConfigProfile {
    ConfigProfile::builtin(ProfileName::Development)
        .with_tuning(&ProfileTuning {
            max_retries: Some(max_retries),
            ..Default::default()
        })
        .unwrap()
}

fn dispatcher(
    profile: ConfigProfile,
    transport: Arc<dyn Transport>,
) -> (RequestDispatcher, RecordingSleeper, Arc<SessionStore>) {
    let sleeper = RecordingSleeper::new();
    let session = Arc::new(SessionStore::in_memory());
    let dispatcher =
        RequestDispatcher::new(profile, session.clone(), transport, Arc::new(sleeper.clone()))
            .unwrap();
    (dispatcher, sleeper, session)
}

#[tokio::test(start_paused = true)]
async fn test_timeout_exhausts_every_attempt_with_linear_backoff() {
    let transport = Arc::new(HangingTransport::default());
    let (dispatcher, sleeper, _) = dispatcher(development(3), transport.clone());

    let err = dispatcher
        .request(Endpoint::AccountBalance, RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(err.message(), "Request timeout - please check your connection");
    assert_eq!(*transport.calls.lock().unwrap(), 3);
    assert_eq!(
        sleeper.delays(),
        vec![Duration::from_millis(1_000), Duration::from_millis(2_000)]
    );
}

#[tokio::test]
async fn test_unknown_endpoint_makes_no_attempt() {
    let transport = ScriptedTransport::new(vec![json_ok(json!({"success": true}))]);
    let (dispatcher, sleeper, _) = dispatcher(development(3), transport.clone());

    let err = dispatcher
        .request_named("fooBar", RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownEndpoint);
    assert!(err.message().contains("fooBar"));

    // Known name, but DEVELOPMENT does not route the OTP flow
    let err = dispatcher
        .request(Endpoint::SendOtp, RequestOptions::post(json!({})))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownEndpoint);

    assert_eq!(transport.attempts(), 0);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_network_failure_recovers_on_retry() {
    let transport = ScriptedTransport::new(vec![
        Err(TransportError::Connect("connection refused".into())),
        json_ok(json!({"success": true, "balance": 99.5})),
    ]);
    let (dispatcher, sleeper, _) = dispatcher(development(3), transport.clone());

    let value = dispatcher
        .request(Endpoint::AccountBalance, RequestOptions::get())
        .await
        .unwrap();

    assert_eq!(value["balance"], 99.5);
    assert_eq!(transport.attempts(), 2);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(1_000)]);
}

#[tokio::test]
async fn test_http_error_is_retried_until_exhausted() {
    let transport = ScriptedTransport::new(vec![status(503)]);
    let (dispatcher, sleeper, _) = dispatcher(development(2), transport.clone());

    let err = dispatcher
        .request(Endpoint::Transactions, RequestOptions::get())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(err.status(), Some(503));
    assert_eq!(err.message(), "HTTP 503: Service Unavailable");
    assert_eq!(transport.attempts(), 2);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(1_000)]);
}

#[tokio::test]
async fn test_single_attempt_profile_never_waits() {
    let transport = ScriptedTransport::new(vec![status(500)]);
    let (dispatcher, sleeper, _) = dispatcher(development(1), transport.clone());

    let err = dispatcher
        .request(Endpoint::UserProfile, RequestOptions::get())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Http);
    assert_eq!(transport.attempts(), 1);
    assert!(sleeper.delays().is_empty());
}

#[tokio::test]
async fn test_bearer_token_and_profile_headers_are_sent() {
    let transport = ScriptedTransport::new(vec![json_ok(json!({"success": true}))]);
    let profile = ConfigProfile::builtin(ProfileName::Production);
    let (dispatcher, _, session) = dispatcher(profile, transport.clone());

    let user = serde_json::from_value(json!({
        "phone": "+94 771234567",
        "name": "John Doe",
        "email": "john.doe@example.com",
        "accountStatus": "Active",
        "plan": "Unlimited Data",
        "balance": 1250.5,
        "lastLogin": "2024-01-20T10:00:00Z"
    }))
    .unwrap();
    session.set_session("tok-123", &user).unwrap();

    dispatcher
        .request(
            Endpoint::Recharge,
            RequestOptions::post(json!({"amount": 500})).with_header("X-Trace", "abc"),
        )
        .await
        .unwrap();

    let sent = transport.requests();
    assert_eq!(sent.len(), 1);
    let req = &sent[0];
    assert_eq!(req.url, "https://selfcare.mobitel.lk/api/services/recharge");
    assert_eq!(req.method, selfcare::client::Method::POST);
    assert_eq!(req.headers["Authorization"], "Bearer tok-123");
    assert_eq!(req.headers["User-Agent"], "MobitelSelfcareWeb/1.0");
    assert_eq!(req.headers["X-Requested-With"], "XMLHttpRequest");
    assert_eq!(req.headers["Content-Type"], "application/json");
    assert_eq!(req.headers["X-Trace"], "abc");
    assert_eq!(req.body.as_deref(), Some(r#"{"amount":500}"#));
}

#[tokio::test]
async fn test_no_token_means_no_authorization_header() {
    let transport = ScriptedTransport::new(vec![json_ok(json!({"success": true}))]);
    let (dispatcher, _, _) = dispatcher(development(1), transport.clone());

    dispatcher
        .request(Endpoint::Login, RequestOptions::post(json!({})))
        .await
        .unwrap();

    let sent = transport.requests();
    assert!(!sent[0].headers.contains_key("Authorization"));
    assert_eq!(sent[0].url, "http://localhost:3000/api/auth/login");
}

#[tokio::test]
async fn test_mock_profile_bypasses_transport() {
    let transport = ScriptedTransport::new(vec![]);
    let (dispatcher, sleeper, _) =
        dispatcher(ConfigProfile::builtin(ProfileName::Mock), transport.clone());

    let value = dispatcher
        .request(
            Endpoint::Login,
            RequestOptions::post(json!({"phone": "771234567", "password": "password123"})),
        )
        .await
        .unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["user"]["name"], "John Doe");
    assert_eq!(transport.attempts(), 0);
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(1_500)]);
}

#[tokio::test]
async fn test_mock_failures_are_not_retried() {
    let transport = ScriptedTransport::new(vec![]);
    let (dispatcher, sleeper, _) =
        dispatcher(ConfigProfile::builtin(ProfileName::Mock), transport.clone());

    let err = dispatcher
        .request(
            Endpoint::Login,
            RequestOptions::post(json!({"phone": "771234567", "password": "wrong"})),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidCredentials);
    // Only the simulated latency, no backoff
    assert_eq!(sleeper.delays(), vec![Duration::from_millis(1_500)]);
}
