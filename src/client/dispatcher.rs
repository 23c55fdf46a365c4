// src/client/dispatcher.rs — Authenticated request dispatch with timeout and retry
//
// 1. endpoint → address via the profile table (UnknownEndpoint if absent)
// 2. headers: profile defaults < caller < Authorization: Bearer <token>
// 3. MOCK profile → MockBackend, no retry loop
// 4. otherwise: Attempting(n) → Waiting(n) → … → Done(outcome)

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use super::mock::MockBackend;
use super::retry::{RetryPolicy, RetryState, Sleeper, TokioSleeper};
use super::{
    ApiError, HttpRequest, HttpResponse, ReqwestTransport, RequestOptions, RequestOutcome,
    Transport, TransportError,
};
use crate::infra::errors::SelfcareError;
use crate::profile::{ConfigProfile, Endpoint};
use crate::session::SessionStore;

pub const TIMEOUT_MESSAGE: &str = "Request timeout - please check your connection";
pub const CORS_MESSAGE: &str = "CORS error - API may not support web requests";
pub const NETWORK_MESSAGE: &str = "Network error - please check your internet connection";

pub struct RequestDispatcher {
    profile: ConfigProfile,
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    sleeper: Arc<dyn Sleeper>,
    mock: MockBackend,
    policy: RetryPolicy,
}

impl RequestDispatcher {
    /// Build a dispatcher for a validated profile.
    pub fn new(
        profile: ConfigProfile,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, SelfcareError> {
        profile.validate()?;
        let mock = MockBackend::new(profile.timeout(), sleeper.clone());
        let policy = RetryPolicy::new(profile.max_retries());
        Ok(Self {
            profile,
            session,
            transport,
            sleeper,
            mock,
            policy,
        })
    }

    /// reqwest transport and tokio timers.
    pub fn with_defaults(
        profile: ConfigProfile,
        session: Arc<SessionStore>,
    ) -> Result<Self, SelfcareError> {
        Self::new(
            profile,
            session,
            Arc::new(ReqwestTransport::new()),
            Arc::new(TokioSleeper),
        )
    }

    pub fn profile(&self) -> &ConfigProfile {
        &self.profile
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Dispatch by wire name; unknown names fail before any attempt.
    pub async fn request_named(&self, name: &str, options: RequestOptions) -> RequestOutcome {
        match name.parse::<Endpoint>() {
            Ok(endpoint) => self.request(endpoint, options).await,
            Err(_) => Err(self.unknown_endpoint(name)),
        }
    }

    pub async fn request(&self, endpoint: Endpoint, options: RequestOptions) -> RequestOutcome {
        let Some(url) = self.profile.url_for(endpoint) else {
            return Err(self.unknown_endpoint(endpoint.as_str()));
        };

        let token = self.session.get_token();
        let headers = merge_headers(
            self.profile.default_headers(),
            &options.headers,
            token.as_deref(),
        );

        if self.profile.is_mock() {
            let options = RequestOptions { headers, ..options };
            return self.mock.handle(endpoint, &options).await;
        }

        let request = HttpRequest {
            method: options.method,
            url,
            headers,
            body: options.body.map(|b| b.to_string()),
        };

        let mut state = RetryState::Attempting(1);
        loop {
            state = match state {
                RetryState::Attempting(attempt) => {
                    tracing::debug!(
                        endpoint = %endpoint,
                        attempt,
                        method = %request.method,
                        url = %request.url,
                        "API request"
                    );
                    let outcome = self.attempt(&request).await;
                    if let Err(ref e) = outcome {
                        tracing::warn!(
                            endpoint = %endpoint,
                            attempt,
                            kind = ?e.kind(),
                            "API request failed: {}",
                            e
                        );
                    }
                    self.policy.after_attempt(attempt, outcome)
                }
                RetryState::Waiting(attempt) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::warn!(
                        endpoint = %endpoint,
                        attempt,
                        max_retries = self.policy.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying request"
                    );
                    self.sleeper.sleep(delay).await;
                    RetryState::Attempting(attempt + 1)
                }
                RetryState::Done(outcome) => return outcome,
            };
        }
    }

    /// One try under the profile's timeout clock.
    async fn attempt(&self, request: &HttpRequest) -> RequestOutcome {
        let send = self.transport.send(request.clone());
        match tokio::time::timeout(self.profile.timeout(), send).await {
            Err(_elapsed) => Err(ApiError::Timeout {
                message: TIMEOUT_MESSAGE.into(),
            }),
            Ok(Err(e)) => Err(classify_transport_error(&e)),
            Ok(Ok(response)) => classify_response(response),
        }
    }

    fn unknown_endpoint(&self, name: &str) -> ApiError {
        ApiError::UnknownEndpoint {
            endpoint: name.to_string(),
            profile: self.profile.name().to_string(),
        }
    }
}

/// Insert replacing any existing header of the same name, ignoring case.
fn put_header(headers: &mut BTreeMap<String, String>, name: &str, value: &str) {
    headers.retain(|k, _| !k.eq_ignore_ascii_case(name));
    headers.insert(name.to_string(), value.to_string());
}

/// Profile defaults < caller-supplied < bearer token.
pub fn merge_headers(
    defaults: &BTreeMap<String, String>,
    caller: &BTreeMap<String, String>,
    token: Option<&str>,
) -> BTreeMap<String, String> {
    let mut merged = BTreeMap::new();
    for (k, v) in defaults.iter().chain(caller.iter()) {
        put_header(&mut merged, k, v);
    }
    if let Some(token) = token {
        put_header(&mut merged, "Authorization", &format!("Bearer {token}"));
    }
    merged
}

/// Map a transport failure to `Timeout` or `Network`. CORS-looking failures
/// get their own advisory text but stay `Network`.
pub fn classify_transport_error(error: &TransportError) -> ApiError {
    match error {
        TransportError::Timeout => ApiError::Timeout {
            message: TIMEOUT_MESSAGE.into(),
        },
        TransportError::Connect(detail) | TransportError::Other(detail) => {
            let lower = detail.to_ascii_lowercase();
            let message = if lower.contains("cors") || lower.contains("cross-origin") {
                CORS_MESSAGE.to_string()
            } else {
                format!("{NETWORK_MESSAGE} ({detail})")
            };
            ApiError::Network { message }
        }
    }
}

/// `message` or `error` from a JSON error body.
fn structured_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .filter_map(|field| value.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Non-2xx → `Http`; JSON → parsed; anything else → `{success, data: text}`.
pub fn classify_response(response: HttpResponse) -> RequestOutcome {
    let status = response.status;
    if !(200..300).contains(&status) {
        let message = structured_error_message(&response.body).unwrap_or_else(|| {
            match reqwest::StatusCode::from_u16(status)
                .ok()
                .and_then(|s| s.canonical_reason())
            {
                Some(reason) => format!("HTTP {status}: {reason}"),
                None => format!("HTTP {status}"),
            }
        });
        return Err(ApiError::Http { status, message });
    }

    let is_json = response
        .content_type
        .as_deref()
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false);

    if is_json {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(value) => return Ok(value),
            Err(e) => tracing::debug!("JSON content type but unparseable body: {e}"),
        }
    }

    Ok(json!({ "success": true, "data": response.body }))
}
