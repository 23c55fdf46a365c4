// src/client/mod.rs — Request dispatch layer
//
// caller → RequestDispatcher::request(endpoint, options)
//        → MockBackend (MOCK profile) | Transport with timeout + retry
//        → RequestOutcome (never panics, never escapes as an unclassified error)

pub mod dispatcher;
pub mod http;
pub mod mock;
pub mod retry;

pub use dispatcher::RequestDispatcher;
pub use http::ReqwestTransport;
pub use mock::MockBackend;
pub use retry::{RecordingSleeper, RetryPolicy, RetryState, Sleeper, TokioSleeper};

use async_trait::async_trait;
pub use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

/// Success carries the JSON envelope; failure carries a classified error.
pub type RequestOutcome = Result<Value, ApiError>;

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    Validation,
    InvalidCredentials,
    UnknownEndpoint,
    Timeout,
    Network,
    Http,
    MalformedResponse,
    Storage,
}

/// A classified request failure. `Display` is the user-facing message.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    InvalidCredentials { message: String },

    #[error("Unknown endpoint '{endpoint}' for the {profile} profile")]
    UnknownEndpoint { endpoint: String, profile: String },

    #[error("{message}")]
    Timeout { message: String },

    #[error("{message}")]
    Network { message: String },

    #[error("{message}")]
    Http { status: u16, message: String },

    #[error("Unexpected response: {message}")]
    MalformedResponse { message: String },

    /// The request went through but the local session store could not be updated.
    #[error("Session store error: {message}")]
    Storage { message: String },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Validation { .. } => ErrorKind::Validation,
            ApiError::InvalidCredentials { .. } => ErrorKind::InvalidCredentials,
            ApiError::UnknownEndpoint { .. } => ErrorKind::UnknownEndpoint,
            ApiError::Timeout { .. } => ErrorKind::Timeout,
            ApiError::Network { .. } => ErrorKind::Network,
            ApiError::Http { .. } => ErrorKind::Http,
            ApiError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ApiError::Storage { .. } => ErrorKind::Storage,
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Status code for `Http` failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Transport-level and HTTP failures are retried; 4xx and 5xx alike.
    pub fn is_retriable(&self) -> bool {
        matches!(
            self,
            ApiError::Timeout { .. } | ApiError::Network { .. } | ApiError::Http { .. }
        )
    }
}

// ─── Request options ────────────────────────────────────────────────────────

/// What the caller asks for; the dispatcher adds address, defaults and auth.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
    pub body: Option<Value>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

// ─── Transport seam ─────────────────────────────────────────────────────────

/// A fully resolved wire request.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// The parts of a response the dispatcher classifies on.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("{0}")]
    Other(String),
}

/// Issues one wire request. Retry and timeout policy live above this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}
