// src/portal.rs — Collaborator-facing selfcare operations
//
// Front ends (the CLI here) talk to this surface only: login/logout,
// session check, the four dashboard reads, raw calls for the remaining
// endpoints, and environment pinning.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::client::{
    ApiError, RequestDispatcher, RequestOptions, RequestOutcome, Sleeper, Transport,
};
use crate::infra::config::Config;
use crate::infra::errors::SelfcareError;
use crate::models::{Balance, DataUsage, LoginResponse, Transaction, UserRecord};
use crate::profile::resolver;
use crate::profile::{ConfigProfile, Endpoint, ProfileName};
use crate::session::{Session, SessionStore};

pub use crate::phone::{clean_phone, validate_phone_number};

pub struct SelfcarePortal {
    dispatcher: RequestDispatcher,
}

impl SelfcarePortal {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Resolve the environment for `host` (honouring a stored override) and
    /// wire the default reqwest transport.
    pub fn connect(
        host: &str,
        config: &Config,
        session: Arc<SessionStore>,
    ) -> Result<Self, SelfcareError> {
        let profile = Self::resolve_profile(host, config, &session)?;
        Ok(Self::new(RequestDispatcher::with_defaults(profile, session)?))
    }

    /// Same as `connect` with an injected transport and scheduler.
    pub fn connect_with(
        host: &str,
        config: &Config,
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self, SelfcareError> {
        let profile = Self::resolve_profile(host, config, &session)?;
        Ok(Self::new(RequestDispatcher::new(
            profile, session, transport, sleeper,
        )?))
    }

    fn resolve_profile(
        host: &str,
        config: &Config,
        session: &SessionStore,
    ) -> Result<ConfigProfile, SelfcareError> {
        let pinned = session.environment_override();
        let profile = resolver::select_profile(host, pinned.as_deref(), config)?;
        tracing::info!(
            host,
            pinned = pinned.as_deref().unwrap_or("-"),
            profile = %profile.name(),
            "API environment resolved"
        );
        Ok(profile)
    }

    pub fn profile(&self) -> &ConfigProfile {
        self.dispatcher.profile()
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        self.dispatcher.session()
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    /// Stored session, if both token and user record are present.
    pub fn current_session(&self) -> Option<Session> {
        self.session().get_session()
    }

    /// Authenticate and persist the session on success.
    pub async fn login(
        &self,
        phone: &str,
        password: &str,
        remember: bool,
    ) -> Result<LoginResponse, ApiError> {
        let payload = self
            .dispatcher
            .request(
                Endpoint::Login,
                RequestOptions::post(json!({ "phone": phone, "password": password })),
            )
            .await?;

        ensure_success(&payload, |message| ApiError::InvalidCredentials { message })?;
        let login: LoginResponse = decode(payload)?;

        self.session()
            .set_session(&login.token, &login.user)
            .map_err(storage_error)?;
        if let Err(e) = self.session().set_remember(remember) {
            tracing::warn!("Failed to store remember flag: {e}");
        }

        Ok(login)
    }

    /// Notify the backend, then drop the local session whatever it answered.
    /// A store that cannot be cleared wins over the backend's answer.
    pub async fn logout(&self) -> RequestOutcome {
        let outcome = self
            .dispatcher
            .request(Endpoint::Logout, RequestOptions::post(json!({})))
            .await;
        if let Err(ref e) = outcome {
            tracing::warn!("Logout call failed, clearing local session anyway: {e}");
        }
        self.session().clear().map_err(storage_error)?;
        outcome
    }

    pub async fn get_profile(&self) -> Result<UserRecord, ApiError> {
        let payload = self.read(Endpoint::UserProfile).await?;
        decode_field(payload, "user")
    }

    pub async fn get_balance(&self) -> Result<Balance, ApiError> {
        let payload = self.read(Endpoint::AccountBalance).await?;
        decode(payload)
    }

    pub async fn get_data_usage(&self) -> Result<DataUsage, ApiError> {
        let payload = self.read(Endpoint::DataUsage).await?;
        decode_field(payload, "dataUsage")
    }

    pub async fn get_transactions(&self) -> Result<Vec<Transaction>, ApiError> {
        let payload = self.read(Endpoint::Transactions).await?;
        decode_field(payload, "transactions")
    }

    /// Raw passthrough for recharge, data packs, bills and the OTP flow.
    pub async fn call(&self, endpoint: Endpoint, options: RequestOptions) -> RequestOutcome {
        self.dispatcher.request(endpoint, options).await
    }

    /// Pin the environment for the next resolution. Any casing is accepted
    /// here and the canonical name is stored. The running portal keeps its
    /// profile; build a new one to pick the change up.
    pub fn set_environment_override(&self, name: &str) -> Result<ProfileName, SelfcareError> {
        let profile: ProfileName = name.parse()?;
        self.session().set_environment_override(profile)?;
        tracing::info!(profile = %profile, "API mode override stored");
        Ok(profile)
    }

    pub fn clear_environment_override(&self) -> Result<(), SelfcareError> {
        self.session().clear_environment_override()
    }

    async fn read(&self, endpoint: Endpoint) -> RequestOutcome {
        let payload = self.dispatcher.request(endpoint, RequestOptions::get()).await?;
        ensure_success(&payload, |message| ApiError::MalformedResponse { message })?;
        Ok(payload)
    }
}

/// A reachable backend may still answer `{"success": false, "message": …}`.
fn ensure_success<F>(payload: &Value, on_failure: F) -> Result<(), ApiError>
where
    F: FnOnce(String) -> ApiError,
{
    if payload.get("success").and_then(Value::as_bool) == Some(false) {
        let message = ["message", "error"]
            .iter()
            .find_map(|f| payload.get(*f).and_then(Value::as_str))
            .unwrap_or("Request was not successful")
            .to_string();
        return Err(on_failure(message));
    }
    Ok(())
}

fn storage_error(e: SelfcareError) -> ApiError {
    ApiError::Storage {
        message: e.to_string(),
    }
}

fn decode<T: DeserializeOwned>(payload: Value) -> Result<T, ApiError> {
    serde_json::from_value(payload).map_err(|e| ApiError::MalformedResponse {
        message: e.to_string(),
    })
}

fn decode_field<T: DeserializeOwned>(mut payload: Value, field: &str) -> Result<T, ApiError> {
    match payload.get_mut(field).map(Value::take) {
        Some(value) => decode(value),
        None => Err(ApiError::MalformedResponse {
            message: format!("missing '{field}' in response"),
        }),
    }
}
