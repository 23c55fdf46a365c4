// src/profile/mod.rs — Deployment profiles and the logical endpoint table
//
// One compiled-in table maps each ProfileName to its ConfigProfile. Callers
// address operations by `Endpoint`, never by raw URL; a profile may leave
// some endpoints out (the OTP/reset entries only exist in PRODUCTION).

pub mod resolver;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::infra::config::ProfileTuning;
use crate::infra::errors::SelfcareError;

// ─── Profile names ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProfileName {
    Production,
    Development,
    Mock,
}

impl ProfileName {
    pub const ALL: [ProfileName; 3] = [
        ProfileName::Production,
        ProfileName::Development,
        ProfileName::Mock,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileName::Production => "PRODUCTION",
            ProfileName::Development => "DEVELOPMENT",
            ProfileName::Mock => "MOCK",
        }
    }

    /// Exact canonical name only, as written by the session store.
    pub fn from_canonical(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == name)
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = SelfcareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SelfcareError::UnknownProfile(s.to_string()))
    }
}

// ─── Endpoints ──────────────────────────────────────────────────────────────

/// Logical operation names. The wire name (`as_str`) is what callers and
/// config files use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Endpoint {
    #[serde(rename = "login")]
    Login,
    #[serde(rename = "logout")]
    Logout,
    #[serde(rename = "userProfile")]
    UserProfile,
    #[serde(rename = "accountBalance")]
    AccountBalance,
    #[serde(rename = "dataUsage")]
    DataUsage,
    #[serde(rename = "recharge")]
    Recharge,
    #[serde(rename = "dataPack")]
    DataPack,
    #[serde(rename = "billHistory")]
    BillHistory,
    #[serde(rename = "transactions")]
    Transactions,
    #[serde(rename = "validateOTP")]
    ValidateOtp,
    #[serde(rename = "sendOTP")]
    SendOtp,
    #[serde(rename = "resetPassword")]
    ResetPassword,
}

impl Endpoint {
    pub const ALL: [Endpoint; 12] = [
        Endpoint::Login,
        Endpoint::Logout,
        Endpoint::UserProfile,
        Endpoint::AccountBalance,
        Endpoint::DataUsage,
        Endpoint::Recharge,
        Endpoint::DataPack,
        Endpoint::BillHistory,
        Endpoint::Transactions,
        Endpoint::ValidateOtp,
        Endpoint::SendOtp,
        Endpoint::ResetPassword,
    ];

    /// Every profile must route these.
    pub const CORE: [Endpoint; 6] = [
        Endpoint::Login,
        Endpoint::Logout,
        Endpoint::UserProfile,
        Endpoint::AccountBalance,
        Endpoint::DataUsage,
        Endpoint::Transactions,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Login => "login",
            Endpoint::Logout => "logout",
            Endpoint::UserProfile => "userProfile",
            Endpoint::AccountBalance => "accountBalance",
            Endpoint::DataUsage => "dataUsage",
            Endpoint::Recharge => "recharge",
            Endpoint::DataPack => "dataPack",
            Endpoint::BillHistory => "billHistory",
            Endpoint::Transactions => "transactions",
            Endpoint::ValidateOtp => "validateOTP",
            Endpoint::SendOtp => "sendOTP",
            Endpoint::ResetPassword => "resetPassword",
        }
    }

    fn path(&self) -> &'static str {
        match self {
            Endpoint::Login => "/auth/login",
            Endpoint::Logout => "/auth/logout",
            Endpoint::UserProfile => "/user/profile",
            Endpoint::AccountBalance => "/account/balance",
            Endpoint::DataUsage => "/account/data-usage",
            Endpoint::Recharge => "/services/recharge",
            Endpoint::DataPack => "/services/data-pack",
            Endpoint::BillHistory => "/account/bills",
            Endpoint::Transactions => "/account/transactions",
            Endpoint::ValidateOtp => "/auth/validate-otp",
            Endpoint::SendOtp => "/auth/send-otp",
            Endpoint::ResetPassword => "/auth/reset-password",
        }
    }

    fn is_otp_flow(&self) -> bool {
        matches!(
            self,
            Endpoint::ValidateOtp | Endpoint::SendOtp | Endpoint::ResetPassword
        )
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logical endpoint name that is not part of the table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown endpoint '{0}'")]
pub struct UnknownEndpointName(pub String);

impl FromStr for Endpoint {
    type Err = UnknownEndpointName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|e| e.as_str() == s)
            .ok_or_else(|| UnknownEndpointName(s.to_string()))
    }
}

// ─── ConfigProfile ──────────────────────────────────────────────────────────

/// A selected deployment configuration. Built from the compiled-in table,
/// optionally tuned from config.toml, then never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigProfile {
    name: ProfileName,
    base_url: String,
    endpoints: BTreeMap<Endpoint, String>,
    timeout: Duration,
    max_retries: u32,
    default_headers: BTreeMap<String, String>,
}

impl ConfigProfile {
    /// The compiled-in profile for `name`.
    pub fn builtin(name: ProfileName) -> Self {
        let (base_url, timeout_ms, max_retries) = match name {
            ProfileName::Production => ("https://selfcare.mobitel.lk/api", 15_000, 3),
            ProfileName::Development => ("http://localhost:3000/api", 5_000, 2),
            ProfileName::Mock => ("mock://api.mobitel.lk", 1_500, 1),
        };

        let endpoints = Endpoint::ALL
            .into_iter()
            .filter(|e| name == ProfileName::Production || !e.is_otp_flow())
            .map(|e| (e, e.path().to_string()))
            .collect();

        let mut default_headers = BTreeMap::new();
        default_headers.insert("Content-Type".to_string(), "application/json".to_string());
        default_headers.insert("Accept".to_string(), "application/json".to_string());
        if name == ProfileName::Production {
            default_headers.insert(
                "User-Agent".to_string(),
                "MobitelSelfcareWeb/1.0".to_string(),
            );
            default_headers.insert(
                "X-Requested-With".to_string(),
                "XMLHttpRequest".to_string(),
            );
        }

        Self {
            name,
            base_url: base_url.to_string(),
            endpoints,
            timeout: Duration::from_millis(timeout_ms),
            max_retries,
            default_headers,
        }
    }

    /// Apply config.toml tuning and re-validate.
    pub fn with_tuning(mut self, tuning: &ProfileTuning) -> Result<Self, SelfcareError> {
        if let Some(ref base_url) = tuning.base_url {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(ms) = tuning.timeout_ms {
            self.timeout = Duration::from_millis(ms);
        }
        if let Some(retries) = tuning.max_retries {
            self.max_retries = retries;
        }
        self.validate()?;
        Ok(self)
    }

    /// Construction-time checks: core endpoints routed, positive timeout,
    /// at least one try, a parseable base address.
    pub fn validate(&self) -> Result<(), SelfcareError> {
        let invalid = |reason: String| SelfcareError::InvalidProfile {
            profile: self.name.to_string(),
            reason,
        };

        let missing: Vec<&str> = Endpoint::CORE
            .iter()
            .filter(|e| !self.endpoints.contains_key(e))
            .map(|e| e.as_str())
            .collect();
        if !missing.is_empty() {
            return Err(invalid(format!(
                "missing core endpoints: {}",
                missing.join(", ")
            )));
        }
        if self.timeout.is_zero() {
            return Err(invalid("timeout must be greater than zero".into()));
        }
        if self.max_retries == 0 {
            return Err(invalid("max_retries must be at least 1".into()));
        }
        url::Url::parse(&self.base_url)
            .map_err(|e| invalid(format!("base address '{}': {}", self.base_url, e)))?;
        Ok(())
    }

    pub fn name(&self) -> ProfileName {
        self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn default_headers(&self) -> &BTreeMap<String, String> {
        &self.default_headers
    }

    pub fn is_mock(&self) -> bool {
        self.name == ProfileName::Mock
    }

    pub fn supports(&self, endpoint: Endpoint) -> bool {
        self.endpoints.contains_key(&endpoint)
    }

    /// Endpoints this profile routes, in table order.
    pub fn endpoints(&self) -> impl Iterator<Item = Endpoint> + '_ {
        self.endpoints.keys().copied()
    }

    /// Full address for `endpoint`, or `None` when the profile omits it.
    pub fn url_for(&self, endpoint: Endpoint) -> Option<String> {
        self.endpoints
            .get(&endpoint)
            .map(|path| format!("{}{}", self.base_url, path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles_validate() {
        for name in ProfileName::ALL {
            let profile = ConfigProfile::builtin(name);
            assert!(profile.validate().is_ok(), "{name} should validate");
            for core in Endpoint::CORE {
                assert!(profile.supports(core), "{name} must route {core}");
            }
        }
    }

    #[test]
    fn test_builtin_constants() {
        let prod = ConfigProfile::builtin(ProfileName::Production);
        assert_eq!(prod.timeout(), Duration::from_millis(15_000));
        assert_eq!(prod.max_retries(), 3);
        assert_eq!(prod.endpoints().count(), 12);
        assert_eq!(
            prod.default_headers().get("User-Agent").map(String::as_str),
            Some("MobitelSelfcareWeb/1.0")
        );

        let dev = ConfigProfile::builtin(ProfileName::Development);
        assert_eq!(dev.timeout(), Duration::from_millis(5_000));
        assert_eq!(dev.max_retries(), 2);
        assert!(!dev.supports(Endpoint::SendOtp));

        let mock = ConfigProfile::builtin(ProfileName::Mock);
        assert_eq!(mock.timeout(), Duration::from_millis(1_500));
        assert_eq!(mock.max_retries(), 1);
        assert!(mock.is_mock());
        assert_eq!(mock.endpoints().count(), 9);
    }

    #[test]
    fn test_url_for() {
        let prod = ConfigProfile::builtin(ProfileName::Production);
        assert_eq!(
            prod.url_for(Endpoint::DataUsage).as_deref(),
            Some("https://selfcare.mobitel.lk/api/account/data-usage")
        );
        let dev = ConfigProfile::builtin(ProfileName::Development);
        assert!(dev.url_for(Endpoint::ResetPassword).is_none());
    }

    #[test]
    fn test_endpoint_names_roundtrip() {
        for e in Endpoint::ALL {
            assert_eq!(e.as_str().parse::<Endpoint>().unwrap(), e);
        }
        assert_eq!(
            "doesNotExist".parse::<Endpoint>(),
            Err(UnknownEndpointName("doesNotExist".into()))
        );
        // wire names are case-sensitive
        assert!("LOGIN".parse::<Endpoint>().is_err());
    }

    #[test]
    fn test_profile_name_parse() {
        assert_eq!("MOCK".parse::<ProfileName>().unwrap(), ProfileName::Mock);
        assert_eq!(
            " development ".parse::<ProfileName>().unwrap(),
            ProfileName::Development
        );
        assert!("STAGING".parse::<ProfileName>().is_err());
    }

    #[test]
    fn test_with_tuning_overrides_and_validates() {
        let tuned = ConfigProfile::builtin(ProfileName::Development)
            .with_tuning(&ProfileTuning {
                base_url: Some("http://127.0.0.1:9000/api/".into()),
                timeout_ms: Some(250),
                max_retries: Some(5),
            })
            .unwrap();
        assert_eq!(tuned.base_url(), "http://127.0.0.1:9000/api");
        assert_eq!(tuned.timeout(), Duration::from_millis(250));
        assert_eq!(tuned.max_retries(), 5);

        let zero_retries = ConfigProfile::builtin(ProfileName::Production).with_tuning(
            &ProfileTuning {
                max_retries: Some(0),
                ..Default::default()
            },
        );
        assert!(matches!(
            zero_retries,
            Err(SelfcareError::InvalidProfile { .. })
        ));

        let zero_timeout = ConfigProfile::builtin(ProfileName::Mock).with_tuning(&ProfileTuning {
            timeout_ms: Some(0),
            ..Default::default()
        });
        assert!(zero_timeout.is_err());

        let bad_url = ConfigProfile::builtin(ProfileName::Mock).with_tuning(&ProfileTuning {
            base_url: Some("not a url".into()),
            ..Default::default()
        });
        assert!(bad_url.is_err());
    }
}
