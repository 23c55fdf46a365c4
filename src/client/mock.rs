// src/client/mock.rs — Deterministic in-process backend for the MOCK profile
//
// Never fails at the transport level. Every call first sleeps for the
// profile timeout (through the injected sleeper), then answers from fixed
// tables. Login validates the phone format before touching credentials.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use super::retry::Sleeper;
use super::{ApiError, RequestOptions, RequestOutcome};
use crate::phone;
use crate::profile::Endpoint;

/// Demo accounts: clean local number → password.
pub const MOCK_CREDENTIALS: &[(&str, &str)] = &[
    ("771234567", "password123"),
    ("771111111", "test123"),
    ("772222222", "demo123"),
    ("773333333", "mobile123"),
    ("774444444", "selfcare123"),
    ("775555555", "mobitel123"),
];

pub const INVALID_PHONE_MESSAGE: &str = "invalid phone format";
pub const INVALID_CREDENTIALS_MESSAGE: &str =
    "Invalid phone number or password. Please check your credentials and try again.";

const DEMO_PHONE: &str = "771234567";
const TOKEN_TTL_SECS: u64 = 3600;

pub struct MockBackend {
    delay: Duration,
    sleeper: Arc<dyn Sleeper>,
}

impl MockBackend {
    pub fn new(delay: Duration, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { delay, sleeper }
    }

    pub async fn handle(&self, endpoint: Endpoint, options: &RequestOptions) -> RequestOutcome {
        self.sleeper.sleep(self.delay).await;
        tracing::debug!(endpoint = %endpoint, "Mock API call");

        match endpoint {
            Endpoint::Login => login(options),
            Endpoint::UserProfile => Ok(user_profile()),
            Endpoint::AccountBalance => Ok(account_balance()),
            Endpoint::DataUsage => Ok(data_usage()),
            Endpoint::Transactions => Ok(transactions()),
            _ => Ok(json!({
                "success": true,
                "message": "Mock API call successful",
            })),
        }
    }
}

fn body_str<'a>(options: &'a RequestOptions, field: &str) -> &'a str {
    options
        .body
        .as_ref()
        .and_then(|b| b.get(field))
        .and_then(Value::as_str)
        .unwrap_or("")
}

/// `<prefix>_<unix millis>_<random>`: time-ordered, unique even within a millisecond.
fn mint_token(prefix: &str) -> String {
    let nonce = Uuid::new_v4().simple().to_string();
    format!("{prefix}_{}_{}", Utc::now().timestamp_millis(), &nonce[..12])
}

fn login(options: &RequestOptions) -> RequestOutcome {
    let clean = phone::clean_phone(body_str(options, "phone"));
    let password = body_str(options, "password");

    if !phone::validate_phone_number(&clean) {
        return Err(ApiError::Validation {
            message: INVALID_PHONE_MESSAGE.into(),
        });
    }

    let matched = MOCK_CREDENTIALS
        .iter()
        .any(|(p, pw)| *p == clean && *pw == password);
    if !matched {
        return Err(ApiError::InvalidCredentials {
            message: INVALID_CREDENTIALS_MESSAGE.into(),
        });
    }

    Ok(json!({
        "success": true,
        "token": mint_token("mock_jwt_token"),
        "refreshToken": mint_token("mock_refresh_token"),
        "expiresIn": TOKEN_TTL_SECS,
        "user": {
            "phone": phone::international(&clean),
            "name": "John Doe",
            "email": "john.doe@example.com",
            "accountStatus": "Active",
            "plan": "Unlimited Data",
            "dataUsage": { "used": 6.5, "total": 10, "percentage": 65 },
            "balance": 1250.50,
            "lastLogin": Utc::now().to_rfc3339(),
            "customerId": format!("CUST_{clean}"),
            "accountType": "POSTPAID",
        },
    }))
}

fn user_profile() -> Value {
    json!({
        "success": true,
        "user": {
            "phone": phone::international(DEMO_PHONE),
            "name": "John Doe",
            "email": "john.doe@example.com",
            "accountStatus": "Active",
            "plan": "Unlimited Data",
            "balance": 1250.50,
            "lastLogin": Utc::now().to_rfc3339(),
        },
    })
}

fn account_balance() -> Value {
    json!({
        "success": true,
        "balance": 1250.50,
        "currency": "LKR",
        "lastUpdated": Utc::now().to_rfc3339(),
    })
}

fn data_usage() -> Value {
    json!({
        "success": true,
        "dataUsage": {
            "used": 6.5,
            "total": 10,
            "percentage": 65,
            "unit": "GB",
            "resetDate": "2024-02-01",
        },
    })
}

fn transactions() -> Value {
    json!({
        "success": true,
        "transactions": [
            {
                "id": "TXN001",
                "type": "Data Pack Purchase",
                "amount": 500,
                "date": "2024-01-15",
                "status": "Completed",
            },
            {
                "id": "TXN002",
                "type": "Account Recharge",
                "amount": 1000,
                "date": "2024-01-10",
                "status": "Completed",
            },
        ],
    })
}
