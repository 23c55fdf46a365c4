// src/models.rs — Subscriber account payloads
//
// Field names follow the JSON envelope the backend (and the mock) speaks:
// camelCase, `used`/`total` for data volumes in GB.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    Active,
    Suspended,
    Inactive,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataUsage {
    #[serde(rename = "used")]
    pub used_gb: f64,
    #[serde(rename = "total")]
    pub total_gb: f64,
    /// Supplied verbatim by the backend; not recomputed here.
    pub percentage: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    /// E.164-style display form, e.g. `+94 771234567`.
    pub phone: String,
    pub name: String,
    pub email: String,
    pub account_status: AccountStatus,
    pub plan: String,
    pub balance: f64,
    /// The profile endpoint omits usage; login includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_usage: Option<DataUsage>,
    pub last_login: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

/// Successful login envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    pub user: UserRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub balance: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

fn default_currency() -> String {
    "LKR".into()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: f64,
    pub date: String,
    pub status: String,
}
