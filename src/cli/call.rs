// src/cli/call.rs — Raw endpoint call

use serde_json::Value;

use crate::client::{Method, RequestOptions};
use crate::portal::SelfcarePortal;

/// Handle `selfcare call <endpoint>`.
pub async fn run_call(
    portal: &SelfcarePortal,
    endpoint: &str,
    method: &str,
    body: Option<&str>,
) -> anyhow::Result<()> {
    let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow::anyhow!("Invalid HTTP method: {method}"))?;

    let body: Option<Value> = match body {
        Some(raw) => Some(
            serde_json::from_str(raw).map_err(|e| anyhow::anyhow!("--body is not JSON: {e}"))?,
        ),
        None => None,
    };

    let options = RequestOptions {
        method,
        body,
        ..RequestOptions::default()
    };

    let value = portal
        .dispatcher()
        .request_named(endpoint, options)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
