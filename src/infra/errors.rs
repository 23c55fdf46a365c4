// src/infra/errors.rs — Ambient error types for selfcare
//
// Request failures live in `client::ApiError`; this enum covers the plumbing
// around it: profile selection, the on-disk session store, serialization.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelfcareError {
    #[error("Profile '{profile}' is invalid: {reason}")]
    InvalidProfile { profile: String, reason: String },

    #[error("Unknown API mode '{0}' (expected PRODUCTION, DEVELOPMENT or MOCK)")]
    UnknownProfile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
