// src/profile/resolver.rs — Environment detection and profile selection
//
// Precedence: a stored override spelling a profile name exactly, then loopback hosts
// (DEVELOPMENT), then production hosts (PRODUCTION). Anything unrecognised
// falls back to MOCK so an unknown host never reaches a real network.

use super::{ConfigProfile, ProfileName};
use crate::infra::config::Config;
use crate::infra::errors::SelfcareError;

/// Host identifiers that mean "this machine".
pub const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1", "::1", "[::1]"];

/// Substrings that mark a production host.
pub const PRODUCTION_MARKERS: &[&str] = &["mobitel.lk", "production"];

/// Decide the active profile. Pure: same inputs, same answer.
pub fn resolve(host: &str, override_name: Option<&str>) -> ProfileName {
    if let Some(pinned) = override_name.and_then(ProfileName::from_canonical) {
        return pinned;
    }

    let host = host.trim().to_ascii_lowercase();
    if LOOPBACK_HOSTS.contains(&host.as_str()) {
        ProfileName::Development
    } else if PRODUCTION_MARKERS.iter().any(|m| host.contains(m)) {
        ProfileName::Production
    } else {
        ProfileName::Mock
    }
}

/// Resolve the profile name and build the tuned, validated profile.
pub fn select_profile(
    host: &str,
    override_name: Option<&str>,
    config: &Config,
) -> Result<ConfigProfile, SelfcareError> {
    let name = resolve(host, override_name);
    let profile = ConfigProfile::builtin(name);
    match config.profiles.tuning_for(name) {
        Some(tuning) => profile.with_tuning(tuning),
        None => {
            profile.validate()?;
            Ok(profile)
        }
    }
}
