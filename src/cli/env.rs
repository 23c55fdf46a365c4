// src/cli/env.rs — Inspect and pin the API environment

use super::EnvAction;
use crate::portal::SelfcarePortal;
use crate::profile::{Endpoint, ProfileName};

/// Handle `selfcare env [show|set|clear]`.
pub fn run_env(portal: &SelfcarePortal, action: Option<EnvAction>) -> anyhow::Result<()> {
    match action.unwrap_or(EnvAction::Show) {
        EnvAction::Show => show(portal),
        EnvAction::Set { name } => {
            let profile = portal.set_environment_override(&name)?;
            println!("Switched to {profile} API mode (takes effect on the next command)");
            Ok(())
        }
        EnvAction::Clear => {
            portal.clear_environment_override()?;
            println!("Environment override cleared; the host decides again.");
            Ok(())
        }
    }
}

fn show(portal: &SelfcarePortal) -> anyhow::Result<()> {
    let profile = portal.profile();
    let pinned = portal.session().environment_override();

    println!("Active:   {} ({})", profile.name(), profile.base_url());
    println!("Pinned:   {}", pinned.as_deref().unwrap_or("(none)"));
    println!(
        "Choices:  {}",
        ProfileName::ALL
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!();
    println!("Endpoints:");
    for endpoint in Endpoint::ALL {
        match profile.url_for(endpoint) {
            Some(url) => println!("  {:<16} {url}", endpoint.as_str()),
            None => println!("  {:<16} (not available)", endpoint.as_str()),
        }
    }
    Ok(())
}
