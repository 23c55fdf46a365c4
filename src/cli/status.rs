// src/cli/status.rs — Session and environment status display

use crate::infra::paths;
use crate::portal::SelfcarePortal;

/// Display session and environment status.
pub fn show_status(portal: &SelfcarePortal) -> anyhow::Result<()> {
    let profile = portal.profile();
    let session = portal.session();

    println!("selfcare v{}", env!("CARGO_PKG_VERSION"));
    println!();

    let config_path = paths::config_file_path();
    if config_path.exists() {
        println!("  Config:       {} (loaded)", config_path.display());
    } else {
        println!("  Config:       (using defaults)");
    }
    println!("  Session file: {}", paths::session_file_path().display());

    println!();
    println!("  Environment:  {} ({})", profile.name(), profile.base_url());
    match session.environment_override() {
        Some(pinned) => println!("  Pinned:       {pinned}"),
        None => println!("  Pinned:       (auto-detected)"),
    }
    println!(
        "  Timeout:      {} ms, {} attempt(s)",
        profile.timeout().as_millis(),
        profile.max_retries()
    );

    println!();
    match portal.current_session() {
        Some(s) => {
            println!("  Signed in:    {} ({})", s.user.name, s.user.phone);
            println!("  Last login:   {}", s.user.last_login.to_rfc3339());
            println!(
                "  Remembered:   {}",
                if session.remember() { "yes" } else { "no" }
            );
        }
        None => println!("  Signed in:    no (run `selfcare login`)"),
    }

    Ok(())
}
