// src/cli/login.rs — Sign in / sign out

use crate::client::ErrorKind;
use crate::portal::{validate_phone_number, SelfcarePortal};

/// Handle `selfcare login`.
pub async fn run_login(
    portal: &SelfcarePortal,
    phone: Option<String>,
    password: Option<String>,
    remember: bool,
) -> anyhow::Result<()> {
    if let Some(session) = portal.current_session() {
        println!("Already signed in as {} ({}).", session.user.name, session.user.phone);
        println!("Run `selfcare logout` first to switch accounts.");
        return Ok(());
    }

    let phone = match phone {
        Some(p) => p,
        None => inquire::Text::new("Mobile number:")
            .with_help_message("e.g. 77 123 4567")
            .prompt()?,
    };

    // Same check the login form runs before submitting
    if !validate_phone_number(&phone) {
        anyhow::bail!("Please enter a valid phone number");
    }

    let password = match password {
        Some(p) => p,
        None => inquire::Password::new("Password:")
            .with_display_mode(inquire::PasswordDisplayMode::Masked)
            .without_confirmation()
            .prompt()?,
    };

    println!("Signing in ({} API)...", portal.profile().name());
    let login = portal
        .login(&phone, &password, remember)
        .await
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Login successful!");
    println!("  {} ({})", login.user.name, login.user.phone);
    println!("  Plan: {}", login.user.plan);
    Ok(())
}

/// Handle `selfcare logout`.
pub async fn run_logout(portal: &SelfcarePortal) -> anyhow::Result<()> {
    // A token without a readable user record still has to go
    let session = portal.session();
    if session.get_token().is_none() && session.get_user().is_none() {
        println!("Not signed in.");
        return Ok(());
    }

    match portal.logout().await {
        Ok(_) => println!("Logged out successfully"),
        Err(e) if e.kind() == ErrorKind::Storage => {
            anyhow::bail!("Logout failed: {e}")
        }
        Err(e) => println!("Logged out locally (server said: {e})"),
    }
    Ok(())
}
