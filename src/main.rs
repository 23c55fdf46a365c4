// src/main.rs — selfcare entry point

use std::sync::Arc;

use clap::Parser;

use selfcare::cli::{Cli, Commands};
use selfcare::infra::config::Config;
use selfcare::infra::{logger, paths};
use selfcare::portal::SelfcarePortal;
use selfcare::session::SessionStore;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load config (falls back to defaults if no config.toml)
    let config = if let Some(ref path) = cli.config {
        Config::load_from(std::path::Path::new(path))?
    } else {
        Config::load()?
    };

    // Respects RUST_LOG, otherwise the configured level
    logger::init_logging(&config.log_level);

    // --host > SELFCARE_HOST > config.host
    let host = cli
        .host
        .clone()
        .or_else(|| std::env::var("SELFCARE_HOST").ok())
        .unwrap_or_else(|| config.host.clone());

    paths::ensure_dirs().await?;
    let session = Arc::new(SessionStore::open(&paths::session_file_path()));
    let portal = SelfcarePortal::connect(&host, &config, session)?;

    match cli.command {
        Some(Commands::Login {
            phone,
            password,
            remember,
        }) => selfcare::cli::login::run_login(&portal, phone, password, remember).await,
        Some(Commands::Logout) => selfcare::cli::login::run_logout(&portal).await,
        Some(Commands::Dashboard) => selfcare::cli::dashboard::show_dashboard(&portal).await,
        Some(Commands::Env { action }) => selfcare::cli::env::run_env(&portal, action),
        Some(Commands::Call {
            endpoint,
            method,
            body,
        }) => {
            selfcare::cli::call::run_call(&portal, &endpoint, &method, body.as_deref()).await
        }
        Some(Commands::Status) | None => selfcare::cli::status::show_status(&portal),
    }
}
