// src/infra/paths.rs — XDG-compliant path management
//
// All paths respect the SELFCARE_HOME environment variable for isolation.
// When SELFCARE_HOME is set, config and session data live under that directory.
// When unset, config uses ~/.selfcare/ and data uses XDG_DATA_HOME/selfcare.

use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Returns the SELFCARE_HOME override, if set.
fn selfcare_home() -> Option<PathBuf> {
    std::env::var_os("SELFCARE_HOME").map(PathBuf::from)
}

/// Home directory, falling back to the working directory when no home exists.
pub fn dirs_home() -> PathBuf {
    BaseDirs::new()
        .map(|b| b.home_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Configuration directory: $SELFCARE_HOME/ or ~/.selfcare/
pub fn config_dir() -> PathBuf {
    if let Some(home) = selfcare_home() {
        return home;
    }
    dirs_home().join(".selfcare")
}

/// Data directory: $SELFCARE_HOME/data/ or ~/.local/share/selfcare/
pub fn data_dir() -> PathBuf {
    if let Some(home) = selfcare_home() {
        return home.join("data");
    }
    ProjectDirs::from("", "", "selfcare")
        .map(|p| p.data_local_dir().to_path_buf())
        .unwrap_or_else(|| config_dir().join("data"))
}

/// Config file path
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Persisted session store (token, user record, flags)
pub fn session_file_path() -> PathBuf {
    data_dir().join("session.json")
}

/// Ensure all required directories exist
pub async fn ensure_dirs() -> anyhow::Result<()> {
    for dir in [config_dir(), data_dir()] {
        tokio::fs::create_dir_all(&dir).await?;
    }
    Ok(())
}
