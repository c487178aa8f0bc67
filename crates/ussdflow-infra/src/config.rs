//! Configuration loading for ussdflow.
//!
//! Reads `config.toml` from the data directory (`~/.ussdflow/` by default)
//! and deserializes it into [`GlobalConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use ussdflow_types::config::GlobalConfig;

/// Resolve the data directory.
///
/// Uses `USSDFLOW_DATA_DIR` when set, else `~/.ussdflow`, else
/// `.ussdflow` in the working directory.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("USSDFLOW_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".ussdflow");
    }

    PathBuf::from(".ussdflow")
}

/// Path of the vault key file inside `data_dir`.
pub fn vault_key_path(data_dir: &Path) -> PathBuf {
    data_dir.join("vault.key")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`GlobalConfig::default()`].
/// - Unreadable or unparsable file: a warning, then the default.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}
