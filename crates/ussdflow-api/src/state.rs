//! Application state wiring the orchestrator to concrete adapters.
//!
//! AppState is shared by the HTTP gateway and the CLI commands.

use std::path::PathBuf;
use std::sync::Arc;

use ussdflow_core::orchestrator::Orchestrator;
use ussdflow_infra::config::{load_global_config, resolve_data_dir, vault_key_path};
use ussdflow_infra::crypto::VaultCipher;
use ussdflow_infra::memory::MemoryHashStore;
use ussdflow_infra::sqlite::pool::{DatabasePool, default_database_url};
use ussdflow_infra::sqlite::SqliteHashStore;
use ussdflow_types::config::GlobalConfig;

use crate::demo::demo_graph;

/// When set, the vault master key is derived from this password instead of
/// the key file.
const VAULT_PASSWORD_ENV: &str = "USSDFLOW_VAULT_PASSWORD";

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize durable state: config, SQLite store and vault key under
    /// `data_dir` (or the resolved default).
    pub async fn init(data_dir: Option<PathBuf>) -> anyhow::Result<Self> {
        let data_dir = data_dir.unwrap_or_else(resolve_data_dir);
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        let db_pool = DatabasePool::new(&default_database_url(&data_dir)).await?;

        let cipher = match std::env::var(VAULT_PASSWORD_ENV) {
            Ok(password) if !password.is_empty() => VaultCipher::from_password(&password)?,
            _ => VaultCipher::from_key_file(&vault_key_path(&data_dir))?,
        };

        let orchestrator = Orchestrator::new(
            demo_graph()?,
            SqliteHashStore::new(db_pool),
            cipher,
            config.flow.clone(),
        );

        tracing::info!(data_dir = %data_dir.display(), "application state ready");
        Ok(Self {
            orchestrator,
            config: Arc::new(config),
            data_dir,
        })
    }

    /// State that lives only in memory: nothing is read from or written to disk.
    pub fn ephemeral(config: GlobalConfig, data_dir: PathBuf) -> anyhow::Result<Self> {
        let orchestrator = Orchestrator::new(
            demo_graph()?,
            MemoryHashStore::new(),
            VaultCipher::ephemeral(),
            config.flow.clone(),
        );

        Ok(Self {
            orchestrator,
            config: Arc::new(config),
            data_dir,
        })
    }
}
