//! SurrealDB connection management.

use std::env;

use surrealdb::Surreal;
use surrealdb::engine::remote::ws::{Client, Ws};
use surrealdb::opt::auth::Root;
use tracing::info;

/// Connection settings for the backing SurrealDB instance.
///
/// Defaults target a local development server; deployments override
/// them through the `TESSERA_DB_*` environment variables.
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// WebSocket endpoint, host and port only (e.g., `127.0.0.1:8000`).
    pub url: String,
    /// Namespace holding all tenant data.
    pub namespace: String,
    /// Database within the namespace.
    pub database: String,
    /// Root username.
    pub username: String,
    /// Root password.
    pub password: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: "127.0.0.1:8000".into(),
            namespace: "tessera".into(),
            database: "kb".into(),
            username: "root".into(),
            password: "root".into(),
        }
    }
}

impl DbConfig {
    /// Build a config from `TESSERA_DB_URL`, `TESSERA_DB_NAMESPACE`,
    /// `TESSERA_DB_DATABASE`, `TESSERA_DB_USER`, and `TESSERA_DB_PASS`,
    /// falling back to the defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, fallback: String| env::var(name).unwrap_or(fallback);
        Self {
            url: var("TESSERA_DB_URL", defaults.url),
            namespace: var("TESSERA_DB_NAMESPACE", defaults.namespace),
            database: var("TESSERA_DB_DATABASE", defaults.database),
            username: var("TESSERA_DB_USER", defaults.username),
            password: var("TESSERA_DB_PASS", defaults.password),
        }
    }
}

/// Holds the live SurrealDB client; cheap to clone.
#[derive(Clone)]
pub struct DbManager {
    db: Surreal<Client>,
}

impl DbManager {
    /// Open a WebSocket connection, sign in as root, and select the
    /// configured namespace and database.
    pub async fn connect(config: &DbConfig) -> Result<Self, surrealdb::Error> {
        info!(
            url = %config.url,
            namespace = %config.namespace,
            database = %config.database,
            "Connecting to SurrealDB"
        );

        let db = Surreal::new::<Ws>(&config.url).await?;

        db.signin(Root {
            username: config.username.clone(),
            password: config.password.clone(),
        })
        .await?;

        db.use_ns(&config.namespace)
            .use_db(&config.database)
            .await?;

        info!("SurrealDB connection ready");

        Ok(Self { db })
    }

    pub fn client(&self) -> &Surreal<Client> {
        &self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_overrides_fall_back_to_defaults() {
        // None of the vars are set in the test environment.
        let config = DbConfig::from_env();
        assert_eq!(config.url, "127.0.0.1:8000");
        assert_eq!(config.namespace, "tessera");
        assert_eq!(config.database, "kb");
    }
}
