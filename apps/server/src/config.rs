use std::{net::SocketAddr, str::FromStr, time::Duration};

use anyhow::Context;

/// Which `SnapshotStoreTrait` implementation backs the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Sqlite,
    Local,
    Memory,
}

impl FromStr for StoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "local" => Ok(StoreKind::Local),
            "memory" => Ok(StoreKind::Memory),
            other => anyhow::bail!("Unknown store '{other}', expected sqlite, local or memory"),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub store: StoreKind,
    pub local_cache_dir: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    /// Shared secret of the auth provider's tokens. Without it the user is
    /// taken from the `X-User-Id` header (development only).
    pub jwt_secret: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = env_or("NW_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid NW_LISTEN_ADDR")?;
        let store: StoreKind = env_or("NW_STORE", "sqlite").parse()?;
        let cors_allow = env_or("NW_CORS_ALLOW_ORIGINS", "*")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        let timeout_ms: u64 = env_or("NW_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid NW_REQUEST_TIMEOUT_MS")?;
        let jwt_secret = std::env::var("NW_JWT_SECRET")
            .ok()
            .filter(|s| !s.trim().is_empty());

        Ok(Self {
            listen_addr,
            db_path: env_or("NW_DB_PATH", "./db/app.db"),
            store,
            local_cache_dir: env_or("NW_LOCAL_CACHE_DIR", "./db/local"),
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            jwt_secret,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
