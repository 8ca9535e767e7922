use std::sync::Arc;

use networth_core::errors::Result as CoreResult;
use networth_core::session::UserId;
use networth_core::stores::{InMemorySnapshotStore, LocalCacheStore};
use networth_core::{LedgerService, SnapshotStoreTrait};
use networth_storage_sqlite::{db, SnapshotRepository};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::auth::{decode_secret_key, AuthManager};
use crate::config::{Config, StoreKind};

pub struct AppState {
    pub store: Arc<dyn SnapshotStoreTrait>,
    pub auth: Option<Arc<AuthManager>>,
}

impl AppState {
    /// Loads the caller's ledger. Each request works on a fresh view of the
    /// store, so no state is shared between users.
    pub fn ledger_for(&self, user: &UserId) -> CoreResult<LedgerService> {
        LedgerService::open(user.clone(), self.store.clone())
    }
}

pub fn init_tracing() {
    let log_format = std::env::var("NW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub fn build_store(config: &Config) -> anyhow::Result<Arc<dyn SnapshotStoreTrait>> {
    let store: Arc<dyn SnapshotStoreTrait> = match config.store {
        StoreKind::Sqlite => {
            let pool = db::open(&config.db_path)?;
            tracing::info!("Database path in use: {}", config.db_path);
            let writer = db::spawn_writer(pool.clone());
            Arc::new(SnapshotRepository::new(pool, writer))
        }
        StoreKind::Local => {
            tracing::info!("Local cache directory in use: {}", config.local_cache_dir);
            Arc::new(LocalCacheStore::new(&config.local_cache_dir))
        }
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Arc::new(InMemorySnapshotStore::new())
        }
    };
    Ok(store)
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let store = build_store(config)?;

    let auth = match config.jwt_secret.as_deref() {
        Some(secret) => Some(Arc::new(AuthManager::new(&decode_secret_key(secret)?))),
        None => {
            tracing::warn!("NW_JWT_SECRET not set; trusting the X-User-Id header");
            None
        }
    };

    Ok(Arc::new(AppState { store, auth }))
}
