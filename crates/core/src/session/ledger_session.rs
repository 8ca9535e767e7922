//! Binds the active ledger to the signed-in user.

use log::{debug, error, info, warn};
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast::{self, error::RecvError};

use super::session_model::{AuthEvent, UserId};
use super::session_traits::AuthProviderTrait;
use crate::errors::{Error, Result};
use crate::ledger::{LedgerService, LedgerServiceTrait, LedgerState, SnapshotStoreTrait};

/// Owns the ledger of whoever is currently signed in.
///
/// State is never shared between users: signing out, or signing in as someone
/// else, drops the in-memory ledger before anything new is loaded.
pub struct LedgerSession {
    store: Arc<dyn SnapshotStoreTrait>,
    active: RwLock<Option<Arc<LedgerService>>>,
}

impl LedgerSession {
    pub fn new(store: Arc<dyn SnapshotStoreTrait>) -> Self {
        Self {
            store,
            active: RwLock::new(None),
        }
    }

    /// Creates a session already bound to the provider's current user.
    pub fn from_provider(
        store: Arc<dyn SnapshotStoreTrait>,
        provider: &dyn AuthProviderTrait,
    ) -> Result<Self> {
        let session = Self::new(store);
        if let Some(user) = provider.current_user_id() {
            session.handle_event(AuthEvent::SignedIn(user))?;
        }
        Ok(session)
    }

    /// The active ledger, if someone is signed in.
    pub fn ledger(&self) -> Option<Arc<LedgerService>> {
        self.active.read().ok().and_then(|active| active.clone())
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.ledger().map(|ledger| ledger.user_id().clone())
    }

    /// Where the UI should land: onboarding (`Empty`) or dashboard
    /// (`Populated`). `None` while signed out.
    pub fn landing(&self) -> Result<Option<LedgerState>> {
        self.ledger().map(|ledger| ledger.state()).transpose()
    }

    /// Applies one auth transition.
    pub fn handle_event(&self, event: AuthEvent) -> Result<()> {
        match event {
            AuthEvent::SignedIn(user) => {
                if self.current_user().as_ref() == Some(&user) {
                    debug!("User {} already active", user);
                    return Ok(());
                }

                self.replace(None)?;
                let ledger = LedgerService::open(user.clone(), self.store.clone())?;
                self.replace(Some(Arc::new(ledger)))?;
                info!("Ledger loaded for user {}", user);
            }
            AuthEvent::SignedOut => {
                if let Some(previous) = self.current_user() {
                    info!("User {} signed out, discarding ledger", previous);
                }
                self.replace(None)?;
            }
        }
        Ok(())
    }

    /// Follows the provider's event stream until it closes.
    ///
    /// When the receiver lags, the skipped transitions are unknown, so the
    /// ledger is dropped and reloaded for whoever `current_user` reports.
    pub async fn run<F>(&self, mut events: broadcast::Receiver<AuthEvent>, current_user: F)
    where
        F: Fn() -> Option<UserId>,
    {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = self.handle_event(event) {
                        error!("Failed to apply auth event: {}", e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(
                        "Auth event stream lagged, {} event(s) skipped; resyncing",
                        skipped
                    );
                    if let Err(e) = self.resync(current_user()) {
                        error!("Failed to resync session after lag: {}", e);
                    }
                }
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Rebinds from scratch to `user`, discarding any ledger held before.
    fn resync(&self, user: Option<UserId>) -> Result<()> {
        self.replace(None)?;
        match user {
            Some(user) => self.handle_event(AuthEvent::SignedIn(user)),
            None => Ok(()),
        }
    }

    fn replace(&self, next: Option<Arc<LedgerService>>) -> Result<()> {
        let mut active = self
            .active
            .write()
            .map_err(|_| Error::Unexpected("Session lock poisoned".to_string()))?;
        *active = next;
        Ok(())
    }
}
