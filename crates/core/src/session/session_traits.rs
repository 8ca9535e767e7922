use tokio::sync::broadcast;

use super::session_model::{AuthEvent, UserId};

/// Contract of the external auth provider.
pub trait AuthProviderTrait: Send + Sync {
    /// The signed-in user, if any.
    fn current_user_id(&self) -> Option<UserId>;

    /// Stream of sign-in/sign-out transitions.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
