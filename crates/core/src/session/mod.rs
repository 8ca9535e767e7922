//! Session module - user identity, the auth provider boundary and the
//! per-user ledger binding.

mod ledger_session;
mod session_model;
mod session_traits;

pub use ledger_session::LedgerSession;
pub use session_model::{AuthError, AuthEvent, UserId};
pub use session_traits::AuthProviderTrait;
