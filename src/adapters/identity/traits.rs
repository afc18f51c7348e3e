//! Identity provider trait definition

use super::{Role, Session};
use crate::config::SecretString;
use crate::domain::Result;
use async_trait::async_trait;

/// Email/password account management
///
/// Implementations only talk to the provider; keeping track of who is signed in
/// is the job of [`AuthGate`](crate::core::auth::AuthGate).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account and record its role
    ///
    /// The returned session belongs to a new, unverified account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Provider` if the provider refuses the account (email
    /// already in use, weak password).
    async fn register(&self, email: &str, password: &SecretString, role: Role) -> Result<Session>;

    /// Authenticate with email and password
    ///
    /// Succeeds for unverified accounts too; `email_verified` on the session
    /// tells the caller whether to admit the user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for an unknown email or wrong password.
    async fn sign_in(&self, email: &str, password: &SecretString) -> Result<Session>;

    /// Send the email-verification message for a session's account
    async fn send_verification_email(&self, session: &Session) -> Result<()>;

    /// Send a password-reset message
    async fn send_password_reset(&self, email: &str) -> Result<()>;

    /// Short provider name for logs
    fn provider_name(&self) -> &str;
}
